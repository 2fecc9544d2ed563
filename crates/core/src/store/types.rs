use serde_json::{Map, Value};

/// The mapping held by every backend: string keys to arbitrary JSON values.
///
/// `serde_json` is built with `preserve_order`, so iteration follows
/// insertion order and file round-trips keep keys where they were.
pub type DataMap = Map<String, Value>;

/// Per-call override for propagating a `set` to the external destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Write {
    /// Follow the backend's `write_on_update` default.
    #[default]
    Default,
    /// Always write, even if the default is off.
    Always,
    /// Never write, even if the default is on.
    Never,
}

impl Write {
    /// Resolves the override against the backend default.
    pub fn resolve(self, write_on_update_default: bool) -> bool {
        match self {
            Write::Default => write_on_update_default,
            Write::Always => true,
            Write::Never => false,
        }
    }
}

impl From<Option<bool>> for Write {
    fn from(write: Option<bool>) -> Self {
        match write {
            None => Write::Default,
            Some(true) => Write::Always,
            Some(false) => Write::Never,
        }
    }
}

/// What a read does when the external destination fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Fallback {
    /// Return the failure to the caller.
    #[default]
    Propagate,
    /// Log the failure and serve the cached value (or the default).
    Cached,
}

/// What an external destination can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Whether individual keys can be read and written. When false, every
    /// change requires rewriting the whole destination.
    pub supports_per_key_io: bool,
}

impl Capabilities {
    /// A destination that only supports whole-map reads and writes (files).
    pub const fn bulk_only() -> Self {
        Self {
            supports_per_key_io: false,
        }
    }

    /// A destination with efficient per-key operations (remote stores).
    pub const fn per_key() -> Self {
        Self {
            supports_per_key_io: true,
        }
    }
}
