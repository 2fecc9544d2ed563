//! File-backed destinations.
//!
//! [`FileDestination`] keeps the whole datastore in one file in a text
//! [`Format`]. Formats are selected at compile time with the `toml` and
//! `yaml` features.

mod destination;
mod format;

#[cfg(feature = "toml")]
mod toml;

#[cfg(feature = "yaml")]
mod yaml;

pub use destination::{FileDestination, DEFAULT_FILE_MODE};
pub use format::Format;

#[cfg(feature = "toml")]
pub use self::toml::TomlFormat;

#[cfg(feature = "yaml")]
pub use yaml::YamlFormat;
