use kvsync_core::store::{DataMap, Result};

/// A text serialization format for whole datastore files.
pub trait Format: 'static {
    /// Destination name used in logs and errors.
    const NAME: &'static str;

    /// File extension, without the leading dot.
    const EXTENSION: &'static str;

    fn serialize(data: &DataMap) -> Result<String>;

    fn deserialize(raw: &str) -> Result<DataMap>;
}
