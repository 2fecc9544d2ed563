use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use kvsync_core::store::{AsyncDestination, Capabilities, DataMap, Destination, Result, StoreError};

use super::Format;

/// Default mode applied to the datastore file by `set_permissions`.
pub const DEFAULT_FILE_MODE: u32 = 0o700;

/// A whole-file destination in format `F`.
///
/// Every read parses the whole file and every write replaces it, so
/// per-key I/O is not supported.
pub struct FileDestination<F> {
    storage_dir: PathBuf,
    path: PathBuf,
    format: PhantomData<fn() -> F>,
}

impl<F: Format> FileDestination<F> {
    /// Creates a destination for `storage_dir/filename`.
    ///
    /// A leading `~` in `storage_dir` expands to `$HOME`. The file extension
    /// is forced to the format's extension.
    pub fn new(storage_dir: impl AsRef<Path>, filename: impl AsRef<Path>) -> Self {
        let storage_dir = expand_home(storage_dir.as_ref());
        let mut path = storage_dir.join(filename);
        if path.extension().and_then(|ext| ext.to_str()) != Some(F::EXTENSION) {
            path.set_extension(F::EXTENSION);
        }
        Self {
            storage_dir,
            path,
            format: PhantomData,
        }
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Full path of the datastore file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the storage directory and the file if they do not exist.
    ///
    /// An existing file is left untouched.
    pub fn ensure_file(&self) -> Result<()> {
        std::fs::create_dir_all(&self.storage_dir)
            .map_err(|err| self.io_failed("create directory", &self.storage_dir, err))?;
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| self.io_failed("touch file", &self.path, err))?;
        Ok(())
    }

    /// Sets unix permission bits on the file and optionally its directory.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unsupported` on targets without unix permissions.
    #[cfg(unix)]
    pub fn set_permissions(&self, file_mode: u32, dir_mode: Option<u32>) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        if let Some(mode) = dir_mode {
            let dir = &self.storage_dir;
            std::fs::set_permissions(dir, std::fs::Permissions::from_mode(mode))
                .map_err(|err| self.io_failed("set directory permissions", dir, err))?;
        }
        std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(file_mode))
            .map_err(|err| self.io_failed("set file permissions", &self.path, err))?;
        tracing::debug!(path = %self.path.display(), file_mode, dir_mode, "Set file permissions");
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn set_permissions(&self, _file_mode: u32, _dir_mode: Option<u32>) -> Result<()> {
        Err(StoreError::Unsupported {
            destination: F::NAME,
            operation: "set_permissions",
        })
    }

    fn parse(&self, raw: &str) -> Result<DataMap> {
        F::deserialize(raw).map_err(|err| self.with_path(err))
    }

    fn render(&self, data: &DataMap) -> Result<String> {
        F::serialize(data).map_err(|err| self.with_path(err))
    }

    /// Prefixes format errors with the file they came from.
    fn with_path(&self, err: StoreError) -> StoreError {
        let path = self.path.display();
        match err {
            StoreError::Serialization(msg) => StoreError::Serialization(format!("{path}: {msg}")),
            StoreError::InvalidData(msg) => StoreError::InvalidData(format!("{path}: {msg}")),
            other => other,
        }
    }

    fn io_failed(&self, action: &str, path: &Path, err: std::io::Error) -> StoreError {
        StoreError::io(path, format!("{action}: {err}"))
    }

    fn unsupported(&self, operation: &'static str) -> StoreError {
        StoreError::Unsupported {
            destination: F::NAME,
            operation,
        }
    }
}

fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}

impl<F: Format> Destination for FileDestination<F> {
    fn name(&self) -> &'static str {
        F::NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::bulk_only()
    }

    /// Reads and parses the file. A missing file is initialized empty.
    fn read_all(&mut self) -> Result<DataMap> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => self.parse(&raw),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "Initializing missing datastore file");
                let data = DataMap::new();
                self.write_all(&data)?;
                Ok(data)
            }
            Err(err) => Err(self.io_failed("read file", &self.path, err)),
        }
    }

    fn write_all(&mut self, data: &DataMap) -> Result<()> {
        let raw = self.render(data)?;
        std::fs::create_dir_all(&self.storage_dir)
            .map_err(|err| self.io_failed("create directory", &self.storage_dir, err))?;
        std::fs::write(&self.path, raw)
            .map_err(|err| self.io_failed("write file", &self.path, err))
    }

    fn read_one(&mut self, _key: &str) -> Result<Option<Value>> {
        Err(self.unsupported("read_one"))
    }

    fn write_one(&mut self, _key: &str, _value: &Value) -> Result<()> {
        Err(self.unsupported("write_one"))
    }
}

#[async_trait]
impl<F: Format> AsyncDestination for FileDestination<F> {
    async fn read_all_async(&mut self) -> Result<DataMap> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => self.parse(&raw),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "Initializing missing datastore file");
                let data = DataMap::new();
                self.write_all_async(&data).await?;
                Ok(data)
            }
            Err(err) => Err(self.io_failed("read file", &self.path, err)),
        }
    }

    async fn write_all_async(&mut self, data: &DataMap) -> Result<()> {
        let raw = self.render(data)?;
        if let Err(err) = tokio::fs::create_dir_all(&self.storage_dir).await {
            return Err(self.io_failed("create directory", &self.storage_dir, err));
        }
        if let Err(err) = tokio::fs::write(&self.path, raw).await {
            return Err(self.io_failed("write file", &self.path, err));
        }
        Ok(())
    }

    async fn read_one_async(&mut self, _key: &str) -> Result<Option<Value>> {
        Err(self.unsupported("read_one"))
    }

    async fn write_one_async(&mut self, _key: &str, _value: &Value) -> Result<()> {
        Err(self.unsupported("write_one"))
    }
}
