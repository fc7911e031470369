use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use keyname::Platform;
use logging::{LogHandle, LogLevel};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    CameraBinding, ConfigDocument, DEFAULT_CONFIG_FILE, MAX_SLOT, MIN_SLOT,
    error::{Error, Result},
};

/// Store shared between the launcher and the engine.
pub type SharedStore = Arc<Mutex<ConfigStore>>;

/// Owner of the in-memory configuration document and its file.
pub struct ConfigStore {
    path: PathBuf,
    doc: ConfigDocument,
    log: Option<LogHandle>,
    platform: Platform,
}

impl ConfigStore {
    /// Create an empty store bound to `path`. Nothing is read until [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidArgument(
                "configuration path is empty".to_string(),
            ));
        }
        Ok(Self {
            path,
            doc: ConfigDocument::default(),
            log: None,
            platform: Platform::current(),
        })
    }

    /// Create an empty store bound to `MoveMyCam.conf` in the working directory.
    pub fn with_default_path() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CONFIG_FILE),
            doc: ConfigDocument::default(),
            log: None,
            platform: Platform::current(),
        }
    }

    /// Propagate loaded logger settings through `handle`.
    pub fn with_log_handle(mut self, handle: LogHandle) -> Self {
        self.log = Some(handle);
        self
    }

    /// Check hot keys against `platform`'s key names instead of this host's.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Platform whose key names bindings are checked against.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Wrap the store for sharing with the engine.
    pub fn shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    /// File this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current document.
    pub fn document(&self) -> &ConfigDocument {
        &self.doc
    }

    /// Bindings in store order.
    pub fn cameras(&self) -> &[CameraBinding] {
        &self.doc.cameras
    }

    /// True when at least one binding is activated with a non-empty chord.
    pub fn is_ready(&self) -> bool {
        self.doc.armed().next().is_some()
    }

    /// Binding in slot `number`, if any.
    pub fn get_camera(&self, number: u8) -> Result<Option<&CameraBinding>> {
        check_slot(number)?;
        Ok(self.doc.cameras.iter().find(|c| c.number == number))
    }

    /// Validate and add `binding`.
    ///
    /// An occupied slot returns `Ok(false)` unless `replace` is set, in which
    /// case the old binding is dropped and the new one appended.
    pub fn insert_camera(&mut self, binding: CameraBinding, replace: bool) -> Result<bool> {
        binding.validate_on(self.platform)?;
        if let Some(pos) = self
            .doc
            .cameras
            .iter()
            .position(|c| c.number == binding.number)
        {
            if !replace {
                return Ok(false);
            }
            self.doc.cameras.remove(pos);
        }
        debug!(number = binding.number, address = %binding.address, "camera_inserted");
        self.doc.cameras.push(binding);
        Ok(true)
    }

    /// Remove slot `number`; `Ok(false)` when it was empty.
    pub fn remove_camera(&mut self, number: u8) -> Result<bool> {
        check_slot(number)?;
        let before = self.doc.cameras.len();
        self.doc.cameras.retain(|c| c.number != number);
        Ok(self.doc.cameras.len() != before)
    }

    /// Drop every binding; logger settings are kept.
    pub fn clear(&mut self) {
        self.doc.cameras.clear();
    }

    /// Verbosity written on the next save.
    pub fn set_log_level(&mut self, level: LogLevel) {
        self.doc.log_level = level;
    }

    /// Log file written on the next save.
    pub fn set_log_path(&mut self, path: impl Into<String>) {
        self.doc.log_path = path.into();
    }

    /// Write the document to the store's path.
    ///
    /// Returns `Ok(false)` with nothing written when there are no cameras or
    /// the write fails. Invalid bindings are an error. The file is replaced
    /// only after the full document has been serialized.
    pub fn save(&self) -> Result<bool> {
        if self.doc.cameras.is_empty() {
            debug!(path = %self.path.display(), "configuration_save_skipped_empty");
            return Ok(false);
        }
        let text = match self.doc.to_json_string_on(self.platform) {
            Ok(text) => text,
            Err(Error::Write { message, .. }) => {
                error!(path = %self.path.display(), %message, "Configuration file not saved!");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        match write_atomic(&self.path, &text) {
            Ok(()) => {
                info!(path = %self.path.display(), cameras = self.doc.cameras.len(), "configuration_saved");
                Ok(true)
            }
            Err(e) => {
                error!(error = %e.pretty(), "Configuration file not saved!");
                Ok(false)
            }
        }
    }

    /// Replace the document with the file's contents.
    ///
    /// A missing, unreadable or malformed file returns `Ok(false)` and leaves
    /// the document untouched. An invalid camera entry is an error and also
    /// leaves the document untouched.
    pub fn load(&mut self) -> Result<bool> {
        let doc = match ConfigDocument::read_on(&self.path, self.platform) {
            Ok(doc) => doc,
            Err(Error::NotFound { path }) => {
                debug!(path = %path.display(), "Configuration file not exists");
                return Ok(false);
            }
            Err(e @ (Error::Read { .. } | Error::Parse { .. })) => {
                error!(error = %e.pretty(), "Reading configuration file failed!");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        self.doc = doc;
        self.apply_logging();
        info!(
            path = %self.path.display(),
            cameras = self.doc.cameras.len(),
            armed = self.doc.armed().count(),
            "configuration_loaded"
        );
        Ok(true)
    }

    fn apply_logging(&self) {
        let Some(handle) = &self.log else { return };
        handle.set_level(self.doc.log_level);
        if handle.is_pinned() || self.doc.log_level == LogLevel::Disabled {
            return;
        }
        if let Err(e) = handle.set_file(Path::new(&self.doc.log_path)) {
            warn!(path = %self.doc.log_path, error = %e, "log_file_unusable");
        }
    }
}

fn check_slot(number: u8) -> Result<()> {
    if (MIN_SLOT..=MAX_SLOT).contains(&number) {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "camera number {number} is outside {MIN_SLOT}..={MAX_SLOT}"
        )))
    }
}

/// Write `text` next to `path`, then rename it into place.
fn write_atomic(path: &Path, text: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let write_err = |e: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    fs::write(&tmp, text).map_err(write_err)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ignored = fs::remove_file(&tmp);
        return Err(write_err(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_is_rejected() {
        assert!(matches!(
            ConfigStore::new(""),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn default_path_is_movemycam_conf() {
        let store = ConfigStore::with_default_path();
        assert_eq!(store.path(), Path::new("MoveMyCam.conf"));
        assert!(!store.is_ready());
    }

    fn binding(keys: &[&str]) -> CameraBinding {
        CameraBinding {
            number: 1,
            activated: true,
            hot_keys: keys.iter().map(|k| k.to_string()).collect(),
            address: "10.0.0.1".into(),
            port: 80,
            username: String::new(),
            password: String::new(),
            max_count: 4,
            preset: 1,
        }
    }

    #[test]
    fn insert_checks_keys_for_the_store_platform() {
        let mut linux = ConfigStore::with_default_path().with_platform(Platform::Linux);
        assert!(matches!(
            linux.insert_camera(binding(&["CTRL L", "A"]), false),
            Err(Error::Validation(_))
        ));
        assert!(linux.insert_camera(binding(&["CTRL", "A"]), false).unwrap());

        let mut windows = ConfigStore::with_default_path().with_platform(Platform::Windows);
        assert_eq!(windows.platform(), Platform::Windows);
        assert!(windows.insert_camera(binding(&["CTRL L", "A"]), false).unwrap());
        assert!(windows.insert_camera(binding(&["CTRL", "A"]), true).is_err());
    }

    #[test]
    fn slot_arguments_are_checked() {
        let mut store = ConfigStore::with_default_path();
        assert!(matches!(store.get_camera(0), Err(Error::InvalidArgument(_))));
        assert!(matches!(store.get_camera(10), Err(Error::InvalidArgument(_))));
        assert!(matches!(store.remove_camera(0), Err(Error::InvalidArgument(_))));
        assert!(store.get_camera(9).unwrap().is_none());
        assert!(!store.remove_camera(9).unwrap());
    }
}
