//! The persisted configuration document and its JSON file format.

use std::{collections::HashSet, fs, io, path::Path};

use keyname::Platform;
use logging::LogLevel;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    CameraBinding, DEFAULT_LOG_FILE,
    error::{Error, Result, ValidationError, ValidationKind},
};

/// Camera bindings in store order plus logger settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    /// Bindings, at most one per slot.
    pub cameras: Vec<CameraBinding>,
    /// Verbosity applied to the process logger on load.
    pub log_level: LogLevel,
    /// File the process logger writes to.
    pub log_path: String,
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self {
            cameras: Vec::new(),
            log_level: LogLevel::Disabled,
            log_path: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

/// Top-level shape of the file; camera entries are checked field by field.
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    cameras: Vec<Value>,
    #[serde(default)]
    log_level: Option<Value>,
    #[serde(default)]
    log_path: Option<Value>,
}

#[derive(Serialize)]
struct Stored<'a> {
    cameras: Vec<Value>,
    log_level: i64,
    log_path: &'a str,
}

impl ConfigDocument {
    /// Bindings that can match: activated with a non-empty chord.
    pub fn armed(&self) -> impl Iterator<Item = &CameraBinding> {
        self.cameras.iter().filter(|c| c.is_armed())
    }

    /// Validate every binding and slot uniqueness.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        self.validate_on(Platform::current())
    }

    /// [`validate`](Self::validate) with hot keys checked for `platform`.
    pub fn validate_on(&self, platform: Platform) -> std::result::Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for cam in &self.cameras {
            cam.validate_on(platform)?;
            if !seen.insert(cam.number) {
                return Err(duplicate_slot(cam.number));
            }
        }
        Ok(())
    }

    /// Validate and serialize the full document to pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        self.to_json_string_on(Platform::current())
    }

    /// [`to_json_string`](Self::to_json_string) for `platform`'s key names.
    pub fn to_json_string_on(&self, platform: Platform) -> Result<String> {
        self.validate_on(platform)?;
        let cameras = self
            .cameras
            .iter()
            .map(|c| c.to_json_on(platform))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let stored = Stored {
            cameras,
            log_level: self.log_level.as_i64(),
            log_path: &self.log_path,
        };
        serde_json::to_string_pretty(&stored).map_err(|e| Error::Write {
            path: Default::default(),
            message: e.to_string(),
        })
    }

    /// Parse a document from JSON text; `path` is used for diagnostics only.
    pub fn from_json_str(text: &str, path: &Path) -> Result<Self> {
        Self::from_json_str_on(text, path, Platform::current())
    }

    /// [`from_json_str`](Self::from_json_str) for `platform`'s key names.
    pub fn from_json_str_on(text: &str, path: &Path, platform: Platform) -> Result<Self> {
        let env: Envelope = serde_json::from_str(text).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self::from_envelope(env, platform)?)
    }

    /// Read and parse the document at `path`.
    pub fn read(path: &Path) -> Result<Self> {
        Self::read_on(path, Platform::current())
    }

    /// [`read`](Self::read) for `platform`'s key names.
    pub fn read_on(path: &Path, platform: Platform) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound {
                path: path.to_path_buf(),
            },
            _ => Error::Read {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })?;
        Self::from_json_str_on(&text, path, platform)
    }

    fn from_envelope(env: Envelope, platform: Platform) -> std::result::Result<Self, ValidationError> {
        let mut cameras = Vec::with_capacity(env.cameras.len());
        let mut seen = HashSet::new();
        for entry in &env.cameras {
            let cam = CameraBinding::from_json_on(entry, platform)?;
            if !seen.insert(cam.number) {
                return Err(duplicate_slot(cam.number));
            }
            cameras.push(cam);
        }

        let log_level = match env.log_level {
            None => LogLevel::Disabled,
            Some(v) => {
                let n = v.as_i64().ok_or_else(|| {
                    ValidationError::new(
                        None,
                        "log_level",
                        ValidationKind::WrongType,
                        "Log level is not an integer",
                    )
                })?;
                LogLevel::try_from(n).map_err(|n| {
                    ValidationError::new(
                        None,
                        "log_level",
                        ValidationKind::OutOfRange,
                        format!("Wrong log level value ({n}), expected 0..=5"),
                    )
                })?
            }
        };

        let log_path = match env.log_path {
            None => DEFAULT_LOG_FILE.to_string(),
            Some(Value::String(s)) if s.is_empty() => DEFAULT_LOG_FILE.to_string(),
            Some(Value::String(s)) => s,
            Some(_) => {
                return Err(ValidationError::new(
                    None,
                    "log_path",
                    ValidationKind::WrongType,
                    "Log path is not a string",
                ));
            }
        };

        Ok(Self {
            cameras,
            log_level,
            log_path,
        })
    }
}

fn duplicate_slot(n: u8) -> ValidationError {
    ValidationError::new(
        Some(n),
        "number",
        ValidationKind::Duplicate,
        format!("Camera №{n} is defined more than once"),
    )
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;

    use super::*;

    fn cam(number: u8, keys: &[&str]) -> CameraBinding {
        CameraBinding {
            number,
            activated: true,
            hot_keys: keys.iter().map(|k| k.to_string()).collect(),
            address: format!("10.0.0.{number}"),
            port: 80,
            username: "u".into(),
            password: "p".into(),
            max_count: 4,
            preset: 1,
        }
    }

    fn parse(v: Value) -> Result<ConfigDocument> {
        ConfigDocument::from_json_str(&v.to_string(), &PathBuf::from("test.conf"))
    }

    #[test]
    fn empty_object_is_default_document() {
        assert_eq!(parse(json!({})).unwrap(), ConfigDocument::default());
    }

    #[test]
    fn document_round_trip() {
        let doc = ConfigDocument {
            cameras: vec![cam(2, &["F2"]), cam(1, &["A", "CTRL L"])],
            log_level: LogLevel::Warning,
            log_path: "cams.log".into(),
        };
        let text = doc.to_json_string_on(Platform::Windows).unwrap();
        let back = ConfigDocument::from_json_str_on(&text, Path::new("x"), Platform::Windows).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn file_is_read_with_the_callers_key_names() {
        let doc = ConfigDocument {
            cameras: vec![cam(1, &["CMD L", "A"])],
            ..ConfigDocument::default()
        };
        let text = doc.to_json_string_on(Platform::Windows).unwrap();
        assert!(doc.to_json_string_on(Platform::MacOs).is_err());
        let err = ConfigDocument::from_json_str_on(&text, Path::new("x"), Platform::MacOs).unwrap_err();
        assert!(matches!(err, Error::Validation(ref v) if v.field == "hot-keys"));
    }

    #[test]
    fn duplicate_slot_in_file_is_rejected() {
        let a = cam(1, &["F1"]).to_json().unwrap();
        let b = cam(1, &["F2"]).to_json().unwrap();
        let err = parse(json!({ "cameras": [a, b] })).unwrap_err();
        match err {
            Error::Validation(v) => assert_eq!(v.kind, ValidationKind::Duplicate),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let err = parse(json!({ "log_level": 9 })).unwrap_err();
        assert!(matches!(err, Error::Validation(ref v) if v.field == "log_level"));
        let err = parse(json!({ "log_level": "loud" })).unwrap_err();
        assert!(matches!(err, Error::Validation(ref v) if v.kind == ValidationKind::WrongType));
    }

    #[test]
    fn cameras_must_be_a_list() {
        let err = parse(json!({ "cameras": 5 })).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = ConfigDocument::from_json_str("{ nope", Path::new("x")).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn armed_skips_inactive_and_empty() {
        let mut off = cam(2, &["F2"]);
        off.activated = false;
        let doc = ConfigDocument {
            cameras: vec![cam(1, &["F1"]), off, cam(3, &[])],
            ..ConfigDocument::default()
        };
        let armed: Vec<u8> = doc.armed().map(|c| c.number).collect();
        assert_eq!(armed, vec![1]);
    }
}
