//! One camera slot: which chord recalls which preset on which camera.

use std::collections::HashSet;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use keyname::Platform;
use serde_json::{Map, Value, json};

use crate::error::{ValidationError, ValidationKind};

/// Lowest usable slot number.
pub const MIN_SLOT: u8 = 1;
/// Highest usable slot number.
pub const MAX_SLOT: u8 = 9;

const NUMBER: &str = "number";
const ACTIVATED: &str = "activated";
const HOT_KEYS: &str = "hot-keys";
const ADDRESS: &str = "address";
const PORT: &str = "port";
const USERNAME: &str = "username";
const PASSWORD: &str = "password";
const MAX_COUNT: &str = "max-count";
const PRESET: &str = "preset";

/// A camera slot and the hot-key chord bound to one of its presets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraBinding {
    /// Slot identity, 1..=9, unique within a store.
    pub number: u8,
    /// Inactive bindings are stored but never matched.
    pub activated: bool,
    /// Chord of canonical key names; empty means unarmed.
    pub hot_keys: Vec<String>,
    /// Camera host name or IP address.
    pub address: String,
    /// Camera device-service port.
    pub port: u16,
    /// Camera account name.
    pub username: String,
    /// Camera account password, kept in clear in memory.
    pub password: String,
    /// Highest preset index the camera reported at setup time.
    pub max_count: u32,
    /// Preset recalled by the chord, 1..=max_count.
    pub preset: u32,
}

impl CameraBinding {
    /// True when the binding can ever match: activated with a non-empty chord.
    pub fn is_armed(&self) -> bool {
        self.activated && !self.hot_keys.is_empty()
    }

    /// Chord in the form the key resolver emits.
    pub fn chord(&self) -> Vec<String> {
        self.hot_keys.iter().map(|k| keyname::canonical(k)).collect()
    }

    /// Check every semantic invariant of a binding against this platform's key names.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_on(Platform::current())
    }

    /// Check every semantic invariant of a binding; hot keys must be names
    /// `platform` reports.
    pub fn validate_on(&self, platform: Platform) -> Result<(), ValidationError> {
        let n = self.number;
        if !(MIN_SLOT..=MAX_SLOT).contains(&n) {
            return Err(ValidationError::new(
                None,
                NUMBER,
                ValidationKind::OutOfRange,
                format!("Incorrect camera number ({n})"),
            ));
        }
        let slot = Some(n);
        let mut seen = HashSet::new();
        for (i, key) in self.hot_keys.iter().enumerate() {
            let idx = i + 1;
            if key.is_empty() {
                return Err(ValidationError::new(
                    slot,
                    HOT_KEYS,
                    ValidationKind::Invalid,
                    format!("Empty hot key №{idx} for camera №{n}"),
                ));
            }
            if !keyname::is_valid_key_name_on(key, platform) {
                return Err(ValidationError::new(
                    slot,
                    HOT_KEYS,
                    ValidationKind::Invalid,
                    format!("Wrong hot key value №{idx} ({key:?}) for camera №{n}"),
                ));
            }
            if !seen.insert(keyname::canonical(key)) {
                return Err(ValidationError::new(
                    slot,
                    HOT_KEYS,
                    ValidationKind::Duplicate,
                    format!("Repeated hot key №{idx} ({key:?}) for camera №{n}"),
                ));
            }
        }
        if self.address.is_empty() {
            return Err(ValidationError::new(
                slot,
                ADDRESS,
                ValidationKind::Invalid,
                format!("Empty address for camera №{n}"),
            ));
        }
        if self.port < 1 {
            return Err(ValidationError::new(
                slot,
                PORT,
                ValidationKind::OutOfRange,
                format!("Wrong port value ({}) for camera №{n}", self.port),
            ));
        }
        if self.max_count < 1 {
            return Err(ValidationError::new(
                slot,
                MAX_COUNT,
                ValidationKind::OutOfRange,
                format!("Wrong max count value ({}) for camera №{n}", self.max_count),
            ));
        }
        if self.preset < 1 || self.preset > self.max_count {
            return Err(ValidationError::new(
                slot,
                PRESET,
                ValidationKind::OutOfRange,
                format!(
                    "Wrong preset value ({}) for camera №{n}, expected 1..={}",
                    self.preset, self.max_count
                ),
            ));
        }
        Ok(())
    }

    /// Validate and render the on-disk object; the password is Base64-encoded.
    pub fn to_json(&self) -> Result<Value, ValidationError> {
        self.to_json_on(Platform::current())
    }

    /// [`to_json`](Self::to_json), validating hot keys for `platform`.
    pub fn to_json_on(&self, platform: Platform) -> Result<Value, ValidationError> {
        self.validate_on(platform)?;
        Ok(json!({
            NUMBER: self.number,
            ACTIVATED: self.activated,
            HOT_KEYS: self.hot_keys,
            ADDRESS: self.address,
            PORT: self.port,
            USERNAME: self.username,
            PASSWORD: STANDARD.encode(self.password.as_bytes()),
            MAX_COUNT: self.max_count,
            PRESET: self.preset,
        }))
    }

    /// Rebuild a binding from its on-disk object.
    ///
    /// All field types are checked before any range or semantic check, and
    /// each failure names the field and, once known, the slot.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        Self::from_json_on(value, Platform::current())
    }

    /// [`from_json`](Self::from_json), validating hot keys for `platform`.
    pub fn from_json_on(value: &Value, platform: Platform) -> Result<Self, ValidationError> {
        let obj = value.as_object().ok_or_else(|| {
            ValidationError::new(
                None,
                "camera",
                ValidationKind::WrongType,
                "Camera entry is not an object",
            )
        })?;
        let number = match obj.get(NUMBER) {
            None => {
                return Err(ValidationError::new(
                    None,
                    NUMBER,
                    ValidationKind::Missing,
                    "Not found camera number",
                ));
            }
            Some(v) => v.as_i64().ok_or_else(|| {
                ValidationError::new(
                    None,
                    NUMBER,
                    ValidationKind::WrongType,
                    "Wrong type of camera number",
                )
            })?,
        };
        let number = u8::try_from(number)
            .ok()
            .filter(|n| (MIN_SLOT..=MAX_SLOT).contains(n))
            .ok_or_else(|| {
                ValidationError::new(
                    None,
                    NUMBER,
                    ValidationKind::OutOfRange,
                    format!("Incorrect camera number ({number})"),
                )
            })?;

        let fields = Fields { obj, number };
        let activated = fields.boolean(ACTIVATED)?;
        let hot_keys = fields.string_list(HOT_KEYS)?;
        let address = fields.string(ADDRESS)?;
        let port = fields.integer(PORT)?;
        let username = fields.string(USERNAME)?;
        let encoded = fields.string(PASSWORD)?;
        let max_count = fields.integer(MAX_COUNT)?;
        let preset = fields.integer(PRESET)?;

        let password = STANDARD
            .decode(encoded.as_bytes())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| {
                fields.error(
                    PASSWORD,
                    ValidationKind::Invalid,
                    format!("Incorrect password encoding for camera №{number}"),
                )
            })?;
        let port = u16::try_from(port)
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| fields.out_of_range(PORT, port))?;
        let max_count = u32::try_from(max_count)
            .ok()
            .filter(|m| *m >= 1)
            .ok_or_else(|| fields.out_of_range(MAX_COUNT, max_count))?;
        let preset = u32::try_from(preset).map_err(|_| fields.out_of_range(PRESET, preset))?;

        let binding = Self {
            number,
            activated,
            hot_keys,
            address,
            port,
            username,
            password,
            max_count,
            preset,
        };
        binding.validate_on(platform)?;
        Ok(binding)
    }
}

/// Typed accessors over one camera object.
struct Fields<'a> {
    obj: &'a Map<String, Value>,
    number: u8,
}

impl<'a> Fields<'a> {
    fn error(
        &self,
        field: &'static str,
        kind: ValidationKind,
        message: String,
    ) -> ValidationError {
        ValidationError::new(Some(self.number), field, kind, message)
    }

    fn wrong_type(&self, field: &'static str) -> ValidationError {
        self.error(
            field,
            ValidationKind::WrongType,
            format!("Wrong {field} type for camera №{}", self.number),
        )
    }

    fn out_of_range(&self, field: &'static str, value: i64) -> ValidationError {
        self.error(
            field,
            ValidationKind::OutOfRange,
            format!("Wrong {field} value ({value}) for camera №{}", self.number),
        )
    }

    fn get(&self, field: &'static str) -> Result<&'a Value, ValidationError> {
        self.obj.get(field).ok_or_else(|| {
            self.error(
                field,
                ValidationKind::Missing,
                format!("Not found {field} for camera №{}", self.number),
            )
        })
    }

    fn boolean(&self, field: &'static str) -> Result<bool, ValidationError> {
        self.get(field)?
            .as_bool()
            .ok_or_else(|| self.wrong_type(field))
    }

    fn integer(&self, field: &'static str) -> Result<i64, ValidationError> {
        self.get(field)?
            .as_i64()
            .ok_or_else(|| self.wrong_type(field))
    }

    fn string(&self, field: &'static str) -> Result<String, ValidationError> {
        self.get(field)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.wrong_type(field))
    }

    fn string_list(&self, field: &'static str) -> Result<Vec<String>, ValidationError> {
        let items = self
            .get(field)?
            .as_array()
            .ok_or_else(|| self.wrong_type(field))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    self.error(
                        field,
                        ValidationKind::WrongType,
                        format!("Wrong type of hot key №{} for camera №{}", i + 1, self.number),
                    )
                })
            })
            .collect()
    }
}
