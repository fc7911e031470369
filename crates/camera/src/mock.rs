//! Scripted [`DeviceApi`] for tests.
//!
//! Each address gets a [`CameraScript`] describing how every stage answers.
//! Unknown addresses fail to open. Every recall-preset call is recorded.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::{DeviceApi, DeviceError, DeviceSession, Endpoint, MediaProfile};

/// How one scripted camera answers.
#[derive(Debug, Clone)]
pub struct CameraScript {
    /// Outcome of opening a session.
    pub open: Result<(), DeviceError>,
    /// Outcome of profile discovery.
    pub profiles: Result<Vec<MediaProfile>, DeviceError>,
    /// Successive preset-count answers; the last one repeats.
    pub max_presets: Vec<Result<i64, DeviceError>>,
    /// Outcome of every recall-preset call.
    pub goto: Result<(), DeviceError>,
}

impl CameraScript {
    /// A camera with one profile (`profile_1`) and `presets` presets.
    pub fn healthy(presets: i64) -> Self {
        Self {
            open: Ok(()),
            profiles: Ok(vec![MediaProfile::new("profile_1")]),
            max_presets: vec![Ok(presets)],
            goto: Ok(()),
        }
    }
}

/// A recorded recall-preset call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GotoCall {
    /// Camera address.
    pub address: String,
    /// Profile token used.
    pub token: String,
    /// Preset requested.
    pub preset: u32,
}

#[derive(Default)]
struct Shared {
    scripts: HashMap<String, CameraScript>,
    opens: Vec<String>,
    gotos: Vec<GotoCall>,
}

/// Scripted device backend.
#[derive(Clone, Default)]
pub struct MockDeviceApi {
    shared: Arc<Mutex<Shared>>,
}

impl MockDeviceApi {
    /// A backend with no reachable cameras.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `address` answer according to `script`.
    pub fn script(&self, address: &str, script: CameraScript) {
        self.shared
            .lock()
            .scripts
            .insert(address.to_string(), script);
    }

    /// Recall-preset calls in the order they were made.
    pub fn goto_calls(&self) -> Vec<GotoCall> {
        self.shared.lock().gotos.clone()
    }

    /// Number of session opens attempted for `address`.
    pub fn open_count(&self, address: &str) -> usize {
        self.shared
            .lock()
            .opens
            .iter()
            .filter(|a| *a == address)
            .count()
    }
}

impl DeviceApi for MockDeviceApi {
    fn open(&self, endpoint: &Endpoint) -> Result<Box<dyn DeviceSession>, DeviceError> {
        let mut shared = self.shared.lock();
        shared.opens.push(endpoint.address.clone());
        let script = shared
            .scripts
            .get(&endpoint.address)
            .cloned()
            .ok_or_else(|| DeviceError::Transport(format!("{}: no route to host", endpoint.address)))?;
        script.open.clone()?;
        Ok(Box::new(MockSession {
            address: endpoint.address.clone(),
            presets: Mutex::new(script.max_presets.clone()),
            script,
            shared: self.shared.clone(),
        }))
    }
}

struct MockSession {
    address: String,
    script: CameraScript,
    presets: Mutex<Vec<Result<i64, DeviceError>>>,
    shared: Arc<Mutex<Shared>>,
}

impl DeviceSession for MockSession {
    fn media_profiles(&self) -> Result<Vec<MediaProfile>, DeviceError> {
        self.script.profiles.clone()
    }

    fn max_presets(&self) -> Result<i64, DeviceError> {
        let mut answers = self.presets.lock();
        match answers.len() {
            0 => Err(DeviceError::Parse("no PTZ nodes".to_string())),
            1 => answers[0].clone(),
            _ => answers.remove(0),
        }
    }

    fn goto_preset(&self, profile_token: &str, preset: u32) -> Result<(), DeviceError> {
        self.shared.lock().gotos.push(GotoCall {
            address: self.address.clone(),
            token: profile_token.to_string(),
            preset,
        });
        self.script.goto.clone()
    }
}
