//! Seam between the controller and a device-control backend.

use std::fmt;

use crate::DeviceError;

/// Where and as whom to open a camera session.
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host name or IP address.
    pub address: String,
    /// Device-service port.
    pub port: u16,
    /// Account name.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// A media profile advertised by the camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaProfile {
    /// Opaque token used to address PTZ commands.
    pub token: String,
}

impl MediaProfile {
    /// Profile with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

/// Opens sessions to cameras.
pub trait DeviceApi: Send + Sync {
    /// Connect to the camera at `endpoint`.
    fn open(&self, endpoint: &Endpoint) -> Result<Box<dyn DeviceSession>, DeviceError>;
}

/// An open session to one camera.
pub trait DeviceSession: Send {
    /// Media profiles in the order the camera lists them.
    fn media_profiles(&self) -> Result<Vec<MediaProfile>, DeviceError>;
    /// Maximum number of presets of the first PTZ node, as reported.
    fn max_presets(&self) -> Result<i64, DeviceError>;
    /// Recall `preset` on the PTZ unit bound to `profile_token`.
    fn goto_preset(&self, profile_token: &str, preset: u32) -> Result<(), DeviceError>;
}
