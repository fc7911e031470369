//! Error types for camera sessions.

use thiserror::Error;

/// Failure reported by a device-control backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The camera could not be reached or the exchange was cut off.
    #[error("transport error: {0}")]
    Transport(String),
    /// The camera answered with a fault (rejected credentials, unsupported call).
    #[error("device fault: {0}")]
    Fault(String),
    /// The camera's answer could not be understood.
    #[error("unexpected response: {0}")]
    Parse(String),
}

/// Closed classification of [`CameraError`], one per failure stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraErrorKind {
    /// Malformed or out-of-range argument.
    InvalidArgument,
    /// Session open failed.
    ConnectionFailed,
    /// Media-profile discovery failed, usually bad credentials.
    AuthenticationOrProfileFailed,
    /// The camera has no media profiles.
    NoMediaProfiles,
    /// The preset count could not be obtained or is invalid.
    PresetCapabilityUnavailable,
    /// The controller holds no session.
    CameraNotInitialized,
    /// The recall-preset command failed.
    MoveCommandFailed,
}

/// Errors produced by [`CameraController`](crate::CameraController).
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("invalid argument: {0}")]
    /// Malformed or out-of-range argument.
    InvalidArgument(String),

    #[error("connection to camera {address} failed: {source}")]
    /// Session open failed.
    ConnectionFailed {
        /// Camera address.
        address: String,
        /// Backend failure.
        source: DeviceError,
    },

    #[error("getting media profiles from camera {address} failed: {source}")]
    /// Media-profile discovery failed.
    AuthenticationOrProfileFailed {
        /// Camera address.
        address: String,
        /// Backend failure.
        source: DeviceError,
    },

    #[error("camera {address} reports no media profiles")]
    /// The camera has no media profiles.
    NoMediaProfiles {
        /// Camera address.
        address: String,
    },

    #[error("preset count of camera {address} unavailable: {reason}")]
    /// The preset count could not be obtained or is invalid.
    PresetCapabilityUnavailable {
        /// Camera address.
        address: String,
        /// What went wrong.
        reason: String,
    },

    #[error("camera not initialized")]
    /// The controller holds no session.
    CameraNotInitialized,

    #[error("moving camera {address} to preset {preset} failed: {source}")]
    /// The recall-preset command failed.
    MoveCommandFailed {
        /// Camera address.
        address: String,
        /// Requested preset.
        preset: u32,
        /// Backend failure.
        source: DeviceError,
    },
}

impl CameraError {
    /// Stage classification of this error.
    pub fn kind(&self) -> CameraErrorKind {
        match self {
            Self::InvalidArgument(_) => CameraErrorKind::InvalidArgument,
            Self::ConnectionFailed { .. } => CameraErrorKind::ConnectionFailed,
            Self::AuthenticationOrProfileFailed { .. } => {
                CameraErrorKind::AuthenticationOrProfileFailed
            }
            Self::NoMediaProfiles { .. } => CameraErrorKind::NoMediaProfiles,
            Self::PresetCapabilityUnavailable { .. } => CameraErrorKind::PresetCapabilityUnavailable,
            Self::CameraNotInitialized => CameraErrorKind::CameraNotInitialized,
            Self::MoveCommandFailed { .. } => CameraErrorKind::MoveCommandFailed,
        }
    }
}

/// Result alias for controller operations.
pub type Result<T> = std::result::Result<T, CameraError>;
