//! Camera sessions for recalling PTZ presets.
//!
//! [`CameraController`] drives a camera through a [`DeviceApi`] backend:
//! [`onvif::OnvifApi`] for real devices, `mock::MockDeviceApi` (feature
//! `test-utils`) for tests.
#![warn(missing_docs)]

mod controller;
mod device;
mod error;
pub mod onvif;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use controller::CameraController;
pub use device::{DeviceApi, DeviceSession, Endpoint, MediaProfile};
pub use error::{CameraError, CameraErrorKind, DeviceError, Result};
