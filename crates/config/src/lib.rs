//! Camera bindings and the configuration store used by MoveMyCam.
//!
//! A [`ConfigStore`] owns one [`ConfigDocument`] and the JSON file it is
//! persisted to. It is constructed explicitly and handed to whoever needs it;
//! the engine receives it as a [`SharedStore`].
#![warn(missing_docs)]

mod binding;
mod document;
mod error;
mod store;

pub use binding::{CameraBinding, MAX_SLOT, MIN_SLOT};
pub use document::ConfigDocument;
pub use error::{Error, Result, ValidationError, ValidationKind};
pub use logging::LogLevel;
pub use store::{ConfigStore, SharedStore};

/// Configuration file used when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "MoveMyCam.conf";

/// Log file used when the configuration does not name one.
pub const DEFAULT_LOG_FILE: &str = "MoveMyCam.log";
