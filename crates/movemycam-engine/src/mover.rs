use std::sync::Arc;

use camera::{CameraController, CameraErrorKind, DeviceApi, Endpoint};
use config::CameraBinding;
use tracing::{error, info, warn};

use crate::notification::NotificationDispatcher;

/// What happened to one move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The recall-preset command completed.
    Moved,
    /// The camera has no presets configured.
    NoPresets,
    /// A stage failed.
    Failed(CameraErrorKind),
}

/// Log reason and notification text for a failure stage.
fn failure_text(kind: CameraErrorKind) -> (&'static str, &'static str) {
    match kind {
        CameraErrorKind::InvalidArgument => ("wrong data", "Camera not moved!"),
        CameraErrorKind::ConnectionFailed => {
            ("connection failed", "Camera not moved! Connection failed")
        }
        CameraErrorKind::AuthenticationOrProfileFailed => (
            "wrong username/password",
            "Camera not moved! Wrong username/password",
        ),
        CameraErrorKind::NoMediaProfiles => {
            ("no media profiles", "Camera not moved! No media profiles")
        }
        CameraErrorKind::PresetCapabilityUnavailable => (
            "request preset count failed",
            "Camera not moved! Request preset count failed",
        ),
        CameraErrorKind::CameraNotInitialized => {
            ("camera not initialized", "Camera not initialized!")
        }
        CameraErrorKind::MoveCommandFailed => ("move command failed", "Camera not moved!"),
    }
}

/// Connects to a bound camera and recalls its preset, reporting the result.
pub(crate) struct Mover {
    api: Arc<dyn DeviceApi>,
    notifications: Arc<NotificationDispatcher>,
}

impl Mover {
    pub(crate) fn new(api: Arc<dyn DeviceApi>, notifications: Arc<NotificationDispatcher>) -> Self {
        Self { api, notifications }
    }

    /// Run one move. Every outcome yields one log record and one notification.
    pub(crate) fn move_to_preset(&self, binding: &CameraBinding) -> MoveOutcome {
        let endpoint = Endpoint {
            address: binding.address.clone(),
            port: binding.port,
            username: binding.username.clone(),
            password: binding.password.clone(),
        };
        let title = format!("Camera {}", binding.address);
        let result = CameraController::connect(self.api.as_ref(), &endpoint)
            .and_then(|mut controller| controller.goto_preset(binding.preset));

        match result {
            Ok(true) => {
                info!(
                    number = binding.number,
                    "Camera with address \"{}\" moved to preset №{}",
                    binding.address,
                    binding.preset
                );
                self.notifications
                    .send(&title, &format!("Camera moved to preset №{}", binding.preset));
                MoveOutcome::Moved
            }
            Ok(false) => {
                warn!(
                    number = binding.number,
                    "Camera with address \"{}\" not moved to preset №{} (no presets on camera)",
                    binding.address,
                    binding.preset
                );
                self.notifications
                    .send(&title, "Camera not moved! No presets on camera");
                MoveOutcome::NoPresets
            }
            Err(e) => {
                let kind = e.kind();
                let (reason, text) = failure_text(kind);
                error!(
                    number = binding.number,
                    error = %e,
                    "Camera with address \"{}\" not moved to preset №{} ({})",
                    binding.address,
                    binding.preset,
                    reason
                );
                self.notifications.send(&title, text);
                MoveOutcome::Failed(kind)
            }
        }
    }

    /// Report a matched move that was never attempted.
    pub(crate) fn report_dropped(&self, binding: &CameraBinding, reason: &str) {
        error!(
            number = binding.number,
            "Camera with address \"{}\" not moved to preset №{} ({})",
            binding.address,
            binding.preset,
            reason
        );
        self.notifications
            .send(&format!("Camera {}", binding.address), "Camera not moved!");
    }
}
