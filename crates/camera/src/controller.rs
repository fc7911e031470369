use tracing::{debug, trace};

use crate::{
    DeviceApi, DeviceSession, Endpoint,
    error::{CameraError, Result},
};

/// A connected camera, ready to recall presets.
///
/// Built all-or-nothing by [`connect`](Self::connect): open the session,
/// discover media profiles, then read the preset count. Each stage fails with
/// its own [`CameraError`] variant. Nothing is retried.
pub struct CameraController {
    address: String,
    session: Option<Box<dyn DeviceSession>>,
    profile_token: String,
    preset_count: u32,
}

impl CameraController {
    /// Open a session to `endpoint` through `api` and discover its presets.
    pub fn connect(api: &dyn DeviceApi, endpoint: &Endpoint) -> Result<Self> {
        if endpoint.address.is_empty() {
            return Err(CameraError::InvalidArgument(
                "camera address is empty".to_string(),
            ));
        }
        if endpoint.port < 1 {
            return Err(CameraError::InvalidArgument(format!(
                "camera port {} is outside 1..=65535",
                endpoint.port
            )));
        }
        let address = endpoint.address.clone();

        debug!(%address, port = endpoint.port, "camera_open");
        let session = api
            .open(endpoint)
            .map_err(|source| CameraError::ConnectionFailed {
                address: address.clone(),
                source,
            })?;

        let profiles =
            session
                .media_profiles()
                .map_err(|source| CameraError::AuthenticationOrProfileFailed {
                    address: address.clone(),
                    source,
                })?;
        let Some(first) = profiles.into_iter().next() else {
            return Err(CameraError::NoMediaProfiles { address });
        };
        trace!(%address, token = %first.token, "camera_profile");

        let preset_count = discover_presets(session.as_ref(), &address)?;
        debug!(%address, preset_count, "camera_ready");
        Ok(Self {
            address,
            session: Some(session),
            profile_token: first.token,
            preset_count,
        })
    }

    /// Camera address this controller talks to.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Token of the first media profile.
    pub fn profile_token(&self) -> &str {
        &self.profile_token
    }

    /// Cached preset count.
    pub fn preset_count(&self) -> u32 {
        self.preset_count
    }

    /// Recall preset `n`.
    ///
    /// A cached count of zero is refreshed once first; `Ok(false)` means the
    /// camera still has no presets. `n` outside `1..=preset_count` is an
    /// [`CameraError::InvalidArgument`]. Success means the command completed,
    /// not that the camera finished moving.
    pub fn goto_preset(&mut self, n: u32) -> Result<bool> {
        let Some(session) = self.session.as_deref() else {
            return Err(CameraError::CameraNotInitialized);
        };
        if self.preset_count == 0 {
            self.preset_count = discover_presets(session, &self.address)?;
            if self.preset_count == 0 {
                debug!(address = %self.address, "camera_no_presets");
                return Ok(false);
            }
        }
        if n < 1 || n > self.preset_count {
            return Err(CameraError::InvalidArgument(format!(
                "preset {n} is outside 1..={}",
                self.preset_count
            )));
        }
        session
            .goto_preset(&self.profile_token, n)
            .map_err(|source| CameraError::MoveCommandFailed {
                address: self.address.clone(),
                preset: n,
                source,
            })?;
        Ok(true)
    }

    /// Drop the session; later moves fail with `CameraNotInitialized`.
    pub fn close(&mut self) {
        self.session = None;
    }
}

fn discover_presets(session: &dyn DeviceSession, address: &str) -> Result<u32> {
    let count = session
        .max_presets()
        .map_err(|e| CameraError::PresetCapabilityUnavailable {
            address: address.to_string(),
            reason: e.to_string(),
        })?;
    u32::try_from(count).map_err(|_| CameraError::PresetCapabilityUnavailable {
        address: address.to_string(),
        reason: format!("camera reported {count} presets"),
    })
}
