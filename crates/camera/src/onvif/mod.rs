//! ONVIF device backend over SOAP/HTTP.
//!
//! Opening a session asks the device service for its capabilities to find the
//! media and PTZ service addresses. Cameras that refuse the capability query
//! fall back to the conventional `/onvif/media_service` and
//! `/onvif/ptz_service` paths, so a credentials problem surfaces at profile
//! discovery rather than at open.

mod soap;
mod xml;

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, warn};

use self::soap::SoapClient;
use crate::{DeviceApi, DeviceError, DeviceSession, Endpoint, MediaProfile};

const DEVICE_NS: &str = "http://www.onvif.org/ver10/device/wsdl";
const MEDIA_NS: &str = "http://www.onvif.org/ver10/media/wsdl";
const PTZ_NS: &str = "http://www.onvif.org/ver20/ptz/wsdl";

/// ONVIF backend. Requests use the HTTP client's default timeout unless one
/// is set with [`with_timeout`](Self::with_timeout).
#[derive(Debug, Clone, Default)]
pub struct OnvifApi {
    timeout: Option<Duration>,
}

impl OnvifApi {
    /// Backend with the transport's default timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every request by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl DeviceApi for OnvifApi {
    fn open(&self, endpoint: &Endpoint) -> Result<Box<dyn DeviceSession>, DeviceError> {
        let mut builder = Client::builder();
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let http = builder
            .build()
            .map_err(|e| DeviceError::Transport(e.to_string()))?;
        let soap = SoapClient {
            http,
            username: endpoint.username.clone(),
            password: endpoint.password.clone(),
        };

        let base = format!("http://{}:{}/onvif", endpoint.address, endpoint.port);
        let device_url = format!("{base}/device_service");
        let body = format!(
            r#"<tds:GetCapabilities xmlns:tds="{DEVICE_NS}"><tds:Category>All</tds:Category></tds:GetCapabilities>"#
        );
        let (media_url, ptz_url) = match soap.call(&device_url, "GetCapabilities", &body) {
            Ok(caps) => (
                xml::capability_xaddr(&caps, "Media")
                    .unwrap_or_else(|| format!("{base}/media_service")),
                xml::capability_xaddr(&caps, "PTZ")
                    .unwrap_or_else(|| format!("{base}/ptz_service")),
            ),
            Err(DeviceError::Fault(reason)) => {
                warn!(address = %endpoint.address, %reason, "onvif_capabilities_refused");
                (format!("{base}/media_service"), format!("{base}/ptz_service"))
            }
            Err(e) => return Err(e),
        };
        debug!(address = %endpoint.address, %media_url, %ptz_url, "onvif_session_open");
        Ok(Box::new(OnvifSession {
            soap,
            media_url,
            ptz_url,
        }))
    }
}

struct OnvifSession {
    soap: SoapClient,
    media_url: String,
    ptz_url: String,
}

impl DeviceSession for OnvifSession {
    fn media_profiles(&self) -> Result<Vec<MediaProfile>, DeviceError> {
        let body = format!(r#"<trt:GetProfiles xmlns:trt="{MEDIA_NS}"/>"#);
        let resp = self.soap.call(&self.media_url, "GetProfiles", &body)?;
        Ok(xml::profile_tokens(&resp)
            .into_iter()
            .map(MediaProfile::new)
            .collect())
    }

    fn max_presets(&self) -> Result<i64, DeviceError> {
        let body = format!(r#"<tptz:GetNodes xmlns:tptz="{PTZ_NS}"/>"#);
        let resp = self.soap.call(&self.ptz_url, "GetNodes", &body)?;
        xml::first_max_presets(&resp)
            .ok_or_else(|| DeviceError::Parse("no PTZ node with MaximumNumberOfPresets".to_string()))
    }

    fn goto_preset(&self, profile_token: &str, preset: u32) -> Result<(), DeviceError> {
        let body = format!(
            r#"<tptz:GotoPreset xmlns:tptz="{PTZ_NS}"><tptz:ProfileToken>{}</tptz:ProfileToken><tptz:PresetToken>{preset}</tptz:PresetToken></tptz:GotoPreset>"#,
            xml::escape(profile_token)
        );
        self.soap.call(&self.ptz_url, "GotoPreset", &body)?;
        Ok(())
    }
}
