//! SOAP 1.2 envelopes with WS-Security UsernameToken digest authentication.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::{blocking::Client, header::CONTENT_TYPE};
use sha1::{Digest, Sha1};
use tracing::trace;

use super::xml;
use crate::DeviceError;

/// PasswordDigest = Base64(SHA1(nonce + created + password)).
pub(crate) fn password_digest(nonce: &[u8], created: &str, password: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(nonce);
    hasher.update(created.as_bytes());
    hasher.update(password.as_bytes());
    STANDARD.encode(hasher.finalize())
}

fn security_header(username: &str, password: &str, nonce: &[u8], created: &str) -> String {
    format!(
        r#"<s:Header>
    <wsse:Security s:mustUnderstand="true" xmlns:wsse="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd" xmlns:wsu="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd">
      <wsse:UsernameToken>
        <wsse:Username>{}</wsse:Username>
        <wsse:Password Type="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordDigest">{}</wsse:Password>
        <wsse:Nonce EncodingType="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary">{}</wsse:Nonce>
        <wsu:Created>{}</wsu:Created>
      </wsse:UsernameToken>
    </wsse:Security>
  </s:Header>"#,
        xml::escape(username),
        password_digest(nonce, created, password),
        STANDARD.encode(nonce),
        created
    )
}

/// Wrap `body` in an envelope, authenticated when `username` is non-empty.
pub(crate) fn envelope(username: &str, password: &str, body: &str) -> String {
    let header = if username.is_empty() {
        String::new()
    } else {
        let nonce: [u8; 16] = rand::random();
        let created = chrono::Utc::now()
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string();
        security_header(username, password, &nonce, &created)
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope">
  {header}
  <s:Body>
    {body}
  </s:Body>
</s:Envelope>"#
    )
}

/// Authenticated SOAP caller for one camera.
pub(crate) struct SoapClient {
    pub(crate) http: Client,
    pub(crate) username: String,
    pub(crate) password: String,
}

impl SoapClient {
    /// POST `body` to `url` and return the response text.
    ///
    /// Unreachable hosts are `Transport`; SOAP faults and HTTP error statuses
    /// are `Fault`.
    pub(crate) fn call(&self, url: &str, action: &str, body: &str) -> Result<String, DeviceError> {
        trace!(%url, %action, "onvif_request");
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/soap+xml; charset=utf-8")
            .body(envelope(&self.username, &self.password, body))
            .send()
            .map_err(|e| DeviceError::Transport(format!("{action}: {e}")))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| DeviceError::Transport(format!("{action}: {e}")))?;
        if let Some(reason) = xml::fault_reason(&text) {
            return Err(DeviceError::Fault(format!("{action}: {reason}")));
        }
        if !status.is_success() {
            return Err(DeviceError::Fault(format!("{action}: HTTP {status}")));
        }
        Ok(text)
    }
}
