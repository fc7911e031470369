//! Namespace-agnostic extraction from ONVIF SOAP responses.

use once_cell::sync::Lazy;
use regex::Regex;

static FAULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(?:[\w-]+:)?Fault[\s>]").expect("static regex"));
static FAULT_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<(?:[\w-]+:)?(?:Text|faultstring)\b[^>]*>\s*([^<]*?)\s*</")
        .expect("static regex")
});
static PROFILE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<(?:[\w-]+:)?Profiles\b[^>]*?\btoken\s*=\s*["']([^"']+)["']"#)
        .expect("static regex")
});
static MAX_PRESETS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(?:[\w-]+:)?MaximumNumberOfPresets>\s*(-?\d+)\s*</")
        .expect("static regex")
});
static XADDR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(?:[\w-]+:)?XAddr>\s*([^<\s]+)\s*</").expect("static regex")
});

/// Fault reason if the response is a SOAP fault.
pub(crate) fn fault_reason(xml: &str) -> Option<String> {
    if !FAULT.is_match(xml) {
        return None;
    }
    let reason = FAULT_TEXT
        .captures(xml)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "SOAP fault".to_string());
    Some(reason)
}

/// Tokens of every `Profiles` element, in document order.
pub(crate) fn profile_tokens(xml: &str) -> Vec<String> {
    PROFILE_TOKEN
        .captures_iter(xml)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// `MaximumNumberOfPresets` of the first PTZ node.
pub(crate) fn first_max_presets(xml: &str) -> Option<i64> {
    MAX_PRESETS
        .captures(xml)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// `XAddr` of a capability section such as `Media` or `PTZ`.
pub(crate) fn capability_xaddr(xml: &str, capability: &str) -> Option<String> {
    let open = Regex::new(&format!(r"<(?:[\w-]+:)?{}\b[^>]*>", regex::escape(capability))).ok()?;
    let close = Regex::new(&format!(r"</(?:[\w-]+:)?{}>", regex::escape(capability))).ok()?;
    let start = open.find(xml)?.end();
    let section = &xml[start..];
    let end = close.find(section).map_or(section.len(), |m| m.start());
    XADDR
        .captures(&section[..end])
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Escape text for use inside an XML element.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
