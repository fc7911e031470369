use crate::{Platform, RawKey, SpecialKey, names::NUMPAD_KEYS};

/// Resolve a raw key to its canonical name on the running platform.
///
/// Returns `None` for keys with no mapping; callers ignore such events.
pub fn resolve(key: &RawKey) -> Option<String> {
    resolve_on(key, Platform::current())
}

/// Resolve a raw key to its canonical name as `platform` would.
///
/// - Characters are upper-cased; only printable ASCII is named.
/// - Special keys use the canonical table, if the platform reports them.
/// - Raw virtual-key codes are consulted only where the platform reports
///   keypad digits that way.
pub fn resolve_on(key: &RawKey, platform: Platform) -> Option<String> {
    match *key {
        RawKey::Char(c) => printable_name(c),
        RawKey::Special(k) => k.available_on(platform).then(|| k.name().to_string()),
        RawKey::Virtual(code) => numpad_name(code, platform).map(str::to_string),
    }
}

/// Whether `text` is a legal stored hot-key token on the running platform.
pub fn is_valid_key_name(text: &str) -> bool {
    is_valid_key_name_on(text, Platform::current())
}

/// Whether `text` is a legal stored hot-key token on `platform`.
///
/// Accepts every name [`resolve_on`] can produce for `platform`, plus any single
/// printable ASCII character in either case.
pub fn is_valid_key_name_on(text: &str, platform: Platform) -> bool {
    if let Some(k) = SpecialKey::from_name(text) {
        return k.available_on(platform);
    }
    if platform.reports_numpad_codes() && NUMPAD_KEYS.iter().any(|(_, n)| *n == text) {
        return true;
    }
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => is_printable_ascii(c),
        _ => false,
    }
}

/// Normalize a stored token to the form [`resolve`] emits.
///
/// Single characters are upper-cased; table names are returned unchanged.
pub fn canonical(text: &str) -> String {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_ascii_uppercase().to_string(),
        _ => text.to_string(),
    }
}

/// Every multi-character name valid on `platform`, in table order.
pub fn all_names_on(platform: Platform) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = SpecialKey::ALL
        .iter()
        .filter(|k| k.available_on(platform))
        .map(|k| k.name())
        .collect();
    if platform.reports_numpad_codes() {
        names.extend(NUMPAD_KEYS.iter().map(|(_, n)| *n));
    }
    names
}

fn printable_name(c: char) -> Option<String> {
    if !c.is_ascii() {
        return None;
    }
    let upper = c.to_ascii_uppercase();
    is_printable_ascii(upper).then(|| upper.to_string())
}

fn numpad_name(code: u32, platform: Platform) -> Option<&'static str> {
    if !platform.reports_numpad_codes() {
        return None;
    }
    NUMPAD_KEYS
        .iter()
        .find(|(vk, _)| *vk == code)
        .map(|(_, name)| *name)
}

fn is_printable_ascii(c: char) -> bool {
    c.is_ascii_graphic() || c == ' '
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const PLATFORMS: [Platform; 4] = [
        Platform::Windows,
        Platform::MacOs,
        Platform::Linux,
        Platform::Other,
    ];

    fn raw_key_strategy() -> impl Strategy<Value = RawKey> {
        prop_oneof![
            any::<char>().prop_map(RawKey::Char),
            (0..SpecialKey::ALL.len()).prop_map(|i| RawKey::Special(SpecialKey::ALL[i])),
            (0u32..300).prop_map(RawKey::Virtual),
        ]
    }

    proptest! {
        #[test]
        fn every_resolved_name_is_valid(key in raw_key_strategy()) {
            for platform in PLATFORMS {
                if let Some(name) = resolve_on(&key, platform) {
                    prop_assert!(is_valid_key_name_on(&name, platform), "{name:?} on {platform:?}");
                }
            }
        }
    }

    #[test]
    fn printable_characters_are_uppercased() {
        assert_eq!(resolve_on(&RawKey::Char('a'), Platform::Linux).as_deref(), Some("A"));
        assert_eq!(resolve_on(&RawKey::Char('7'), Platform::Linux).as_deref(), Some("7"));
        assert_eq!(resolve_on(&RawKey::Char('/'), Platform::Linux).as_deref(), Some("/"));
    }

    #[test]
    fn unprintable_characters_have_no_name() {
        assert_eq!(resolve_on(&RawKey::Char('\u{1b}'), Platform::Linux), None);
        assert_eq!(resolve_on(&RawKey::Char('é'), Platform::Linux), None);
    }

    #[test]
    fn special_keys_use_table_names() {
        let key = RawKey::Special(SpecialKey::PageUp);
        assert_eq!(resolve_on(&key, Platform::MacOs).as_deref(), Some("PAGE UP"));
        let key = RawKey::Special(SpecialKey::F12);
        assert_eq!(resolve_on(&key, Platform::Linux).as_deref(), Some("F12"));
    }

    #[test]
    fn numpad_codes_only_resolve_on_windows() {
        assert_eq!(resolve_on(&RawKey::Virtual(96), Platform::Windows).as_deref(), Some("NUM 0"));
        assert_eq!(resolve_on(&RawKey::Virtual(105), Platform::Windows).as_deref(), Some("NUM 9"));
        assert_eq!(resolve_on(&RawKey::Virtual(106), Platform::Windows), None);
        assert_eq!(resolve_on(&RawKey::Virtual(96), Platform::Linux), None);
    }

    #[test]
    fn validity_follows_platform_for_numpad() {
        assert!(is_valid_key_name_on("NUM 3", Platform::Windows));
        assert!(!is_valid_key_name_on("NUM 3", Platform::Linux));
    }

    #[test]
    fn validity_rejects_unknown_names() {
        assert!(!is_valid_key_name_on("", Platform::Linux));
        assert!(!is_valid_key_name_on("HYPER", Platform::Linux));
        assert!(!is_valid_key_name_on("ctrl l", Platform::Linux));
        assert!(!is_valid_key_name_on("é", Platform::Linux));
        assert!(is_valid_key_name_on("a", Platform::Linux));
        assert!(is_valid_key_name_on("CTRL", Platform::Linux));
        assert!(is_valid_key_name_on("CTRL L", Platform::Windows));
    }

    #[test]
    fn names_a_platform_never_reports_are_invalid_there() {
        assert!(!is_valid_key_name_on("CTRL L", Platform::Linux));
        assert!(!is_valid_key_name_on("CTRL", Platform::Windows));
        assert!(!is_valid_key_name_on("F13", Platform::MacOs));
        assert_eq!(
            resolve_on(&RawKey::Special(SpecialKey::ShiftL), Platform::Linux),
            None
        );
    }

    #[test]
    fn validity_matches_the_name_list() {
        for platform in PLATFORMS {
            let names = all_names_on(platform);
            for key in SpecialKey::ALL {
                assert_eq!(
                    names.contains(&key.name()),
                    is_valid_key_name_on(key.name(), platform),
                    "{key:?} on {platform:?}"
                );
            }
        }
    }

    #[test]
    fn canonical_uppercases_single_characters() {
        assert_eq!(canonical("a"), "A");
        assert_eq!(canonical("CTRL L"), "CTRL L");
    }

    #[test]
    fn all_names_include_numpad_on_windows_only() {
        assert!(all_names_on(Platform::Windows).contains(&"NUM 0"));
        assert!(!all_names_on(Platform::Linux).contains(&"NUM 0"));
        assert!(all_names_on(Platform::Windows).contains(&"NEXT MEDIA"));
        assert!(!all_names_on(Platform::Linux).contains(&"NEXT MEDIA"));
    }
}
