//! Small XML writing helpers.

use std::borrow::Cow;

/// Escape text or attribute content.
pub fn escape(text: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(text)
}

/// Turn an arbitrary property key into a usable XML element name.
///
/// Characters outside `[A-Za-z0-9_.-]` become `_`, and a leading character
/// that cannot start a name is prefixed with `_`.
pub fn element_name(key: &str) -> String {
    let mut name: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let starts_ok = name
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if !starts_ok {
        name.insert(0, '_');
    }
    name
}
