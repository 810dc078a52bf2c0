//! ZPL labels arrive XML-escaped; printers need the raw command stream.

use quick_xml::escape::{resolve_predefined_entity, unescape_with};

/// Reverses XML character escaping in a ZPL label.
///
/// Handles the five predefined entities plus decimal and hex character
/// references. Anything that is not a well-formed reference is copied through
/// unchanged.
pub fn unescape_xml(escaped: &str) -> String {
    match unescape_with(escaped, resolve_predefined_entity) {
        Ok(raw) => raw.into_owned(),
        Err(_) => unescape_lenient(escaped),
    }
}

/// Decodes reference by reference so one bad `&` does not poison the label
fn unescape_lenient(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut rest = escaped;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        let decoded = rest.find(';').and_then(|end| {
            unescape_with(&rest[..=end], resolve_predefined_entity)
                .ok()
                .map(|raw| (raw.into_owned(), end))
        });

        match decoded {
            Some((raw, end)) => {
                out.push_str(&raw);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
