use crate::value::{RawRecord, Value};

/// Remove all `glyphs` from the text fields of `record`, leaving `key_column` and non-text fields untouched.
///
/// Extracts that went through a mismatched character encoding carry the pound sign as `Â£`, which has to go
/// before prices can be parsed.
pub fn sanitize<S: AsRef<str>>(record: RawRecord, key_column: &str, glyphs: &[S]) -> RawRecord {
    record
        .into_iter()
        .map(|(column, value)| {
            let value = match value {
                Value::Text(text) if column != key_column => Value::Text(strip(text, glyphs)),
                other => other,
            };
            (column, value)
        })
        .collect()
}

fn strip<S: AsRef<str>>(mut text: String, glyphs: &[S]) -> String {
    for glyph in glyphs.iter().map(AsRef::as_ref).filter(|g| !g.is_empty()) {
        if text.contains(glyph) {
            text = text.replace(glyph, "");
        }
    }
    text
}
