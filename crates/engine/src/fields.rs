//! Bracketed-field surgery inside a layer's free text.
//!
//! A layer may embed named sub-fields as `[field_name] value` runs, e.g.
//! `[communication_style] concise, dry humor`. Internally the text is parsed
//! into a preamble plus an ordered field map and flattened back to one blob,
//! rather than spliced in place. A field's value runs from its marker to the
//! next marker or the end of text.
//!
//! Field markers are lowercase snake_case (`[communication_style]`).
//! Uppercase annotation tags the merge prompt introduces (`[NEW]`,
//! `[UPDATED]`) are not field markers and pass through untouched.
//!
//! Malformed input with the same marker repeated is normalized to a single
//! occurrence keeping the newest value. This path never calls the
//! summarization service; it is a pure, deterministic text transform.

use indexmap::IndexMap;

/// A layer's text split into free-form preamble and named fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLayer {
    /// Text before the first field marker.
    pub preamble: String,
    /// Field values in first-occurrence order. Duplicate markers keep the
    /// last value seen.
    pub fields: IndexMap<String, String>,
}

/// Replace (or append) the `[field_name]` sub-field, returning the full
/// layer text. The result contains exactly one `[field_name]` marker no
/// matter how many the input held.
pub fn update_field(layer_text: &str, field_name: &str, value: &str) -> String {
    let mut parsed = parse(layer_text);
    parsed
        .fields
        .insert(field_name.to_string(), value.trim().to_string());
    flatten(&parsed)
}

/// Split a layer's text into preamble and ordered fields.
pub fn parse(text: &str) -> ParsedLayer {
    let markers = find_markers(text);

    let preamble_end = markers.first().map_or(text.len(), |m| m.start);
    let preamble = text[..preamble_end].trim_end().to_string();

    let mut fields: IndexMap<String, String> = IndexMap::new();
    for (i, marker) in markers.iter().enumerate() {
        let value_start = marker.end;
        let value_end = markers.get(i + 1).map_or(text.len(), |next| next.start);
        let value = text[value_start..value_end].trim().to_string();
        // First occurrence fixes the position, last occurrence wins the value.
        fields.insert(marker.name.clone(), value);
    }

    ParsedLayer { preamble, fields }
}

/// Flatten back to a single text blob: preamble, then one `[name] value`
/// line per field in order.
pub fn flatten(parsed: &ParsedLayer) -> String {
    let mut out = String::new();
    if !parsed.preamble.is_empty() {
        out.push_str(&parsed.preamble);
    }
    for (name, value) in &parsed.fields {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push('[');
        out.push_str(name);
        out.push(']');
        if !value.is_empty() {
            out.push(' ');
            out.push_str(value);
        }
    }
    out
}

struct MarkerSpan {
    /// Byte offset of `[`.
    start: usize,
    /// Byte offset just past `]`.
    end: usize,
    name: String,
}

/// Scan for `[lowercase_snake_case]` marker spans.
fn find_markers(text: &str) -> Vec<MarkerSpan> {
    let bytes = text.as_bytes();
    let mut markers = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'[' {
            if let Some(close) = text[i + 1..].find(']') {
                let name = &text[i + 1..i + 1 + close];
                if is_field_name(name) {
                    markers.push(MarkerSpan {
                        start: i,
                        end: i + close + 2,
                        name: name.to_string(),
                    });
                    i += close + 2;
                    continue;
                }
            }
        }
        i += 1;
    }

    markers
}

/// Lowercase snake_case, starting with a letter.
fn is_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
