//! Generation response parsing

use crate::error::StudioError;

use super::GenerationPatch;

/// Parse the JSON object out of a generation response.
///
/// Tries a strict parse of the full text first. Models often wrap the object
/// in prose or code fences, so on failure the first balanced-brace substring
/// is extracted and parsed strictly. Anything else is unparsable.
pub fn parse_response(text: &str) -> Result<GenerationPatch, StudioError> {
    if let Ok(patch) = serde_json::from_str::<GenerationPatch>(text) {
        return Ok(patch);
    }

    let candidate = balanced_object(text).ok_or(StudioError::UnparsableResponse)?;
    serde_json::from_str(candidate).map_err(|_| StudioError::UnparsableResponse)
}

/// First balanced-brace substring, string- and escape-aware.
///
/// Braces inside JSON string literals must not count toward nesting, so the
/// scan tracks quote and escape state byte by byte.
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in text.as_bytes().iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
