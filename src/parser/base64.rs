//! Base64 helpers for share-link payloads and wrapped subscription feeds.
//!
//! Share-link tooling is sloppy about alphabets: payloads arrive in standard
//! or URL-safe Base64, with or without padding, sometimes with line breaks in
//! the middle. Decoding therefore tries every variant before giving up.

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};

/// Decode Base64 of unknown flavor into raw bytes.
pub fn decode_base64(content: &str) -> Result<Vec<u8>> {
    // Strip all whitespace first; feeds often wrap the blob across lines.
    let cleaned: String = content.chars().filter(|c| !c.is_whitespace()).collect();

    for engine in [STANDARD, URL_SAFE, URL_SAFE_NO_PAD] {
        if let Ok(decoded) = engine.decode(&cleaned) {
            return Ok(decoded);
        }
    }

    // Last resort: repair missing padding and retry the padded alphabets.
    let padded = pad_base64(&cleaned);
    for engine in [STANDARD, URL_SAFE] {
        if let Ok(decoded) = engine.decode(&padded) {
            return Ok(decoded);
        }
    }

    bail!("not valid Base64 in any supported variant")
}

/// Decode Base64 that must contain UTF-8 text.
pub fn decode_base64_text(content: &str) -> Result<String> {
    let bytes = decode_base64(content)?;
    String::from_utf8(bytes).context("decoded Base64 is not valid UTF-8")
}

/// Pad a Base64 string out to a multiple of four characters.
fn pad_base64(s: &str) -> String {
    let mut result = s.to_string();
    while !result.len().is_multiple_of(4) {
        result.push('=');
    }
    result
}
