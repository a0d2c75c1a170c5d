//! Base64 transport encoding used on the wire to the sandbox service

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Encodes UTF-8 text for transport. Empty text stays empty.
pub fn encode_for_transport(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    STANDARD.encode(text.as_bytes())
}

/// Decodes a transport value back into text
///
/// Never fails. Whitespace inside the value is ignored since the sandbox
/// wraps long base64 output into lines. If the value is not valid base64 or
/// not valid UTF-8 once decoded, it is returned unchanged.
pub fn decode_from_transport(encoded: &str) -> String {
    if encoded.is_empty() {
        return String::new();
    }

    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    match STANDARD
        .decode(compact.as_bytes())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
    {
        Some(text) => text,
        None => {
            log::debug!("Value is not valid transport encoding, keeping it raw");
            encoded.to_string()
        }
    }
}
