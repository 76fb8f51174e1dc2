//! Header encoding utilities: Base64 and RFC 2047 encoded-words.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::Result;

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decodes Base64 data.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD.decode(data).map_err(Into::into)
}

/// Encodes a header phrase as an RFC 2047 encoded-word when needed.
///
/// ASCII text free of encoded-word delimiters passes through unchanged;
/// anything else becomes `=?utf-8?B?...?=` (B encoding).
#[must_use]
pub fn encode_word(text: &str) -> String {
    if text.chars().all(|c| c.is_ascii() && c != '=' && c != '?') {
        return text.to_string();
    }

    format!("=?utf-8?B?{}?=", encode_base64(text.as_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base64_round_trip() {
        let encoded = encode_base64(b"Guildpost");
        assert_eq!(encoded, "R3VpbGRwb3N0");
        assert_eq!(decode_base64(&encoded).unwrap(), b"Guildpost");
    }

    #[test]
    fn ascii_passes_through() {
        assert_eq!(encode_word("Events Team"), "Events Team");
    }

    #[test]
    fn non_ascii_becomes_encoded_word() {
        let encoded = encode_word("Ayşe Kaya");
        assert!(encoded.starts_with("=?utf-8?B?"));
        assert!(encoded.ends_with("?="));

        let inner = encoded
            .strip_prefix("=?utf-8?B?")
            .and_then(|s| s.strip_suffix("?="))
            .unwrap();
        assert_eq!(decode_base64(inner).unwrap(), "Ayşe Kaya".as_bytes());
    }

    #[test]
    fn delimiter_characters_force_encoding() {
        assert!(encode_word("what?=").starts_with("=?utf-8?B?"));
    }
}
