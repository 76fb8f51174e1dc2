//! Multipart boundary token generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;

/// Generates a random, collision-resistant multipart boundary token.
///
/// 24 random bytes give 192 bits of entropy; URL-safe base64 keeps the token
/// free of characters that need quoting in a Content-Type parameter.
#[must_use]
pub fn boundary() -> String {
    let random_bytes: Vec<u8> = (0..24).map(|_| rand::thread_rng().r#gen::<u8>()).collect();
    format!("=_gp_{}", URL_SAFE_NO_PAD.encode(random_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_unique() {
        let a = boundary();
        let b = boundary();
        assert_ne!(a, b);
    }

    #[test]
    fn boundary_is_header_safe() {
        let token = boundary();
        assert!(token.starts_with("=_gp_"));
        assert!(token.len() > 30);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "=_-".contains(c))
        );
    }
}
