//! Base64 transport encoding for file contents.
//!
//! The content API returns file bodies as base64 wrapped at 60 columns and
//! expects unwrapped base64 on upload. Text is always UTF-8.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Encode UTF-8 text for upload.
pub fn encode_base64_utf8(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decode a (possibly line-wrapped) base64 payload back to UTF-8 text.
pub fn decode_base64_utf8(encoded: &str) -> Result<String, String> {
    let compact: String = encoded
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .collect();

    let bytes = STANDARD.decode(compact).map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Wrap the way the content API does.
    fn wrap(encoded: &str, width: usize) -> String {
        encoded
            .as_bytes()
            .chunks(width)
            .map(|chunk| std::str::from_utf8(chunk).unwrap())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_ascii() {
        assert_eq!(encode_base64_utf8("hello"), "aGVsbG8=");
        assert_eq!(decode_base64_utf8("aGVsbG8=").unwrap(), "hello");
    }

    #[test]
    fn test_multibyte_survives_wrapped_payload() {
        let text = "{\n  \"días\": {\"2024-01-06\": \"Reyes 👑\"},\n  \"año\": 2024\n}";
        let wrapped = format!("{}\n", wrap(&encode_base64_utf8(text), 60));

        assert!(wrapped.contains('\n'));
        assert_eq!(decode_base64_utf8(&wrapped).unwrap(), text);
    }

    #[test]
    fn test_crlf_wrapping() {
        let encoded = encode_base64_utf8("mañana");
        let wrapped = wrap(&encoded, 4).replace('\n', "\r\n");
        assert_eq!(decode_base64_utf8(&wrapped).unwrap(), "mañana");
    }

    #[test]
    fn test_empty() {
        assert_eq!(encode_base64_utf8(""), "");
        assert_eq!(decode_base64_utf8("").unwrap(), "");
    }

    #[test]
    fn test_rejects_invalid_payloads() {
        assert!(decode_base64_utf8("not base64!").is_err());
        // 0xff 0xfe is not UTF-8
        assert!(decode_base64_utf8("//4=").is_err());
    }
}
