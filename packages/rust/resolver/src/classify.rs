//! Source classification.
//!
//! Every raw source string is assigned exactly one [`SourceKind`]:
//! - `http://` / `https://` prefix → [`SourceKind::Url`]
//! - survives a byte-exact Base64 round-trip → [`SourceKind::Base64Text`]
//! - everything else → [`SourceKind::PlainText`]
//!
//! Known ambiguity, kept on purpose: a short alphanumeric string like
//! `cat1` can survive the round-trip and is then classified `Base64Text`
//! even though a human would read it as plain text. The round-trip check
//! (decode, re-encode, compare bytes) rejects most prose, but it cannot
//! distinguish text that happens to be valid Base64.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use linkmill_shared::SourceKind;

/// The Base64 alphabet plus padding.
fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='
}

/// Classify a raw source string. Total and deterministic.
pub fn classify(s: &str) -> SourceKind {
    if s.starts_with("http://") || s.starts_with("https://") {
        return SourceKind::Url;
    }

    if base64_payload(s).is_some() {
        return SourceKind::Base64Text;
    }

    SourceKind::PlainText
}

/// Run the Base64 round-trip test against `s`.
///
/// Strips all whitespace, requires a non-empty string over the Base64
/// alphabet, pads to a multiple of 4, decodes, re-encodes, and accepts
/// only if the re-encoding equals the padded input byte-exactly. Returns
/// the decoded bytes on success.
pub fn base64_payload(s: &str) -> Option<Vec<u8>> {
    let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();

    // The empty string must stay PlainText.
    if cleaned.is_empty() || !cleaned.chars().all(is_base64_char) {
        return None;
    }

    let mut padded = cleaned;
    while padded.len() % 4 != 0 {
        padded.push('=');
    }

    let decoded = STANDARD.decode(&padded).ok()?;
    if STANDARD.encode(&decoded) == padded {
        Some(decoded)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_urls_by_prefix() {
        assert_eq!(classify("https://example.com/list.txt"), SourceKind::Url);
        assert_eq!(classify("http://example.com"), SourceKind::Url);
        // Scheme must be a prefix, not a substring
        assert_ne!(classify("see https://example.com"), SourceKind::Url);
    }

    #[test]
    fn classifies_valid_base64() {
        let encoded = STANDARD.encode("line1\nline2");
        assert_eq!(classify(&encoded), SourceKind::Base64Text);
    }

    #[test]
    fn classifies_base64_with_embedded_whitespace() {
        let encoded = STANDARD.encode("hello world");
        let wrapped = format!("{}\n{}", &encoded[..8], &encoded[8..]);
        assert_eq!(classify(&wrapped), SourceKind::Base64Text);
    }

    #[test]
    fn empty_string_is_plain_text() {
        assert_eq!(classify(""), SourceKind::PlainText);
        assert_eq!(classify("   \n\t"), SourceKind::PlainText);
    }

    #[test]
    fn prose_is_plain_text() {
        assert_eq!(classify("not base64 at all!"), SourceKind::PlainText);
        assert_eq!(classify("emoji 🎉 text"), SourceKind::PlainText);
    }

    #[test]
    fn padding_mismatch_is_plain_text() {
        // "A" pads to "A===", which no canonical encoding produces.
        assert_eq!(classify("A"), SourceKind::PlainText);
    }

    #[test]
    fn accepted_false_positive_stays_base64() {
        // Four alphanumeric chars round-trip cleanly; this stays Base64Text
        // by design even though it reads like plain text.
        assert_eq!(classify("cafe"), SourceKind::Base64Text);
    }

    #[test]
    fn classification_is_deterministic() {
        for input in ["https://x.example", "aGVsbG8=", "plain words", ""] {
            assert_eq!(classify(input), classify(input));
        }
    }

    #[test]
    fn round_trip_recovers_bytes() {
        let bytes = b"arbitrary \x00 bytes \xff".to_vec();
        let encoded = STANDARD.encode(&bytes);
        assert_eq!(classify(&encoded), SourceKind::Base64Text);
        assert_eq!(base64_payload(&encoded), Some(bytes));
    }

    #[test]
    fn unpadded_input_gets_padded() {
        // "aGVsbG8" is "hello" without its trailing '='.
        assert_eq!(classify("aGVsbG8"), SourceKind::Base64Text);
        assert_eq!(base64_payload("aGVsbG8"), Some(b"hello".to_vec()));
    }
}
