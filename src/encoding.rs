//! Repair of double-encoded Nordic characters.
//!
//! Archived newsletters regularly arrive with UTF-8 bytes that were read as
//! Latin-1 and encoded to UTF-8 a second time, so `ø` shows up as `Ã¸`.
//! This module undoes that one failure mode and folds the HTML entity
//! spellings of the same six letters into literal characters.
//!
//! It is not an encoding detector: the trigger is the fixed set of
//! signature sequences below and nothing else.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};

/// Double-encoded sequences and the letters they stand for.
const SIGNATURES: [(&str, char); 6] = [
    ("Ã¸", 'ø'),
    ("Ã¦", 'æ'),
    ("Ã…", 'Å'),
    ("Ã˜", 'Ø'),
    ("Ã†", 'Æ'),
    ("Ã¥", 'å'),
];

/// Named and decimal entity spellings of the Nordic letters.
const ENTITIES: [(&str, char); 12] = [
    ("&oslash;", 'ø'),
    ("&aelig;", 'æ'),
    ("&aring;", 'å'),
    ("&Oslash;", 'Ø'),
    ("&AElig;", 'Æ'),
    ("&Aring;", 'Å'),
    ("&#248;", 'ø'),
    ("&#230;", 'æ'),
    ("&#229;", 'å'),
    ("&#216;", 'Ø'),
    ("&#198;", 'Æ'),
    ("&#197;", 'Å'),
];

const NORDIC: [char; 6] = ['ø', 'æ', 'å', 'Ø', 'Æ', 'Å'];

#[allow(clippy::expect_used)]
static HEX_ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)&#x0*(f8|e6|e5|d8|c6|c5);").expect("HEX_ENTITY_RE: hardcoded regex is valid")
});

/// Repair double-encoded Nordic characters and normalize their entities.
///
/// `None` and `""` both produce `""`. The function never fails: if the
/// whole-string fallback cannot decode, the result of the direct
/// replacements is kept.
///
/// # Examples
///
/// ```
/// use mailframe::repair_encoding;
///
/// assert_eq!(repair_encoding(Some("10 kr Ã¸re")), "10 kr øre");
/// assert_eq!(repair_encoding(Some("Bl&aring;b&aelig;r")), "Blåbær");
/// assert_eq!(repair_encoding(None), "");
/// ```
pub fn repair_encoding(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };
    if text.is_empty() {
        return String::new();
    }

    let detected = has_signature(text);
    let mut repaired: Cow<'_, str> = Cow::Borrowed(text);

    if detected {
        let mut fixed = text.to_string();
        for (sequence, letter) in SIGNATURES {
            if fixed.contains(sequence) {
                fixed = fixed.replace(sequence, letter.encode_utf8(&mut [0; 4]));
            }
        }

        if !contains_nordic(&fixed) {
            match reverse_latin1_mojibake(&fixed) {
                Ok(decoded) => fixed = decoded,
                Err(err) => debug!(%err, "keeping direct replacements"),
            }
        }
        repaired = Cow::Owned(fixed);
    }

    normalize_entities(&repaired)
}

/// Check whether `text` contains any of the double-encoding signatures.
pub fn has_signature(text: &str) -> bool {
    text.contains('Ã') && SIGNATURES.iter().any(|(seq, _)| text.contains(seq))
}

/// Check whether `text` contains a literal Nordic letter.
pub fn contains_nordic(text: &str) -> bool {
    text.contains(NORDIC)
}

/// Undo a UTF-8 → Latin-1 → UTF-8 round trip on the whole string.
///
/// Every character is mapped back to its single Windows-1252 byte (the
/// superset of ISO-8859-1 that browsers use for "Latin-1") and the bytes
/// are decoded as UTF-8. Characters outside that range, or bytes that do
/// not form valid UTF-8, are an error.
pub fn reverse_latin1_mojibake(text: &str) -> Result<String> {
    let (bytes, _, unmappable) = encoding_rs::WINDOWS_1252.encode(text);
    if unmappable {
        return Err(Error::Mojibake(
            "text contains characters outside Windows-1252".to_string(),
        ));
    }

    encoding_rs::UTF_8
        .decode_without_bom_handling_and_without_replacement(&bytes)
        .map(Cow::into_owned)
        .ok_or_else(|| Error::Mojibake("re-encoded bytes are not valid UTF-8".to_string()))
}

/// Decode raw newsletter bytes.
///
/// UTF-8 is tried first (a BOM is honored), then the `hint` label if one
/// is given, and finally Windows-1252.
pub fn decode_bytes<'a>(bytes: &'a [u8], hint: Option<&str>) -> Cow<'a, str> {
    let (text, _, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return text;
    }

    if let Some(label) = hint
        && let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes())
    {
        let (text, _, _) = encoding.decode(bytes);
        return text;
    }

    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    text
}

/// Replace entity spellings of the six Nordic letters with the letters.
fn normalize_entities(text: &str) -> String {
    if !text.contains("&") {
        return text.to_string();
    }

    let mut out = text.to_string();
    for (entity, letter) in ENTITIES {
        if out.contains(entity) {
            out = out.replace(entity, letter.encode_utf8(&mut [0; 4]));
        }
    }

    HEX_ENTITY_RE
        .replace_all(&out, |caps: &regex::Captures<'_>| {
            match caps[1].to_ascii_lowercase().as_str() {
                "f8" => "ø",
                "e6" => "æ",
                "e5" => "å",
                "d8" => "Ø",
                "c6" => "Æ",
                _ => "Å",
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_bytes() {
        assert_eq!(decode_bytes("blåbær".as_bytes(), None), "blåbær");
        // Latin-1 bytes for "blåbær"
        assert_eq!(decode_bytes(b"bl\xe5b\xe6r", None), "blåbær");
        assert_eq!(decode_bytes(b"\xa4", Some("iso-8859-15")), "€");
    }

    #[test]
    fn test_none_and_empty() {
        assert_eq!(repair_encoding(None), "");
        assert_eq!(repair_encoding(Some("")), "");
    }

    #[test]
    fn test_all_signatures_repaired() {
        let input = "Ã¸ Ã¦ Ã… Ã˜ Ã† Ã¥";
        let out = repair_encoding(Some(input));
        assert_eq!(out, "ø æ Å Ø Æ å");
        assert!(!has_signature(&out));
    }

    #[test]
    fn test_signature_inside_markup() {
        let out = repair_encoding(Some("<p>Pris: 10 kr Ã¸re</p>"));
        assert_eq!(out, "<p>Pris: 10 kr øre</p>");
    }

    #[test]
    fn test_named_entities() {
        let out = repair_encoding(Some("&Oslash;st &AElig;r&oslash; &Aring;s &aring;"));
        assert_eq!(out, "Øst Ærø Ås å");
    }

    #[test]
    fn test_numeric_entities() {
        assert_eq!(repair_encoding(Some("&#248;&#230;&#229;")), "øæå");
        assert_eq!(repair_encoding(Some("&#216;&#198;&#197;")), "ØÆÅ");
    }

    #[test]
    fn test_hex_entities() {
        assert_eq!(repair_encoding(Some("&#xF8;&#xe6;&#X00E5;")), "øæå");
    }

    #[test]
    fn test_other_entities_untouched() {
        let input = "Fish &amp; chips &eacute; &#233; &amp;oslash;";
        assert_eq!(repair_encoding(Some(input)), input);
    }

    #[test]
    fn test_clean_text_is_unchanged() {
        let input = "<p>Hello, wörld — 😀 日本語</p>";
        assert_eq!(repair_encoding(Some(input)), input);
    }

    #[test]
    fn test_repair_twice_is_stable() {
        let once = repair_encoding(Some("Bl&aring;b&aelig;r og Ã¸l"));
        assert_eq!(repair_encoding(Some(&once)), once);
    }

    #[test]
    fn test_reverse_mojibake() {
        // "Café" double-encoded
        assert_eq!(reverse_latin1_mojibake("CafÃ©").unwrap(), "Café");
        assert_eq!(reverse_latin1_mojibake("Ã˜resund").unwrap(), "Øresund");
    }

    #[test]
    fn test_reverse_mojibake_rejects_wide_chars() {
        assert!(matches!(
            reverse_latin1_mojibake("日本"),
            Err(Error::Mojibake(_))
        ));
    }

    #[test]
    fn test_reverse_mojibake_rejects_invalid_utf8() {
        // A lone lead byte is not valid UTF-8 once mapped back
        assert!(reverse_latin1_mojibake("Ã").is_err());
    }

    #[test]
    fn test_has_signature() {
        assert!(has_signature("blÃ¥"));
        assert!(!has_signature("Ã alone"));
        assert!(!has_signature("blå"));
    }
}
