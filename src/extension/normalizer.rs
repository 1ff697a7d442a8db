//! Destination value normalization for `<mir-extension>` blocks.
//!
//! Merchants configure the AFT destination as a single free-form string. Depending on
//! the declared extension type that string may carry a country prefix (PAN, IBAN) or
//! a phone number glued onto a SWIFT/BIC code. This module separates the parts.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Wire tag for a destination-abroad card number
pub const TAG_PAN: &str = "3ds2.destAbroadPAN";
/// Wire tag for a destination-abroad bank account
pub const TAG_IBAN: &str = "3ds2.destAbroadIBAN";
/// Wire tag for a destination-abroad bank identifier (optionally with a phone)
pub const TAG_SWIFT: &str = "3ds2.destAbroadSWIFT";

/// Country prefixes stripped from PAN values (case-insensitive)
const PAN_COUNTRY_PREFIXES: [&str; 2] = ["BLR", "RUS"];

/// Country prefixes stripped from IBAN values (uppercase only)
const IBAN_COUNTRY_PREFIXES: [&str; 8] = ["BLR", "RUS", "KAZ", "UKR", "DEU", "USA", "GBR", "CHN"];

/// Calling codes recognised at the start of a SWIFT phone suffix
const PHONE_CALLING_CODES: [&str; 4] = ["375", "7", "+375", "+7"];

/// Declared type of a `<mir-extension>` destination value.
///
/// Unknown tags are kept verbatim and pass through normalization untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionType {
    Pan,
    Iban,
    Swift,
    Other(String),
}

impl ExtensionType {
    /// Parse a wire tag. Never fails; unknown tags become `Other`.
    pub fn parse(tag: &str) -> Self {
        match tag {
            TAG_PAN => ExtensionType::Pan,
            TAG_IBAN => ExtensionType::Iban,
            TAG_SWIFT => ExtensionType::Swift,
            other => ExtensionType::Other(other.to_string()),
        }
    }

    /// The tag as it appears in `<type>`
    pub fn as_tag(&self) -> &str {
        match self {
            ExtensionType::Pan => TAG_PAN,
            ExtensionType::Iban => TAG_IBAN,
            ExtensionType::Swift => TAG_SWIFT,
            ExtensionType::Other(tag) => tag,
        }
    }

    pub fn is_swift(&self) -> bool {
        matches!(self, ExtensionType::Swift)
    }
}

impl fmt::Display for ExtensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

/// Result of [`normalize`]: the cleaned value plus a phone split off a SWIFT value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedExtensionValue {
    pub value: String,
    /// Non-empty only for SWIFT values that carried a trailing phone
    pub phone: String,
}

impl NormalizedExtensionValue {
    fn value_only(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            phone: String::new(),
        }
    }
}

fn swift_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Z]{6}[A-Z0-9]{2})([A-Z0-9]{3})?").expect("SWIFT pattern is valid")
    })
}

/// Normalize a configured destination value for the given extension type.
///
/// `country` is the configured destination country; no rule currently consults it,
/// the resolved country is decided by the assembler.
///
/// # Example
/// ```
/// use cpa_mock::extension::{normalize, ExtensionType};
///
/// let normalized = normalize("blr4111", &ExtensionType::Pan, None);
/// assert_eq!(normalized.value, "4111");
/// assert!(normalized.phone.is_empty());
/// ```
pub fn normalize(
    value: &str,
    extension_type: &ExtensionType,
    country: Option<&str>,
) -> NormalizedExtensionValue {
    if value.is_empty() {
        return NormalizedExtensionValue::default();
    }

    let value = value.trim();
    tracing::trace!(
        extension_type = %extension_type,
        country = country.unwrap_or(""),
        "normalizing extension value"
    );

    match extension_type {
        ExtensionType::Pan => NormalizedExtensionValue::value_only(strip_pan_prefix(value)),
        ExtensionType::Iban => NormalizedExtensionValue::value_only(strip_iban_prefix(value)),
        ExtensionType::Swift => split_swift(value),
        ExtensionType::Other(_) => NormalizedExtensionValue::value_only(value),
    }
}

fn strip_pan_prefix(value: &str) -> &str {
    match value.get(..3) {
        Some(prefix)
            if PAN_COUNTRY_PREFIXES
                .iter()
                .any(|code| prefix.eq_ignore_ascii_case(code)) =>
        {
            &value[3..]
        }
        _ => value,
    }
}

fn strip_iban_prefix(value: &str) -> &str {
    match value.get(..3) {
        Some(prefix) if IBAN_COUNTRY_PREFIXES.contains(&prefix) => &value[3..],
        _ => value,
    }
}

/// Split a SWIFT/BIC code from whatever follows it.
///
/// The 3-character branch code is only taken when it is not the start of a digit
/// run continuing past it; `DEUTDEFF500375123456` splits as `DEUTDEFF` plus phone
/// `500375123456`, while `DEUTDEFF500` and `DEUTDEFFXXX375...` keep their branch.
fn split_swift(value: &str) -> NormalizedExtensionValue {
    let Some(caps) = swift_pattern().captures(value) else {
        return NormalizedExtensionValue::value_only(value);
    };

    let bank = caps.get(1).map_or("", |m| m.as_str());
    let code_len = match caps.get(2) {
        Some(branch) if !branch_continues_into_digits(branch.as_str(), &value[branch.end()..]) => {
            branch.end()
        }
        _ => bank.len(),
    };

    let code = &value[..code_len];
    let phone = value[code_len..].trim();

    if phone.is_empty() {
        return NormalizedExtensionValue::value_only(code);
    }

    if !has_known_calling_code(phone) {
        tracing::debug!(phone, "SWIFT phone suffix has no recognised calling code");
    }

    NormalizedExtensionValue {
        value: code.to_string(),
        phone: phone.to_string(),
    }
}

fn branch_continues_into_digits(branch: &str, rest: &str) -> bool {
    branch.bytes().all(|b| b.is_ascii_digit())
        && rest.bytes().next().is_some_and(|b| b.is_ascii_digit())
}

/// Whether a phone starts with one of the calling codes the gateway documents.
///
/// Informational only: phones without a known code are still returned.
pub fn has_known_calling_code(phone: &str) -> bool {
    PHONE_CALLING_CODES.iter().any(|code| phone.starts_with(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(value: &str, tag: &str) -> (String, String) {
        let result = normalize(value, &ExtensionType::parse(tag), None);
        (result.value, result.phone)
    }

    #[test]
    fn test_parse_known_and_unknown_tags() {
        assert_eq!(ExtensionType::parse(TAG_PAN), ExtensionType::Pan);
        assert_eq!(ExtensionType::parse(TAG_IBAN), ExtensionType::Iban);
        assert_eq!(ExtensionType::parse(TAG_SWIFT), ExtensionType::Swift);
        assert_eq!(
            ExtensionType::parse("3ds2.destAbroadWallet"),
            ExtensionType::Other("3ds2.destAbroadWallet".to_string())
        );
        assert_eq!(ExtensionType::parse("custom").as_tag(), "custom");
    }

    #[test]
    fn test_empty_value_short_circuits() {
        for tag in [TAG_PAN, TAG_IBAN, TAG_SWIFT, "other"] {
            assert_eq!(norm("", tag), (String::new(), String::new()));
        }
    }

    #[test]
    fn test_pan_strips_country_prefix_any_case() {
        assert_eq!(norm("blr4111", TAG_PAN), ("4111".to_string(), "".to_string()));
        assert_eq!(norm("BLR4111", TAG_PAN), ("4111".to_string(), "".to_string()));
        assert_eq!(norm("Rus411111******1111", TAG_PAN), ("411111******1111".to_string(), "".to_string()));
        assert_eq!(norm("  RUS4111  ", TAG_PAN), ("4111".to_string(), "".to_string()));
    }

    #[test]
    fn test_pan_keeps_other_prefixes() {
        assert_eq!(norm("KAZ4111", TAG_PAN), ("KAZ4111".to_string(), "".to_string()));
        assert_eq!(norm("411111******1111", TAG_PAN), ("411111******1111".to_string(), "".to_string()));
        assert_eq!(norm("BL", TAG_PAN), ("BL".to_string(), "".to_string()));
    }

    #[test]
    fn test_pan_strips_prefix_only_once() {
        assert_eq!(norm("BLRBLR4111", TAG_PAN), ("BLR4111".to_string(), "".to_string()));
    }

    #[test]
    fn test_iban_strips_whitelisted_uppercase_prefix() {
        assert_eq!(norm("DEU12345", TAG_IBAN), ("12345".to_string(), "".to_string()));
        assert_eq!(norm("GBR29NWBK60161331926819", TAG_IBAN), ("29NWBK60161331926819".to_string(), "".to_string()));
    }

    #[test]
    fn test_iban_keeps_lowercase_or_unknown_prefix() {
        assert_eq!(norm("xyz12345", TAG_IBAN), ("xyz12345".to_string(), "".to_string()));
        assert_eq!(norm("deu12345", TAG_IBAN), ("deu12345".to_string(), "".to_string()));
        assert_eq!(norm("FRA12345", TAG_IBAN), ("FRA12345".to_string(), "".to_string()));
        assert_eq!(norm("DE89370400440532013000", TAG_IBAN), ("DE89370400440532013000".to_string(), "".to_string()));
    }

    #[test]
    fn test_swift_splits_trailing_phone() {
        assert_eq!(
            norm("DEUTDEFF500375123456", TAG_SWIFT),
            ("DEUTDEFF".to_string(), "500375123456".to_string())
        );
        assert_eq!(
            norm("ALFABY2X +375 29 123-45-67", TAG_SWIFT),
            ("ALFABY2X".to_string(), "+375 29 123-45-67".to_string())
        );
    }

    #[test]
    fn test_swift_keeps_branch_code() {
        assert_eq!(norm("DEUTDEFF500", TAG_SWIFT), ("DEUTDEFF500".to_string(), "".to_string()));
        assert_eq!(
            norm("DEUTDEFFXXX375291234567", TAG_SWIFT),
            ("DEUTDEFFXXX".to_string(), "375291234567".to_string())
        );
        assert_eq!(
            norm("DEUTDEFF500 375291234567", TAG_SWIFT),
            ("DEUTDEFF500".to_string(), "375291234567".to_string())
        );
    }

    #[test]
    fn test_swift_without_remainder_has_no_phone() {
        assert_eq!(norm("ALFABY2X", TAG_SWIFT), ("ALFABY2X".to_string(), "".to_string()));
        assert_eq!(norm("  ALFABY2X  ", TAG_SWIFT), ("ALFABY2X".to_string(), "".to_string()));
    }

    #[test]
    fn test_swift_phone_without_calling_code_is_kept() {
        assert_eq!(norm("ALFABY2X 12345", TAG_SWIFT), ("ALFABY2X".to_string(), "12345".to_string()));
    }

    #[test]
    fn test_swift_mismatch_passes_through() {
        assert_eq!(norm("alfaby2x", TAG_SWIFT), ("alfaby2x".to_string(), "".to_string()));
        assert_eq!(norm("12345678", TAG_SWIFT), ("12345678".to_string(), "".to_string()));
        assert_eq!(norm("ALFA", TAG_SWIFT), ("ALFA".to_string(), "".to_string()));
    }

    #[test]
    fn test_unknown_type_passes_through() {
        assert_eq!(norm("BLR4111", "custom"), ("BLR4111".to_string(), "".to_string()));
        assert_eq!(norm("ALFABY2X 375", TAG_PAN), ("ALFABY2X 375".to_string(), "".to_string()));
    }

    #[test]
    fn test_known_calling_codes() {
        assert!(has_known_calling_code("375291234567"));
        assert!(has_known_calling_code("+79161234567"));
        assert!(has_known_calling_code("79161234567"));
        assert!(!has_known_calling_code("500375123456"));
    }
}
