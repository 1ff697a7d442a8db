//! Assembles the CPA extension fragments of an availability response.
//!
//! Output order is fixed: `<submerchant-data>`, `<order-params>`, then either the AFT
//! pair (`<mir-extension>` + `<transaction-type>AFT</transaction-type>`) or the
//! configured transaction type. At most one transaction-type fragment is produced.

use super::blocks::CpaExtensions;
use super::normalizer::{normalize, ExtensionType};
use crate::xml::{element, wrap};

/// Country used in `<mir-extension>` when none is configured
pub const DEFAULT_AFT_COUNTRY: &str = "BLR";

/// Transaction type used when the extensions carry no override
pub const DEFAULT_TRANSACTION_TYPE: &str = "Payment";

/// Transaction types the gateway accepts in `<transaction-type>`
pub const ALLOWED_TRANSACTION_TYPES: [&str; 5] = ["CardRegister", "Payment", "AFT", "OCT", "P2P"];

/// Kind of a rendered fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    SubmerchantData,
    OrderParams,
    MirExtension,
    TransactionType,
}

/// One top-level element of the extension section, rendered on a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlFragment {
    pub kind: FragmentKind,
    pub xml: String,
}

impl XmlFragment {
    fn new(kind: FragmentKind, xml: String) -> Self {
        Self { kind, xml }
    }

    pub fn transaction_type(value: &str) -> Self {
        Self::new(FragmentKind::TransactionType, element("transaction-type", value))
    }
}

/// AFT inputs taken from the merchant configuration. Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AftParams {
    pub enabled: bool,
    pub extension_type: String,
    pub value: String,
    pub country: String,
    pub phone: String,
}

impl AftParams {
    /// Whether the AFT branch runs: enabled with a declared extension type
    pub fn is_active(&self) -> bool {
        self.enabled && !self.extension_type.is_empty()
    }
}

/// Build the extension fragments for an availability response.
pub fn assemble(extensions: &CpaExtensions, aft: &AftParams) -> Vec<XmlFragment> {
    let mut fragments = Vec::new();

    if let Some(data) = extensions.submerchant_data() {
        let children: String = data
            .fields()
            .into_iter()
            .map(|(name, value)| element(name, value))
            .collect();
        fragments.push(XmlFragment::new(
            FragmentKind::SubmerchantData,
            wrap("submerchant-data", &children),
        ));
    }

    if let Some(params) = extensions.order_params() {
        let children: String = params
            .iter()
            .map(|param| {
                wrap(
                    "param",
                    &format!("{}{}", element("name", &param.name), element("value", &param.value)),
                )
            })
            .collect();
        fragments.push(XmlFragment::new(
            FragmentKind::OrderParams,
            wrap("order-params", &children),
        ));
    }

    if aft.is_active() {
        fragments.push(mir_extension(aft));
        fragments.push(XmlFragment::transaction_type("AFT"));
    } else {
        // AFT requested without a type: the merchant override does not apply either
        let configured = if aft.enabled {
            None
        } else {
            extensions.transaction_type()
        };
        let transaction_type = configured.unwrap_or(DEFAULT_TRANSACTION_TYPE);
        if ALLOWED_TRANSACTION_TYPES.contains(&transaction_type) {
            fragments.push(XmlFragment::transaction_type(transaction_type));
        } else {
            tracing::debug!(transaction_type, "ignoring unsupported transaction type");
        }
    }

    fragments
}

fn mir_extension(aft: &AftParams) -> XmlFragment {
    let extension_type = ExtensionType::parse(&aft.extension_type);
    let normalized = normalize(&aft.value, &extension_type, non_empty(&aft.country));

    tracing::debug!(
        extension_type = %extension_type,
        raw_value = %aft.value,
        normalized_value = %normalized.value,
        extracted_phone = %normalized.phone,
        "building mir-extension"
    );

    let mut children = element("type", extension_type.as_tag());

    if let Some(value) = resolve_value(&normalized.value, &aft.value) {
        children.push_str(&element("value", value));
    }

    children.push_str(&element("country", resolve_country(&aft.country)));

    if extension_type.is_swift() {
        let digits = resolve_phone(&aft.phone, &normalized.phone)
            .map(digits_only)
            .unwrap_or_default();
        if !digits.is_empty() {
            children.push_str(&element("phone", &digits));
        }
    }

    XmlFragment::new(FragmentKind::MirExtension, wrap("mir-extension", &children))
}

fn non_empty(value: &str) -> Option<&str> {
    Some(value).filter(|v| !v.is_empty())
}

/// First candidate that is present and non-empty
pub fn first_non_empty<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .flatten()
        .find(|candidate| !candidate.is_empty())
}

/// Normalized value, else the raw configured value
pub fn resolve_value<'a>(normalized: &'a str, raw: &'a str) -> Option<&'a str> {
    first_non_empty(&[Some(normalized), Some(raw)])
}

/// Explicitly configured phone, else the phone split off the SWIFT value
pub fn resolve_phone<'a>(configured: &'a str, extracted: &'a str) -> Option<&'a str> {
    first_non_empty(&[Some(configured), Some(extracted)])
}

/// Configured country, else [`DEFAULT_AFT_COUNTRY`]
pub fn resolve_country(configured: &str) -> &str {
    first_non_empty(&[Some(configured)]).unwrap_or(DEFAULT_AFT_COUNTRY)
}

/// Keep only ASCII digits
pub fn digits_only(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::blocks::ExtensionBlock;
    use crate::extension::normalizer::{TAG_IBAN, TAG_PAN, TAG_SWIFT};
    use serde_json::json;

    fn aft(extension_type: &str, value: &str, country: &str, phone: &str) -> AftParams {
        AftParams {
            enabled: true,
            extension_type: extension_type.to_string(),
            value: value.to_string(),
            country: country.to_string(),
            phone: phone.to_string(),
        }
    }

    fn xml(fragments: &[XmlFragment]) -> Vec<&str> {
        fragments.iter().map(|f| f.xml.as_str()).collect()
    }

    fn transaction_type_count(fragments: &[XmlFragment]) -> usize {
        fragments
            .iter()
            .filter(|f| f.kind == FragmentKind::TransactionType)
            .count()
    }

    #[test]
    fn test_default_transaction_type_is_payment() {
        let fragments = assemble(&CpaExtensions::new(), &AftParams::default());
        assert_eq!(xml(&fragments), vec!["<transaction-type>Payment</transaction-type>"]);
    }

    #[test]
    fn test_configured_transaction_type() {
        for allowed in ALLOWED_TRANSACTION_TYPES {
            let extensions =
                CpaExtensions::new().with(ExtensionBlock::TransactionType(allowed.to_string()));
            let fragments = assemble(&extensions, &AftParams::default());
            assert_eq!(
                fragments,
                vec![XmlFragment::transaction_type(allowed)],
                "transaction type {allowed}"
            );
        }
    }

    #[test]
    fn test_unsupported_transaction_type_emits_nothing() {
        let extensions = CpaExtensions::new().with(ExtensionBlock::TransactionType("Refund".into()));
        assert!(assemble(&extensions, &AftParams::default()).is_empty());
    }

    #[test]
    fn test_submerchant_fields_in_fixed_order() {
        let extensions = CpaExtensions::from_json(&json!({
            "submerchant-data": {
                "inn": "190000000",
                "name": "Shop",
                "city": "Minsk",
                "terminal-id": "T1"
            }
        }));

        let fragments = assemble(&extensions, &AftParams::default());
        assert_eq!(fragments[0].kind, FragmentKind::SubmerchantData);
        assert_eq!(
            fragments[0].xml,
            "<submerchant-data><city>Minsk</city><name>Shop</name><terminal-id>T1</terminal-id><inn>190000000</inn></submerchant-data>"
        );
    }

    #[test]
    fn test_order_params_skip_incomplete_entries() {
        let extensions = CpaExtensions::from_json(&json!({
            "order-params": [
                {"name": "route", "value": "A1"},
                {"value": "orphan"},
                {"name": "seat", "value": "12C"}
            ]
        }));

        let fragments = assemble(&extensions, &AftParams::default());
        assert_eq!(
            fragments[0].xml,
            "<order-params><param><name>route</name><value>A1</value></param><param><name>seat</name><value>12C</value></param></order-params>"
        );
    }

    #[test]
    fn test_output_order_with_all_blocks() {
        let extensions = CpaExtensions::from_json(&json!({
            "transaction-type": "P2P",
            "order-params": [{"name": "a", "value": "1"}],
            "submerchant-data": {"id": "42"}
        }));

        let kinds: Vec<FragmentKind> = assemble(&extensions, &AftParams::default())
            .into_iter()
            .map(|f| f.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                FragmentKind::SubmerchantData,
                FragmentKind::OrderParams,
                FragmentKind::TransactionType
            ]
        );
    }

    #[test]
    fn test_aft_pan_uses_default_country() {
        let fragments = assemble(&CpaExtensions::new(), &aft(TAG_PAN, "BLR4111", "", ""));
        assert_eq!(
            xml(&fragments),
            vec![
                "<mir-extension><type>3ds2.destAbroadPAN</type><value>4111</value><country>BLR</country></mir-extension>",
                "<transaction-type>AFT</transaction-type>",
            ]
        );
    }

    #[test]
    fn test_aft_overrides_configured_transaction_type() {
        let extensions = CpaExtensions::new().with(ExtensionBlock::TransactionType("OCT".into()));
        let fragments = assemble(&extensions, &aft(TAG_IBAN, "DEU12345", "DEU", ""));

        assert_eq!(transaction_type_count(&fragments), 1);
        assert_eq!(fragments.last().unwrap().xml, "<transaction-type>AFT</transaction-type>");
        assert_eq!(
            fragments[0].xml,
            "<mir-extension><type>3ds2.destAbroadIBAN</type><value>12345</value><country>DEU</country></mir-extension>"
        );
    }

    #[test]
    fn test_aft_swift_phone_is_digits_only() {
        let fragments = assemble(
            &CpaExtensions::new(),
            &aft(TAG_SWIFT, "ALFABY2X", "", "+375 (29) 123-45-67"),
        );
        assert_eq!(
            fragments[0].xml,
            "<mir-extension><type>3ds2.destAbroadSWIFT</type><value>ALFABY2X</value><country>BLR</country><phone>375291234567</phone></mir-extension>"
        );
    }

    #[test]
    fn test_aft_swift_uses_extracted_phone() {
        let fragments = assemble(
            &CpaExtensions::new(),
            &aft(TAG_SWIFT, "DEUTDEFF500375123456", "DEU", ""),
        );
        assert_eq!(
            fragments[0].xml,
            "<mir-extension><type>3ds2.destAbroadSWIFT</type><value>DEUTDEFF</value><country>DEU</country><phone>500375123456</phone></mir-extension>"
        );
    }

    #[test]
    fn test_aft_swift_configured_phone_wins() {
        let fragments = assemble(
            &CpaExtensions::new(),
            &aft(TAG_SWIFT, "ALFABY2X 111", "", "+7 916 000"),
        );
        assert!(fragments[0].xml.contains("<phone>7916000</phone>"));
    }

    #[test]
    fn test_aft_swift_phone_without_digits_is_omitted() {
        let fragments = assemble(&CpaExtensions::new(), &aft(TAG_SWIFT, "ALFABY2X", "", "+-()"));
        assert!(!fragments[0].xml.contains("<phone>"));
    }

    #[test]
    fn test_aft_phone_ignored_for_non_swift() {
        let fragments = assemble(&CpaExtensions::new(), &aft(TAG_PAN, "4111", "RUS", "+375291234567"));
        assert!(!fragments[0].xml.contains("<phone>"));
        assert!(fragments[0].xml.contains("<country>RUS</country>"));
    }

    #[test]
    fn test_aft_empty_value_omits_value_tag() {
        let fragments = assemble(&CpaExtensions::new(), &aft(TAG_PAN, "", "", ""));
        assert_eq!(
            fragments[0].xml,
            "<mir-extension><type>3ds2.destAbroadPAN</type><country>BLR</country></mir-extension>"
        );
    }

    #[test]
    fn test_aft_value_that_normalizes_to_empty_keeps_raw() {
        let fragments = assemble(&CpaExtensions::new(), &aft(TAG_PAN, "BLR", "", ""));
        assert!(fragments[0].xml.contains("<value>BLR</value>"));
    }

    #[test]
    fn test_aft_unknown_type_passes_value_through() {
        let fragments = assemble(&CpaExtensions::new(), &aft("3ds2.destAbroadWallet", "W-1", "", ""));
        assert_eq!(
            fragments[0].xml,
            "<mir-extension><type>3ds2.destAbroadWallet</type><value>W-1</value><country>BLR</country></mir-extension>"
        );
    }

    #[test]
    fn test_aft_without_type_answers_payment() {
        let params = AftParams {
            enabled: true,
            ..AftParams::default()
        };
        let fragments = assemble(&CpaExtensions::new(), &params);
        assert_eq!(xml(&fragments), vec!["<transaction-type>Payment</transaction-type>"]);

        for configured in ["OCT", "AFT", "P2P"] {
            let extensions =
                CpaExtensions::new().with(ExtensionBlock::TransactionType(configured.into()));
            let fragments = assemble(&extensions, &params);
            assert_eq!(
                xml(&fragments),
                vec!["<transaction-type>Payment</transaction-type>"],
                "configured {configured}"
            );
        }
    }

    #[test]
    fn test_aft_country_emitted_for_every_type() {
        for tag in [TAG_PAN, TAG_IBAN, TAG_SWIFT, "other"] {
            let fragments = assemble(&CpaExtensions::new(), &aft(tag, "X", "", ""));
            assert!(fragments[0].xml.contains("<country>BLR</country>"), "type {tag}");
            assert_eq!(transaction_type_count(&fragments), 1);
        }
    }

    #[test]
    fn test_values_are_escaped() {
        let extensions = CpaExtensions::from_json(&json!({
            "submerchant-data": {"name": "Tom & Jerry <LLC>"}
        }));
        let fragments = assemble(&extensions, &AftParams::default());
        assert!(fragments[0].xml.contains("<name>Tom &amp; Jerry &lt;LLC&gt;</name>"));
    }

    #[test]
    fn test_assemble_is_pure() {
        let extensions = CpaExtensions::from_json(&json!({
            "submerchant-data": {"city": "Minsk"},
            "order-params": [{"name": "a", "value": "1"}]
        }));
        let params = aft(TAG_SWIFT, "ALFABY2X 375291234567", "", "");

        assert_eq!(assemble(&extensions, &params), assemble(&extensions, &params));
    }

    #[test]
    fn test_resolution_helpers() {
        assert_eq!(first_non_empty(&[None, Some(""), Some("b")]), Some("b"));
        assert_eq!(first_non_empty(&[None, Some("")]), None);
        assert_eq!(resolve_value("", "raw"), Some("raw"));
        assert_eq!(resolve_phone("", ""), None);
        assert_eq!(resolve_country(""), "BLR");
        assert_eq!(resolve_country("KAZ"), "KAZ");
        assert_eq!(digits_only("+375 (29) 123-45-67"), "375291234567");
    }
}
