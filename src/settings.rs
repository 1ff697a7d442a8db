//! Merchant configuration snapshot.
//!
//! Settings are stored as a camelCase JSON document edited from the tester UI. Reads
//! are lenient field by field: a missing or oddly typed field falls back to its
//! default instead of invalidating the whole document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::extension::blocks::scalar_text;
use crate::extension::normalizer::TAG_PAN;
use crate::extension::{AftParams, CpaExtensions};

pub const DEFAULT_AMOUNT: &str = "100";
pub const DEFAULT_SHORT_DESC: &str = "Короткое описание";
pub const DEFAULT_LONG_DESC: &str = "Описание по умолчанию";
pub const DEFAULT_PAYMENT_PAGE: &str = "pages";
pub const DEFAULT_BACK_URL_SUCCESS: &str = "https://tda-photo.ru/success";
pub const DEFAULT_BACK_URL_FAIL: &str = "https://tda-photo.ru/fail";
pub const DEFAULT_AFT_VALUE: &str = "411111******1111";
pub const DEFAULT_AFT_COUNTRY: &str = "BLR";

/// Merchant settings consumed by the check and order endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantConfig {
    pub amount: String,
    pub short_desc: String,
    pub long_desc: String,
    pub back_url_success: String,
    pub back_url_fail: String,
    pub extra_param: String,
    pub payment_page: String,
    pub cpa_extensions: CpaExtensions,
    pub recurrent_enabled: bool,
    pub selected_card_id: String,
    pub card_registration_enabled: bool,
    pub aft_enabled: bool,
    pub aft_mir_extension_type: String,
    pub aft_mir_extension_value: String,
    pub aft_mir_extension_country: String,
    pub aft_mir_extension_phone: String,
}

impl Default for MerchantConfig {
    /// Settings used when no settings document can be read
    fn default() -> Self {
        Self {
            amount: DEFAULT_AMOUNT.to_string(),
            short_desc: DEFAULT_SHORT_DESC.to_string(),
            long_desc: DEFAULT_LONG_DESC.to_string(),
            back_url_success: DEFAULT_BACK_URL_SUCCESS.to_string(),
            back_url_fail: DEFAULT_BACK_URL_FAIL.to_string(),
            extra_param: String::new(),
            payment_page: DEFAULT_PAYMENT_PAGE.to_string(),
            cpa_extensions: CpaExtensions::new(),
            recurrent_enabled: false,
            selected_card_id: String::new(),
            card_registration_enabled: false,
            aft_enabled: false,
            aft_mir_extension_type: TAG_PAN.to_string(),
            aft_mir_extension_value: DEFAULT_AFT_VALUE.to_string(),
            aft_mir_extension_country: DEFAULT_AFT_COUNTRY.to_string(),
            aft_mir_extension_phone: String::new(),
        }
    }
}

impl MerchantConfig {
    /// Read a stored settings document.
    ///
    /// Amount, descriptions and payment page fall back to their defaults; absent AFT
    /// fields, URLs and card ids are empty; absent toggles are off. A non-object
    /// document yields [`MerchantConfig::default`].
    pub fn from_json(value: &JsonValue) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let text = |key: &str| object.get(key).filter(|v| !v.is_null()).map(scalar_text);
        let text_or = |key: &str, default: &str| text(key).unwrap_or_else(|| default.to_string());
        let flag = |key: &str| object.get(key).is_some_and(truthy);

        Self {
            amount: text_or("amount", DEFAULT_AMOUNT),
            short_desc: text_or("shortDesc", DEFAULT_SHORT_DESC),
            long_desc: text_or("longDesc", DEFAULT_LONG_DESC),
            back_url_success: text_or("backUrlSuccess", ""),
            back_url_fail: text_or("backUrlFail", ""),
            extra_param: text_or("extraParam", ""),
            payment_page: text_or("paymentPage", DEFAULT_PAYMENT_PAGE),
            cpa_extensions: object
                .get("cpaExtensions")
                .map(CpaExtensions::from_json)
                .unwrap_or_default(),
            recurrent_enabled: flag("recurrentEnabled"),
            selected_card_id: text_or("selectedCardId", ""),
            card_registration_enabled: flag("cardRegistrationEnabled"),
            aft_enabled: flag("aftEnabled"),
            aft_mir_extension_type: text_or("aftMirExtensionType", ""),
            aft_mir_extension_value: text_or("aftMirExtensionValue", ""),
            aft_mir_extension_country: text_or("aftMirExtensionCountry", ""),
            aft_mir_extension_phone: text_or("aftMirExtensionPhone", ""),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_else(|_| JsonValue::Object(Map::new()))
    }

    /// AFT inputs for the assembler. AFT runs when the request asks for it or the
    /// merchant enabled it.
    pub fn aft_params(&self, request_forces_aft: bool) -> AftParams {
        AftParams {
            enabled: request_forces_aft || self.aft_enabled,
            extension_type: self.aft_mir_extension_type.clone(),
            value: self.aft_mir_extension_value.clone(),
            country: self.aft_mir_extension_country.clone(),
            phone: self.aft_mir_extension_phone.clone(),
        }
    }
}

/// Loose truthiness used for settings toggles
fn truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(a) => !a.is_empty(),
        JsonValue::Object(o) => !o.is_empty(),
    }
}

/// Fields that keep their stored value when the update omits them
const RETAINED_FIELDS: [&str; 9] = [
    "amount",
    "shortDesc",
    "longDesc",
    "backUrlSuccess",
    "backUrlFail",
    "extraParam",
    "paymentPage",
    "aftMirExtensionCountry",
    "aftMirExtensionPhone",
];

/// Settings payload posted by the tester UI.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct SettingsUpdate(pub Map<String, JsonValue>);

impl SettingsUpdate {
    /// Merge the update onto a stored settings document.
    ///
    /// Text fields are kept when omitted. Toggles, the selected card and the AFT
    /// type/value are reset to their defaults when omitted. `cpaExtensions` is
    /// replaced, and anything but an object becomes `{}`.
    pub fn apply_to(&self, stored: &mut Map<String, JsonValue>) {
        let payload = &self.0;

        for key in RETAINED_FIELDS {
            if let Some(value) = payload.get(key) {
                stored.insert(key.to_string(), value.clone());
            }
        }

        let reset_defaults = [
            ("recurrentEnabled", JsonValue::Bool(false)),
            ("selectedCardId", JsonValue::String(String::new())),
            ("cardRegistrationEnabled", JsonValue::Bool(false)),
            ("aftEnabled", JsonValue::Bool(false)),
            ("aftMirExtensionType", JsonValue::String(TAG_PAN.to_string())),
            ("aftMirExtensionValue", JsonValue::String(String::new())),
        ];
        for (key, default) in reset_defaults {
            let value = payload.get(key).cloned().unwrap_or(default);
            stored.insert(key.to_string(), value);
        }

        let extensions = match payload.get("cpaExtensions") {
            Some(JsonValue::Object(object)) => JsonValue::Object(object.clone()),
            _ => JsonValue::Object(Map::new()),
        };
        stored.insert("cpaExtensions".to_string(), extensions);
    }
}
