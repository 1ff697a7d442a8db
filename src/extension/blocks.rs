//! Typed view over the merchant's free-form CPA extension settings.
//!
//! Settings store extensions as a JSON object whose values have a different shape per
//! key. Known keys are lifted into [`ExtensionBlock`] variants; anything else is kept
//! as [`ExtensionBlock::Unrecognized`] so it survives a settings round trip but is
//! never rendered.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

pub const KEY_SUBMERCHANT_DATA: &str = "submerchant-data";
pub const KEY_ORDER_PARAMS: &str = "order-params";
pub const KEY_TRANSACTION_TYPE: &str = "transaction-type";

/// Sub-merchant fields in their rendering order
pub const SUBMERCHANT_FIELDS: [&str; 7] = ["city", "country", "id", "name", "terminal-id", "mcc", "inn"];

/// `submerchant-data` block. Each field is optional and rendered only when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmerchantData {
    pub city: Option<String>,
    pub country: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub terminal_id: Option<String>,
    pub mcc: Option<String>,
    pub inn: Option<String>,
}

impl SubmerchantData {
    /// Present fields as `(element name, text)` pairs, in rendering order
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        let values = [
            &self.city,
            &self.country,
            &self.id,
            &self.name,
            &self.terminal_id,
            &self.mcc,
            &self.inn,
        ];

        SUBMERCHANT_FIELDS
            .iter()
            .zip(values)
            .filter_map(|(name, value)| value.as_deref().map(|v| (*name, v)))
            .collect()
    }

    fn from_json(value: &JsonValue) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };
        let field = |name: &str| object.get(name).map(scalar_text);

        Self {
            city: field("city"),
            country: field("country"),
            id: field("id"),
            name: field("name"),
            terminal_id: field("terminal-id"),
            mcc: field("mcc"),
            inn: field("inn"),
        }
    }

    fn to_json(&self) -> JsonValue {
        let object: Map<String, JsonValue> = self
            .fields()
            .into_iter()
            .map(|(name, value)| (name.to_string(), JsonValue::String(value.to_string())))
            .collect();
        JsonValue::Object(object)
    }
}

/// One `<param>` of an `order-params` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderParam {
    pub name: String,
    pub value: String,
}

/// A single configured extension block
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionBlock {
    SubmerchantData(SubmerchantData),
    OrderParams(Vec<OrderParam>),
    /// Raw transaction type override; validated against the allow-list when rendered
    TransactionType(String),
    Unrecognized { key: String, value: JsonValue },
}

impl ExtensionBlock {
    pub fn key(&self) -> &str {
        match self {
            ExtensionBlock::SubmerchantData(_) => KEY_SUBMERCHANT_DATA,
            ExtensionBlock::OrderParams(_) => KEY_ORDER_PARAMS,
            ExtensionBlock::TransactionType(_) => KEY_TRANSACTION_TYPE,
            ExtensionBlock::Unrecognized { key, .. } => key,
        }
    }

    fn from_entry(key: &str, value: &JsonValue) -> Self {
        match (key, value) {
            (KEY_SUBMERCHANT_DATA, value) => {
                ExtensionBlock::SubmerchantData(SubmerchantData::from_json(value))
            }
            (KEY_ORDER_PARAMS, JsonValue::Array(entries)) => {
                ExtensionBlock::OrderParams(entries.iter().filter_map(order_param).collect())
            }
            (KEY_TRANSACTION_TYPE, value) => ExtensionBlock::TransactionType(scalar_text(value)),
            (key, value) => ExtensionBlock::Unrecognized {
                key: key.to_string(),
                value: value.clone(),
            },
        }
    }

    fn to_json(&self) -> JsonValue {
        match self {
            ExtensionBlock::SubmerchantData(data) => data.to_json(),
            ExtensionBlock::OrderParams(params) => {
                serde_json::to_value(params).unwrap_or(JsonValue::Array(Vec::new()))
            }
            ExtensionBlock::TransactionType(value) => JsonValue::String(value.clone()),
            ExtensionBlock::Unrecognized { value, .. } => value.clone(),
        }
    }
}

/// The full set of configured extension blocks, one per key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpaExtensions {
    blocks: Vec<ExtensionBlock>,
}

impl CpaExtensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the stored JSON object. Never fails: a non-object yields no blocks.
    pub fn from_json(value: &JsonValue) -> Self {
        let blocks = value
            .as_object()
            .map(|object| {
                object
                    .iter()
                    .map(|(key, value)| ExtensionBlock::from_entry(key, value))
                    .collect()
            })
            .unwrap_or_default();

        Self { blocks }
    }

    /// Insert a block, replacing any existing block under the same key
    pub fn insert(&mut self, block: ExtensionBlock) {
        self.blocks.retain(|existing| existing.key() != block.key());
        self.blocks.push(block);
    }

    pub fn with(mut self, block: ExtensionBlock) -> Self {
        self.insert(block);
        self
    }

    pub fn blocks(&self) -> &[ExtensionBlock] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn submerchant_data(&self) -> Option<&SubmerchantData> {
        self.blocks.iter().find_map(|block| match block {
            ExtensionBlock::SubmerchantData(data) => Some(data),
            _ => None,
        })
    }

    pub fn order_params(&self) -> Option<&[OrderParam]> {
        self.blocks.iter().find_map(|block| match block {
            ExtensionBlock::OrderParams(params) => Some(params.as_slice()),
            _ => None,
        })
    }

    pub fn transaction_type(&self) -> Option<&str> {
        self.blocks.iter().find_map(|block| match block {
            ExtensionBlock::TransactionType(value) => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn to_json(&self) -> JsonValue {
        let object: Map<String, JsonValue> = self
            .blocks
            .iter()
            .map(|block| (block.key().to_string(), block.to_json()))
            .collect();
        JsonValue::Object(object)
    }
}

impl Serialize for CpaExtensions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn order_param(entry: &JsonValue) -> Option<OrderParam> {
    let object = entry.as_object()?;
    let name = object.get("name")?;
    let value = object.get("value")?;

    Some(OrderParam {
        name: scalar_text(name),
        value: scalar_text(value),
    })
}

/// Render a JSON value as element text: strings verbatim, null as empty, anything
/// else as its JSON text.
pub(crate) fn scalar_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_keys_become_typed_blocks() {
        let extensions = CpaExtensions::from_json(&json!({
            "submerchant-data": {"city": "Minsk", "mcc": 5999, "unused": "x"},
            "order-params": [
                {"name": "a", "value": "1"},
                {"name": "missing-value"},
                "not-an-object",
                {"name": "b", "value": 2}
            ],
            "transaction-type": "OCT",
            "custom-block": {"k": "v"}
        }));

        let submerchant = extensions.submerchant_data().unwrap();
        assert_eq!(submerchant.city.as_deref(), Some("Minsk"));
        assert_eq!(submerchant.mcc.as_deref(), Some("5999"));
        assert_eq!(submerchant.fields(), vec![("city", "Minsk"), ("mcc", "5999")]);

        let params = extensions.order_params().unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[1], OrderParam { name: "b".into(), value: "2".into() });

        assert_eq!(extensions.transaction_type(), Some("OCT"));
        assert!(extensions
            .blocks()
            .iter()
            .any(|b| matches!(b, ExtensionBlock::Unrecognized { key, .. } if key == "custom-block")));
    }

    #[test]
    fn test_order_params_must_be_a_list() {
        let extensions = CpaExtensions::from_json(&json!({
            "order-params": {"name": "a", "value": "1"}
        }));

        assert!(extensions.order_params().is_none());
        assert_eq!(extensions.blocks()[0].key(), KEY_ORDER_PARAMS);
    }

    #[test]
    fn test_non_string_transaction_type_kept_as_text() {
        let extensions = CpaExtensions::from_json(&json!({"transaction-type": 5}));
        assert_eq!(extensions.transaction_type(), Some("5"));
    }

    #[test]
    fn test_non_object_yields_empty_set() {
        assert!(CpaExtensions::from_json(&json!([1, 2])).is_empty());
        assert!(CpaExtensions::from_json(&JsonValue::Null).is_empty());
    }

    #[test]
    fn test_non_object_submerchant_data_has_no_fields() {
        let extensions = CpaExtensions::from_json(&json!({"submerchant-data": ["city"]}));
        assert!(extensions.submerchant_data().unwrap().fields().is_empty());
    }

    #[test]
    fn test_insert_replaces_same_key() {
        let extensions = CpaExtensions::new()
            .with(ExtensionBlock::TransactionType("OCT".into()))
            .with(ExtensionBlock::TransactionType("P2P".into()));

        assert_eq!(extensions.blocks().len(), 1);
        assert_eq!(extensions.transaction_type(), Some("P2P"));
    }

    #[test]
    fn test_to_json_restores_stored_shape() {
        let stored = json!({
            "order-params": [{"name": "a", "value": "1"}],
            "submerchant-data": {"city": "Minsk", "inn": "123"},
            "transaction-type": "P2P",
            "x-custom": [true]
        });

        assert_eq!(CpaExtensions::from_json(&stored).to_json(), stored);
    }
}
