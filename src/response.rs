//! XML documents returned to the gateway.
//!
//! Two documents exist: the payment-availability answer to a check request and the
//! fixed acknowledgement of a payment-result callback. Neither path can fail; missing
//! optional parts are simply left out.

use crate::extension::{assemble, FragmentKind, XmlFragment};
use crate::settings::MerchantConfig;
use crate::xml::{element, escape_text, INDENT};

/// Content type of every document produced here
pub const CONTENT_TYPE: &str = "text/xml";

pub const XML_DECLARATION: &str = "<?xml version='1.0' standalone='yes'?>";

/// ISO 4217 numeric code for RUB
pub const DEFAULT_CURRENCY: &str = "643";
pub const DEFAULT_EXPONENT: &str = "2";

const ACCOUNT_ID: &str = "MAIN";
const CARD_REGISTER: &str = "CardRegister";

/// Card-on-file reference for recurring payments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardBlock {
    pub id: String,
}

/// Payment-availability response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityResponse {
    pub order_id: String,
    pub short_desc: String,
    pub long_desc: String,
    pub amount: String,
    pub currency: String,
    pub exponent: String,
    pub card: Option<CardBlock>,
    pub fragments: Vec<XmlFragment>,
    /// Append a `CardRegister` transaction type; replaces any assembled transaction type
    pub card_registration: bool,
}

impl AvailabilityResponse {
    pub fn new(
        order_id: impl Into<String>,
        short_desc: impl Into<String>,
        long_desc: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            short_desc: short_desc.into(),
            long_desc: long_desc.into(),
            amount: amount.into(),
            currency: DEFAULT_CURRENCY.to_string(),
            exponent: DEFAULT_EXPONENT.to_string(),
            card: None,
            fragments: Vec::new(),
            card_registration: false,
        }
    }

    /// Build the response for a check request from a settings snapshot.
    ///
    /// `request_forces_aft` is set when the request itself asks for an AFT payment;
    /// AFT is also active when the merchant enabled it in settings.
    pub fn from_config(order_id: &str, config: &MerchantConfig, request_forces_aft: bool) -> Self {
        let aft = config.aft_params(request_forces_aft);
        let fragments = assemble(&config.cpa_extensions, &aft);

        let card = (config.recurrent_enabled && !config.selected_card_id.is_empty()).then(|| {
            CardBlock {
                id: config.selected_card_id.clone(),
            }
        });

        tracing::debug!(
            order_id,
            use_aft = aft.enabled,
            fragments = fragments.len(),
            card = card.is_some(),
            "composing availability response"
        );

        Self {
            card,
            fragments,
            card_registration: config.card_registration_enabled && !aft.enabled,
            ..Self::new(order_id, &config.short_desc, &config.long_desc, &config.amount)
        }
    }

    pub fn to_xml(&self) -> String {
        let mut lines = vec![
            XML_DECLARATION.to_string(),
            "<payment-avail-response>".to_string(),
            "  <result>".to_string(),
            "    <code>1</code>".to_string(),
            "    <desc>Payment is available</desc>".to_string(),
            "  </result>".to_string(),
            format!("  {}", element("merchant-trx", &self.order_id)),
            "  <purchase>".to_string(),
            format!("    {}", element("shortDesc", &self.short_desc)),
            format!("    {}", element("longDesc", &self.long_desc)),
            "    <account-amount>".to_string(),
            format!("      {}", element("id", ACCOUNT_ID)),
            format!("      {}", element("amount", &self.amount)),
            format!("      {}", element("currency", &self.currency)),
            format!("      {}", element("exponent", &self.exponent)),
            "    </account-amount>".to_string(),
            "  </purchase>".to_string(),
        ];

        if let Some(card) = &self.card {
            lines.push("  <card>".to_string());
            lines.push(format!("    <id>{}</id>", escape_text(&card.id)));
            lines.push("    <present>N</present>".to_string());
            lines.push("  </card>".to_string());
        }

        lines.extend(
            self.fragments
                .iter()
                .filter(|f| !(self.card_registration && f.kind == FragmentKind::TransactionType))
                .map(|f| format!("{INDENT}{}", f.xml.trim())),
        );

        if self.card_registration {
            lines.push(format!("{INDENT}{}", XmlFragment::transaction_type(CARD_REGISTER).xml));
        }

        lines.push("</payment-avail-response>".to_string());
        lines.join("\n")
    }
}

/// Compose a payment-availability document.
pub fn compose_availability(
    order_id: &str,
    short_desc: &str,
    long_desc: &str,
    amount: &str,
    card: Option<CardBlock>,
    fragments: Vec<XmlFragment>,
    card_registration: bool,
) -> String {
    AvailabilityResponse {
        card,
        fragments,
        card_registration,
        ..AvailabilityResponse::new(order_id, short_desc, long_desc, amount)
    }
    .to_xml()
}

/// Compose the acknowledgement for a payment-result callback.
///
/// An absent or empty result code counts as `1`; only an explicit other value fails.
pub fn compose_callback_result(result_code: Option<&str>) -> String {
    let result_code = result_code.filter(|code| !code.is_empty()).unwrap_or("1");
    let (code, desc) = if result_code == "1" {
        ("1", "OK")
    } else {
        ("2", "FAILED")
    };

    [
        XML_DECLARATION.to_string(),
        "<register-payment-response>".to_string(),
        "  <result>".to_string(),
        format!("    <code>{code}</code>"),
        format!("    <desc>{desc}</desc>"),
        "  </result>".to_string(),
        "</register-payment-response>".to_string(),
    ]
    .join("\n")
}
