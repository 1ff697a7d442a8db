//! Payment initiation links for test orders created from the tester UI.

use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::settings::{MerchantConfig, DEFAULT_PAYMENT_PAGE};

/// Payment page used when card registration is requested
pub const CARD_REGISTRATION_PAGE: &str = "pages-rec";

/// Extra parameter marking the order as an AFT payment
pub const AFT_PAYMENT_PARAM: &str = "paymentId=aft";

fn default_mode() -> String {
    "test".to_string()
}

fn default_payment_page() -> String {
    DEFAULT_PAYMENT_PAGE.to_string()
}

/// Order request posted by the tester UI
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub extra_param: String,
    #[serde(default = "default_payment_page")]
    pub payment_page: String,
    #[serde(default)]
    pub recurrent_enabled: bool,
    #[serde(default)]
    pub selected_card_id: String,
    #[serde(default)]
    pub card_registration_enabled: bool,
    #[serde(default)]
    pub aft_enabled: bool,
    #[serde(default)]
    pub aft_mir_extension_type: String,
    #[serde(default)]
    pub aft_mir_extension_value: String,
}

impl Default for CreateOrderRequest {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            extra_param: String::new(),
            payment_page: default_payment_page(),
            recurrent_enabled: false,
            selected_card_id: String::new(),
            card_registration_enabled: false,
            aft_enabled: false,
            aft_mir_extension_type: String::new(),
            aft_mir_extension_value: String::new(),
        }
    }
}

/// Result returned to the tester UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedOrder {
    pub success: bool,
    pub initiation_link: String,
    pub order_id: String,
    pub aft_enabled: bool,
    pub aft_mir_extension_type: String,
    pub aft_mir_extension_value: String,
}

impl CreateOrderRequest {
    /// Payment page, switched to the registration page when a card is registered
    pub fn effective_payment_page(&self) -> &str {
        if self.card_registration_enabled {
            CARD_REGISTRATION_PAGE
        } else {
            &self.payment_page
        }
    }

    /// Extra query parameters, with the AFT marker appended when requested
    pub fn effective_extra_param(&self) -> String {
        match (self.aft_enabled, self.extra_param.is_empty()) {
            (false, _) => self.extra_param.clone(),
            (true, true) => AFT_PAYMENT_PARAM.to_string(),
            (true, false) => format!("{}&{}", self.extra_param, AFT_PAYMENT_PARAM),
        }
    }

    /// Gateway link that starts the payment for `order_id`
    pub fn initiation_link(
        &self,
        server: &ServerConfig,
        settings: &MerchantConfig,
        order_id: &str,
    ) -> String {
        let mut link = format!(
            "{}/{}/?lang_code=RU&merch_id={}&back_url_s={}&back_url_f={}&o.order_id={}&mode={}&amount={}",
            server.gateway_base(),
            self.effective_payment_page(),
            server.merchant_id,
            settings.back_url_success,
            settings.back_url_fail,
            order_id,
            self.mode,
            settings.amount,
        );

        let extra = self.effective_extra_param();
        if !extra.is_empty() {
            link.push('&');
            link.push_str(&extra);
        }

        if self.recurrent_enabled && !self.selected_card_id.is_empty() {
            link.push_str("&src.type=card_id&src.cardId=");
            link.push_str(&self.selected_card_id);
        }

        link
    }

    pub fn into_created(self, link: String, order_id: String) -> CreatedOrder {
        CreatedOrder {
            success: true,
            initiation_link: link,
            order_id,
            aft_enabled: self.aft_enabled,
            aft_mir_extension_type: self.aft_mir_extension_type,
            aft_mir_extension_value: self.aft_mir_extension_value,
        }
    }
}
