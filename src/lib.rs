//! # cpa-mock: merchant-side test double for gateway CPA callbacks
//!
//! The gateway asks the merchant two things during a card payment: whether the
//! payment is available (`CPAReq`) and, afterwards, to register the payment result
//! (`RPReq`). This crate answers both with the XML documents the gateway expects,
//! shaped by editable merchant settings.
//!
//! ## Features
//!
//! - **Extension normalization**: strip country prefixes from PAN/IBAN destinations
//!   and split phone numbers glued onto SWIFT codes
//! - **Extension assembly**: `<submerchant-data>`, `<order-params>`, `<mir-extension>`
//!   and `<transaction-type>` fragments in the gateway's fixed order
//! - **Response composition**: complete availability and callback-result documents
//! - **File-backed tester state**: settings, recorded callbacks, saved cards and an
//!   order counter in a data directory
//!
//! ## Example
//!
//! ```
//! use cpa_mock::extension::normalizer::TAG_PAN;
//! use cpa_mock::{AvailabilityResponse, MerchantConfig};
//!
//! let mut config = MerchantConfig::default();
//! config.aft_enabled = true;
//! config.aft_mir_extension_type = TAG_PAN.to_string();
//! config.aft_mir_extension_value = "BLR4111".to_string();
//! config.aft_mir_extension_country = String::new();
//!
//! let xml = AvailabilityResponse::from_config("1", &config, false).to_xml();
//! assert!(xml.contains(
//!     "<mir-extension><type>3ds2.destAbroadPAN</type><value>4111</value><country>BLR</country></mir-extension>"
//! ));
//! ```

// Extension value normalization and XML assembly
pub mod extension;
pub mod response;
pub mod xml;

// Merchant settings and file-backed collaborators
pub mod settings;
pub mod store;
pub mod order;

// HTTP server
pub mod api;
pub mod config;

// Re-export key types
pub use extension::{
    assemble, normalize, AftParams, CpaExtensions, ExtensionBlock, ExtensionType, FragmentKind,
    NormalizedExtensionValue, XmlFragment,
};
pub use response::{
    compose_availability, compose_callback_result, AvailabilityResponse, CardBlock, CONTENT_TYPE,
};
pub use settings::{MerchantConfig, SettingsUpdate};
pub use store::{CallbackData, CallbackKind, CallbackSink, FileStore, SettingsSource, StoreError};
pub use config::ServerConfig;
