//! Recorded gateway requests (`CPAReq` checks and `RPReq` payment results).

use std::collections::BTreeMap;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{keep_newest, read_list, write_json, CallbackSink, FileStore, StoreError};
use super::{CALLBACKS_FILE, HISTORY_LIMIT};
use crate::store::cards::CardRecord;

/// Which gateway request was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallbackKind {
    /// Payment availability check
    #[serde(rename = "CPAReq")]
    CpaReq,
    /// Register payment result
    #[serde(rename = "RPReq")]
    RpReq,
}

/// Snapshot of an inbound request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackData {
    #[serde(rename = "type")]
    pub kind: CallbackKind,
    pub timestamp: NaiveDateTime,
    pub token: String,
    #[serde(default)]
    pub raw_params: BTreeMap<String, String>,
}

impl CallbackData {
    pub fn new(kind: CallbackKind, token: &str, raw_params: BTreeMap<String, String>) -> Self {
        Self {
            kind,
            timestamp: Local::now().naive_local(),
            token: token.to_string(),
            raw_params,
        }
    }

    /// Card saved by a payment-result callback, if the gateway reported one
    pub fn registered_card(&self) -> Option<CardRecord> {
        if self.kind != CallbackKind::RpReq {
            return None;
        }

        let param = |key: &str| self.raw_params.get(key).cloned().unwrap_or_default();
        let card_id = self.raw_params.get("card.id").filter(|id| !id.is_empty())?;

        let registered = self
            .raw_params
            .get("card.registered")
            .cloned()
            .unwrap_or_else(|| "N".to_string());

        Some(CardRecord {
            card_id: card_id.clone(),
            masked_pan: param("p.maskedPan"),
            expiry: param("card.expiry"),
            payment_system: param("p.paymentSystem"),
            timestamp: Local::now().naive_local(),
            registered,
        })
    }
}

/// Entry of `callbacks.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackRecord {
    pub token: String,
    pub timestamp: NaiveDateTime,
    pub data: CallbackData,
}

impl FileStore {
    /// Recorded callbacks, oldest first
    pub fn load_callbacks(&self) -> Vec<CallbackRecord> {
        read_list(&self.path(CALLBACKS_FILE))
    }

    /// Recorded data for a token
    pub fn find_callback(&self, token: &str) -> Option<CallbackData> {
        self.load_callbacks()
            .into_iter()
            .find(|record| record.token == token)
            .map(|record| record.data)
    }
}

impl CallbackSink for FileStore {
    /// Replace any record with the same token, append, keep the newest entries.
    /// A payment result carrying a card id also saves that card.
    fn record(&self, token: &str, data: CallbackData) -> Result<(), StoreError> {
        let card = data.registered_card();

        {
            let _guard = self.lock();
            let mut callbacks = self.load_callbacks();
            callbacks.retain(|record| record.token != token);
            callbacks.push(CallbackRecord {
                token: token.to_string(),
                timestamp: Local::now().naive_local(),
                data,
            });
            keep_newest(&mut callbacks, HISTORY_LIMIT);
            write_json(&self.path(CALLBACKS_FILE), &callbacks)?;
        }

        tracing::debug!(token, "recorded callback");

        if let Some(card) = card {
            self.save_card(card)?;
        }

        Ok(())
    }
}
