//! Cards registered through payment-result callbacks, offered for recurring payments.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{keep_newest, read_list, write_json, FileStore, StoreError};
use super::{CARDS_FILE, HISTORY_LIMIT};

/// Entry of `cards.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub card_id: String,
    #[serde(default)]
    pub masked_pan: String,
    #[serde(default)]
    pub expiry: String,
    #[serde(default)]
    pub payment_system: String,
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub registered: String,
}

impl FileStore {
    /// Saved cards, oldest first, at most [`HISTORY_LIMIT`]
    pub fn load_cards(&self) -> Vec<CardRecord> {
        let mut cards = read_list(&self.path(CARDS_FILE));
        keep_newest(&mut cards, HISTORY_LIMIT);
        cards
    }

    /// Save a card, replacing an earlier record with the same id
    pub fn save_card(&self, card: CardRecord) -> Result<(), StoreError> {
        let _guard = self.lock();

        let mut cards = self.load_cards();
        cards.retain(|existing| existing.card_id != card.card_id);
        tracing::info!(card_id = %card.card_id, "saving card");
        cards.push(card);
        keep_newest(&mut cards, HISTORY_LIMIT);

        write_json(&self.path(CARDS_FILE), &cards)
    }
}
