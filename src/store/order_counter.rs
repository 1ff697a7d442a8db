//! Sequential merchant order ids.

use std::fs;

use super::{FileStore, ORDER_COUNTER_FILE};

impl FileStore {
    /// Increment the stored counter and return the new value as an order id.
    ///
    /// An unreadable counter restarts from zero; a failed write is logged and the id
    /// is still returned.
    pub fn next_order_id(&self) -> String {
        let _guard = self.lock();
        let path = self.path(ORDER_COUNTER_FILE);

        let current = fs::read_to_string(&path)
            .ok()
            .and_then(|contents| contents.trim().parse::<u64>().ok())
            .unwrap_or(0);
        let next = current + 1;

        if let Err(e) = fs::write(&path, next.to_string()) {
            tracing::warn!("Failed to write order counter {}: {}", path.display(), e);
        }

        next.to_string()
    }
}
