//! `settings.json` access.

use serde_json::{Map, Value as JsonValue};

use super::{read_json, write_json, FileStore, SettingsSource, StoreError, SETTINGS_FILE};
use crate::settings::{MerchantConfig, SettingsUpdate};

impl FileStore {
    /// Raw stored settings object; default settings when the file is missing or invalid
    fn stored_settings(&self) -> Map<String, JsonValue> {
        match read_json::<JsonValue>(&self.path(SETTINGS_FILE)) {
            Ok(JsonValue::Object(object)) => object,
            _ => match MerchantConfig::default().to_json() {
                JsonValue::Object(object) => object,
                _ => Map::new(),
            },
        }
    }

    /// Merge an update from the tester UI into the stored settings
    pub fn save_settings(&self, update: &SettingsUpdate) -> Result<MerchantConfig, StoreError> {
        let _guard = self.lock();

        let mut stored = self.stored_settings();
        update.apply_to(&mut stored);
        let stored = JsonValue::Object(stored);
        write_json(&self.path(SETTINGS_FILE), &stored)?;

        tracing::info!("Settings saved to {}", self.path(SETTINGS_FILE).display());
        Ok(MerchantConfig::from_json(&stored))
    }
}

impl SettingsSource for FileStore {
    fn snapshot(&self) -> MerchantConfig {
        let path = self.path(SETTINGS_FILE);

        match read_json::<JsonValue>(&path) {
            Ok(value) => {
                let config = MerchantConfig::from_json(&value);
                tracing::debug!(
                    aft_enabled = config.aft_enabled,
                    aft_type = %config.aft_mir_extension_type,
                    aft_value = %config.aft_mir_extension_value,
                    aft_country = %config.aft_mir_extension_country,
                    aft_phone = %config.aft_mir_extension_phone,
                    "Loaded settings from {}",
                    path.display()
                );
                config
            }
            Err(e) => {
                tracing::warn!("Using default settings, cannot load {}: {}", path.display(), e);
                MerchantConfig::default()
            }
        }
    }
}
