//! Persisted player settings: best score and the two audio switches.
//!
//! Loaded once when the controller is built, written back on every change.
//! Reads that fail or return garbage fall back to defaults; failed writes are
//! logged and otherwise ignored.

use serde::Serialize;

use crate::storage::KeyValueStore;

pub const HIGH_SCORE_KEY: &str = "pet-tap-high-score";
pub const SOUND_KEY: &str = "pet-tap-sound";
pub const EFFECTS_KEY: &str = "pet-tap-sfx";

const ON: &str = "on";
const OFF: &str = "off";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub high_score: u64,
    pub sound_enabled: bool,
    pub effects_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            high_score: 0,
            sound_enabled: true,
            effects_enabled: true,
        }
    }
}

#[derive(Debug)]
pub struct SettingsStore<S> {
    store: S,
    current: Settings,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn load(store: S) -> Self {
        let high_score = read(&store, HIGH_SCORE_KEY)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);
        // anything but an explicit "off" counts as enabled
        let sound_enabled = read(&store, SOUND_KEY).is_none_or(|v| v != OFF);
        let effects_enabled = read(&store, EFFECTS_KEY).is_none_or(|v| v != OFF);
        let current = Settings {
            high_score,
            sound_enabled,
            effects_enabled,
        };
        log::debug!("settings loaded: {current:?}");
        Self { store, current }
    }

    pub fn get(&self) -> Settings {
        self.current
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn set_sound(&mut self, enabled: bool) {
        self.current.sound_enabled = enabled;
        self.write(SOUND_KEY, if enabled { ON } else { OFF });
    }

    pub fn set_effects(&mut self, enabled: bool) {
        self.current.effects_enabled = enabled;
        self.write(EFFECTS_KEY, if enabled { ON } else { OFF });
    }

    /// Stores `score` if it beats the best so far. Returns whether it did.
    pub fn record_score(&mut self, score: u64) -> bool {
        if score <= self.current.high_score {
            return false;
        }
        self.current.high_score = score;
        self.write(HIGH_SCORE_KEY, &score.to_string());
        true
    }

    fn write(&mut self, key: &'static str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            log::warn!("{e}");
        }
    }
}

fn read<S: KeyValueStore>(store: &S, key: &'static str) -> Option<String> {
    match store.get(key) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("reading '{key}': {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PetTapError;
    use crate::storage::MemoryStore;

    #[test]
    fn defaults_when_empty() {
        let s = SettingsStore::load(MemoryStore::new());
        assert_eq!(s.get(), Settings::default());
    }

    #[test]
    fn reads_existing_values() {
        let store = MemoryStore::new();
        store.insert_raw(HIGH_SCORE_KEY, "4200");
        store.insert_raw(SOUND_KEY, "off");
        store.insert_raw(EFFECTS_KEY, "whatever");
        let s = SettingsStore::load(store);
        assert_eq!(s.get().high_score, 4200);
        assert!(!s.get().sound_enabled);
        assert!(s.get().effects_enabled);
    }

    #[test]
    fn garbage_high_score_reads_as_zero() {
        let store = MemoryStore::new();
        store.insert_raw(HIGH_SCORE_KEY, "lots");
        assert_eq!(SettingsStore::load(store).get().high_score, 0);
    }

    #[test]
    fn record_score_only_raises() {
        let store = MemoryStore::new();
        let mut s = SettingsStore::load(store.clone());
        assert!(s.record_score(150));
        assert!(!s.record_score(90));
        assert!(!s.record_score(150));
        assert_eq!(s.get().high_score, 150);
        assert_eq!(store.raw(HIGH_SCORE_KEY).as_deref(), Some("150"));
    }

    #[test]
    fn toggles_write_on_off() {
        let store = MemoryStore::new();
        let mut s = SettingsStore::load(store.clone());
        s.set_sound(false);
        s.set_effects(false);
        assert_eq!(store.raw(SOUND_KEY).as_deref(), Some("off"));
        assert_eq!(store.raw(EFFECTS_KEY).as_deref(), Some("off"));
        s.set_sound(true);
        assert_eq!(store.raw(SOUND_KEY).as_deref(), Some("on"));
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &'static str) -> Result<Option<String>, PetTapError> {
            Err(PetTapError::StorageUnavailable)
        }
        fn set(&mut self, key: &'static str, _value: &str) -> Result<(), PetTapError> {
            Err(PetTapError::StorageWrite { key })
        }
    }

    #[test]
    fn broken_storage_is_not_fatal() {
        let mut s = SettingsStore::load(BrokenStore);
        assert_eq!(s.get(), Settings::default());
        assert!(s.record_score(10));
        s.set_sound(false);
        assert_eq!(s.get().high_score, 10);
        assert!(!s.get().sound_enabled);
    }
}
