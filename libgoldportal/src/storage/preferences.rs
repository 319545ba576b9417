use crate::storage::{read_json, write_json, LocalStorageError, ThreadSafeLocalStorage};
use log::warn;
use std::sync::Arc;

pub const BIOMETRIC_LOCK_KEY: &str = "biometricLockEnabled";

/// Per-client settings page state.
pub struct Preferences {
    storage: Arc<ThreadSafeLocalStorage>,
}

impl Preferences {
    pub fn new(storage: Arc<ThreadSafeLocalStorage>) -> Preferences {
        Preferences { storage }
    }

    pub fn biometric_lock_enabled(&self) -> bool {
        match read_json::<bool>(self.storage.as_ref(), BIOMETRIC_LOCK_KEY) {
            Ok(enabled) => enabled.unwrap_or(false),
            Err(e) => {
                warn!("Could not read biometric lock preference: {e}");
                false
            }
        }
    }

    pub fn set_biometric_lock_enabled(&self, enabled: bool) -> Result<(), LocalStorageError> {
        write_json(self.storage.as_ref(), BIOMETRIC_LOCK_KEY, &enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{InMemoryLocalStorage, LocalStorage};

    #[test]
    fn biometric_lock_is_off_until_enabled() {
        let preferences = Preferences::new(Arc::new(InMemoryLocalStorage::new()));
        assert!(!preferences.biometric_lock_enabled());

        preferences.set_biometric_lock_enabled(true).unwrap();
        assert!(preferences.biometric_lock_enabled());

        preferences.set_biometric_lock_enabled(false).unwrap();
        assert!(!preferences.biometric_lock_enabled());
    }

    #[test]
    fn unreadable_preference_counts_as_off() {
        let storage = Arc::new(InMemoryLocalStorage::new());
        storage.set_item(BIOMETRIC_LOCK_KEY, "yes please").unwrap();

        assert!(!Preferences::new(storage).biometric_lock_enabled());
    }
}
