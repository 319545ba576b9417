use crate::storage::{read_json, write_json, LocalStorageError, ThreadSafeLocalStorage};
use log::warn;
use std::sync::Arc;

pub const SEARCH_HISTORY_KEY: &str = "testResultsHistory";
const MAX_SEARCH_HISTORY_LEN: usize = 10;

/// Serial numbers this client looked up, newest first.
pub struct SearchHistory {
    storage: Arc<ThreadSafeLocalStorage>,
}

impl SearchHistory {
    pub fn new(storage: Arc<ThreadSafeLocalStorage>) -> SearchHistory {
        SearchHistory { storage }
    }

    pub fn entries(&self) -> Vec<String> {
        match read_json::<Vec<String>>(self.storage.as_ref(), SEARCH_HISTORY_KEY) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                warn!("Could not read search history: {e}");
                Vec::new()
            }
        }
    }

    /// Puts a serial number in front of the history unless it is already in there.
    ///
    /// A serial number that was searched before keeps its position.
    pub fn record(&self, serial_number: &str) -> Result<Vec<String>, LocalStorageError> {
        let mut entries = self.entries();
        if entries.iter().any(|e| e == serial_number) {
            return Ok(entries);
        }

        entries.insert(0, serial_number.to_string());
        entries.truncate(MAX_SEARCH_HISTORY_LEN);
        write_json(self.storage.as_ref(), SEARCH_HISTORY_KEY, &entries)?;

        Ok(entries)
    }

    pub fn clear(&self) -> Result<(), LocalStorageError> {
        self.storage.remove_item(SEARCH_HISTORY_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryLocalStorage;

    fn history() -> SearchHistory {
        SearchHistory::new(Arc::new(InMemoryLocalStorage::new()))
    }

    #[test]
    fn newest_search_comes_first() {
        let history = history();

        history.record("A-1").unwrap();
        history.record("A-2").unwrap();

        assert_eq!(history.entries(), vec!["A-2", "A-1"]);
    }

    #[test]
    fn repeated_search_keeps_its_position() {
        let history = history();
        history.record("A-1").unwrap();
        history.record("A-2").unwrap();

        let entries = history.record("A-1").unwrap();

        assert_eq!(entries, vec!["A-2", "A-1"]);
    }

    #[test]
    fn keeps_only_the_ten_latest_searches() {
        let history = history();

        for i in 0..12 {
            history.record(&format!("S-{i}")).unwrap();
        }

        let entries = history.entries();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries.first().map(String::as_str), Some("S-11"));
        assert_eq!(entries.last().map(String::as_str), Some("S-2"));
    }

    #[test]
    fn clear_forgets_everything() {
        let history = history();
        history.record("A-1").unwrap();

        history.clear().unwrap();

        assert!(history.entries().is_empty());
    }
}
