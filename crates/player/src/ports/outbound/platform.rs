//! Platform abstraction ports
//!
//! The roster store remembers which character this device registered, per
//! event. Where that is kept (a JSON file on desktop, memory in tests) is an
//! infrastructure concern behind `StorageProvider`.

/// Persistent key-value storage.
pub trait StorageProvider: Send + Sync {
    /// Save a string value with the given key
    fn save(&self, key: &str, value: &str);

    /// Load a string value by key, returns None if not found
    fn load(&self, key: &str) -> Option<String>;

    /// Remove a value by key
    fn remove(&self, key: &str);
}

/// Storage key constants
///
/// Kept in the ports layer as they define the contract for what keys are
/// used across the application.
pub mod storage_keys {
    use keyparty_domain::EventCode;

    pub const SELF_CHARACTER_PREFIX: &str = "keyparty_self_character";

    /// Key holding the id of the character this device registered for `code`.
    pub fn self_character(code: &EventCode) -> String {
        format!("{}:{}", SELF_CHARACTER_PREFIX, code)
    }
}
