//! Client-side persistence: a string key-value store and the typed
//! preferences kept in it.

mod prefs;
mod store;

pub use prefs::Preferences;
#[cfg(test)]
pub use store::MemoryStore;
pub use store::{FileStore, KeyValueStore, StoreHandle, read_key, write_key};
