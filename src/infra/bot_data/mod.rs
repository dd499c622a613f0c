// Bot data persistence.
// - `json_store.rs` keeps the whole document in one pretty-printed JSON file.

#[path = "json_store.rs"]
pub mod json_store;

pub use json_store::JsonBotDataStore;
