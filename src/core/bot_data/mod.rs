// Persisted bot state - one JSON document holding welcome messages,
// auto-mod warnings, pending bans and per-guild config.

pub mod bot_data_models;
pub mod bot_data_store;

#[cfg(test)]
pub mod mock_store;

pub use bot_data_models::{BotData, ServerConfig};
pub use bot_data_store::{BotDataStore, StoreError};
