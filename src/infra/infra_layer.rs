// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "bot_data/mod.rs"]
pub mod bot_data;

#[path = "platform/mod.rs"]
pub mod platform;
