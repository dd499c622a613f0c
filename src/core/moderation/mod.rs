// Core moderation module - auto-mod classifiers and the escalation flow.
// Following the same pattern as the other core modules.

pub mod content_filter;
pub mod moderation_models;
pub mod moderation_notices;
pub mod moderation_service;
pub mod nsfw_scorer;
pub mod spam_tracker;
pub mod unban_scheduler;

pub use moderation_models::*;
pub use moderation_service::{ModerationError, ModerationService};
