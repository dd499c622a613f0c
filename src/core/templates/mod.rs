pub mod setup_progress;
pub mod template_definitions;
pub mod template_rules;
pub mod template_service;

pub use template_definitions::{ServerTemplate, TemplateId, GENERIC_WELCOME};
pub use template_service::{TemplateError, TemplateService};
