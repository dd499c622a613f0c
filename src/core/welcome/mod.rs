pub mod welcome_format;
pub mod welcome_service;

pub use welcome_format::WelcomeContext;
pub use welcome_service::{NewMember, WelcomeService};
