pub mod help;
pub mod quote;
pub mod utility_models;
pub mod utility_service;

pub use utility_models::Invoker;
pub use utility_service::{UtilityError, UtilityService};
