// Platform boundary - the only way the core reaches the chat platform.

pub mod platform_gateway;
pub mod platform_models;

#[cfg(test)]
pub mod mock_gateway;

pub use platform_gateway::{PlatformError, PlatformGateway};
pub use platform_models::*;
