// Chat platform adapter.
// - `serenity_gateway.rs` implements the core's PlatformGateway over serenity's HTTP client.

#[path = "serenity_gateway.rs"]
pub mod serenity_gateway;

pub use serenity_gateway::SerenityGateway;
