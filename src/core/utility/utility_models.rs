// Utility command models.

use crate::core::platform::Permission;

/// The member who ran a command.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoker {
    pub id: u64,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnounceOutcome {
    pub channel_id: u64,
    /// Whether the @everyone ping went through
    pub pinged: bool,
    /// Whether the announcements channel had to be created
    pub created_channel: bool,
}

/// Permissions toggled for @everyone by lock and unlock.
pub const LOCK_PERMISSIONS: &[Permission] = &[
    Permission::SendMessages,
    Permission::AddReactions,
    Permission::CreatePublicThreads,
    Permission::CreatePrivateThreads,
];
