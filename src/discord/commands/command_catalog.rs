// Discord commands module.
// Each feature gets its own command file.

use crate::discord::{Data, Error};

pub mod access;

pub mod automod;

pub mod channel_lock;

pub mod help;

pub mod presence;

pub mod quote;

pub mod server_admin;

pub mod templates;

/// Every command the bot registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        templates::templates(),
        templates::apply(),
        server_admin::welcome(),
        server_admin::editrules(),
        server_admin::announce(),
        channel_lock::lock(),
        channel_lock::unlock(),
        quote::quote(),
        quote::create_quote(),
        help::help(),
        server_admin::sync(),
        automod::automod(),
    ]
}
