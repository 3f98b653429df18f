/// Telegram Bot API integration
///
/// - `types`: update, message and keyboard payloads
/// - `client`: HTTP client, also the production [`crate::notify::Notifier`]

pub mod client;
pub mod types;

pub use client::{TelegramClient, TelegramConfig, TelegramError};
