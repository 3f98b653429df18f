//! # Task Tracker Bot
//!
//! The conversational front door: Telegram updates become events, a single
//! intake loop drives each user's add-task dialogue, and replies go back
//! through the shared notifier.
//!
//! ```text
//! UpdatePoller ──mpsc──> IntakeLoop ──> IntakeMachine ──> TaskService / CredentialService
//!                                             │
//!                                             └──> SessionStore, Notifier
//! ```

pub mod config;
pub mod events;
pub mod intake;
pub mod poller;
pub mod runner;
pub mod session;
