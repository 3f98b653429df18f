//! # Task Tracker Shared Library
//!
//! Domain types, storage, and services used by the bot, the reminder worker,
//! and the HTTP API.
//!
//! ## Module Organization
//!
//! - `models`: task records
//! - `deadline`: the `D.M.YYYY HH:MM` deadline grammar
//! - `repository`: the task repository contract and its backends
//! - `kv`: key-value capability for short-lived state
//! - `db`, `redis`: PostgreSQL and Redis plumbing
//! - `service`: task operations shared by both front doors
//! - `auth`: one-time codes, JWT access tokens, refresh rotation, logout
//! - `notify`, `telegram`: outbound messages and the Telegram Bot API client
//! - `clock`, `config`, `error`, `telemetry`: ambient concerns

pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod deadline;
pub mod error;
pub mod kv;
pub mod models;
pub mod notify;
pub mod redis;
pub mod repository;
pub mod service;
pub mod telegram;
pub mod telemetry;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
