//! # Task Tracker Worker
//!
//! Background process that reminds users of upcoming deadlines.
//!
//! ## Module Organization
//!
//! - `scheduler`: periodic scan of due tasks and reminder delivery

pub mod scheduler;

/// Current version of the worker
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
