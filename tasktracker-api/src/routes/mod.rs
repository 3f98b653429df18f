/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: One-time-code login, token refresh, logout
/// - `tasks`: The caller's tasks

pub mod auth;
pub mod health;
pub mod tasks;
