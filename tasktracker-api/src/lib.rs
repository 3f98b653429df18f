//! # Task Tracker API Server Library
//!
//! The request-driven front door: the same task operations as the bot,
//! gated by short-lived access tokens.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and the access-token gate
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Extractors that reject with the API error format
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
