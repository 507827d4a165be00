//! Vigil - Minimal informational HTTP endpoint
//!
//! Core library for the HTTP pipeline, routing and server lifecycle.

pub mod config;
pub mod error;
pub mod http;
pub mod server;

pub use server::listener::{start_server, start_server_on, Server, ShutdownHandle};
