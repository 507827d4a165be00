//! Listening socket, accept loop and process entry point.

pub mod listener;

pub use listener::{start_server, start_server_on, Server, ShutdownHandle};
