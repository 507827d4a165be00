//! Error types shared by the server and its connections.

use std::net::SocketAddr;

/// Errors that reach the owning process.
///
/// Nothing that happens inside a single connection ends up here; those are
/// reported as [`ConnectionError`] and stay with the connection task.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listening socket could not be created.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The listener itself is broken and cannot accept anymore.
    #[error("accept failed on {addr}: {source}")]
    Accept {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The event loop could not be built.
    #[error("failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// A configuration file exists but could not be used.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Errors that terminate one connection without a response.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Read or write failed mid-pipeline (includes peer reset).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The deadline fired before the response was written.
    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(std::time::Duration),
}
