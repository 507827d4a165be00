//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.x subset: one request per connection, GET
//! only, fixed routes, `Connection: close` on every response.
//!
//! # Architecture
//!
//! - **`connection`**: the per-socket state machine and its deadline
//! - **`parser`**: parses a request out of the inbound byte buffer
//! - **`request`**: request representation and method tokens
//! - **`response`**: response representation with builder pattern
//! - **`router`**: the fixed, read-only route table
//! - **`writer`**: serializes and writes responses to the client
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Accumulate bytes until a request parses
//!        └──────┬──────┘
//!               │ Request parsed          (malformed / peer closed)
//!               ▼                                   │
//!        ┌──────────────────┐                       │
//!        │   Processing     │ ← Route or reject     │
//!        └──────┬───────────┘                       │
//!               │ Response ready                    │
//!               ▼                                   │
//!        ┌──────────────────┐                       │
//!        │    Writing       │ ◄─────── 400 ─────────┘
//!        └──────┬───────────┘
//!               │ Written, send side shut down
//!               ▼
//!        ┌──────────────────┐
//!        │     Closed       │ ◄── deadline or I/O error, from any state
//!        └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use vigil::http::connection::{Connection, Limits};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         tokio::spawn(Connection::new(socket, Limits::default()).run());
//!     }
//! }
//! ```

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod router;
pub mod writer;
