use std::time::Duration;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ConnectionError;
use crate::http::parser::{parse_http_request, ParseError};
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::http::router;
use crate::http::writer::ResponseWriter;

const READ_CHUNK: usize = 1024;

/// Per-connection limits, copied out of [`Config`] for each accepted socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub deadline: Duration,
    pub max_request_bytes: usize,
}

impl From<&Config> for Limits {
    fn from(cfg: &Config) -> Self {
        Self {
            deadline: cfg.deadline,
            max_request_bytes: cfg.max_request_bytes,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// One accepted socket driven from `Reading` to `Closed`.
///
/// The connection owns its stream, buffer and deadline outright. It is
/// consumed by [`Connection::run`], so it lives exactly as long as the task
/// running it.
pub struct Connection<S = TcpStream> {
    stream: S,
    buffer: BytesMut,
    state: ConnectionState,
    history: Vec<Phase>,
    limits: Limits,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

/// Payload-free view of [`ConnectionState`], recorded on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Reading,
    Processing,
    Writing,
    Closed,
}

impl ConnectionState {
    pub fn phase(&self) -> Phase {
        match self {
            ConnectionState::Reading => Phase::Reading,
            ConnectionState::Processing(_) => Phase::Processing,
            ConnectionState::Writing(_) => Phase::Writing,
            ConnectionState::Closed => Phase::Closed,
        }
    }
}

/// Which side won the race between the pipeline and the deadline.
enum Outcome {
    Completed(std::io::Result<()>),
    DeadlineExceeded,
}

/// What is left of a connection once it has closed.
#[derive(Debug)]
pub struct Summary {
    /// Every phase entered, in order, ending with `Closed`
    pub history: Vec<Phase>,
    /// `Ok` when a response was written, whatever its status
    pub result: Result<(), ConnectionError>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, limits: Limits) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK * 4),
            state: ConnectionState::Reading,
            history: vec![Phase::Reading],
            limits,
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Runs the pipeline against the deadline and closes the socket.
    ///
    /// The deadline is armed once, here. Finishing the write cancels it by
    /// winning the select; firing first drops the pipeline future, which
    /// aborts the outstanding read or write.
    pub async fn run(mut self) -> Summary {
        let deadline = self.limits.deadline;

        let outcome = tokio::select! {
            biased;
            res = self.drive() => Outcome::Completed(res),
            _ = tokio::time::sleep(deadline) => Outcome::DeadlineExceeded,
        };

        let result = match outcome {
            Outcome::Completed(Ok(())) => Ok(()),
            Outcome::Completed(Err(e)) => {
                debug!(error = %e, phase = ?self.phase(), "Connection aborted");
                Err(ConnectionError::Io(e))
            }
            Outcome::DeadlineExceeded => {
                warn!(
                    deadline_ms = deadline.as_millis() as u64,
                    phase = ?self.phase(),
                    "Deadline exceeded, closing socket"
                );
                Err(ConnectionError::DeadlineExceeded(deadline))
            }
        };

        self.enter(ConnectionState::Closed);

        let Connection { stream, history, .. } = self;
        drop(stream);

        Summary { history, result }
    }

    fn enter(&mut self, state: ConnectionState) {
        self.history.push(state.phase());
        self.state = state;
    }

    async fn drive(&mut self) -> std::io::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    match self.read_request().await? {
                        Ok(req) => {
                            debug!(
                                method = %req.method,
                                path = %req.path,
                                host = req.header("Host").unwrap_or("-"),
                                "Request parsed"
                            );
                            self.enter(ConnectionState::Processing(req));
                        }
                        Err(e) => {
                            debug!(error = %e, "Rejecting malformed request");
                            let response = Response::bad_request(e.diagnostic());
                            self.enter(ConnectionState::Writing(ResponseWriter::new(&response)));
                        }
                    }
                }

                ConnectionState::Processing(req) => {
                    let response = process_request(req);
                    debug!(status = response.status.as_u16(), path = %req.path, "Responding");

                    let writer = ResponseWriter::new(&response);
                    self.enter(ConnectionState::Writing(writer));
                }

                ConnectionState::Writing(writer) => {
                    let written = writer.write_to_stream(&mut self.stream).await;

                    // No keep-alive: the send side goes down whether or not the write succeeded.
                    if let Err(e) = self.stream.shutdown().await {
                        debug!(error = %e, "Shutdown of send side failed");
                    }

                    return written;
                }

                ConnectionState::Closed => return Ok(()),
            }
        }
    }

    /// Reads until one request parses, the input is rejected, or the peer goes away.
    ///
    /// The outer error is I/O and ends the connection silently. The inner one
    /// is a protocol error that still gets a 400.
    pub async fn read_request(&mut self) -> std::io::Result<Result<Request, ParseError>> {
        loop {
            match parse_http_request(&self.buffer) {
                Ok((request, consumed)) => {
                    self.buffer.advance(consumed);
                    return Ok(Ok(request));
                }

                Err(ParseError::Incomplete) => {}

                Err(e) => return Ok(Err(e)),
            }

            // The buffer never grows past the limit, so a request that does
            // not parse within it is too large.
            let room = self.limits.max_request_bytes.saturating_sub(self.buffer.len());
            if room == 0 {
                return Ok(Err(ParseError::TooLarge));
            }

            let mut temp = [0u8; READ_CHUNK];
            let n = self.stream.read(&mut temp[..room.min(READ_CHUNK)]).await?;

            if n == 0 {
                // Peer closed before a complete request arrived
                return Ok(Err(ParseError::Incomplete));
            }

            self.buffer.extend_from_slice(&temp[..n]);
        }
    }
}

/// The processing stage: GET goes to the router, anything else is rejected by name.
///
/// Pure and synchronous. The response version mirrors the request.
pub fn process_request(req: &Request) -> Response {
    let response = match &req.method {
        Method::GET => router::route(&req.path),
        other => Response::bad_request(format!("Invalid request-method '{}'", other)),
    };

    response.with_version(req.version.clone())
}
