use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::{Builder, Handle};
use tokio::sync::watch;
use tracing::{debug, error, info, warn, Instrument};

use crate::config::Config;
use crate::error::{ConnectionError, ServerError};
use crate::http::connection::{Connection, Limits};

/// Pause after an accept error that is not tied to one peer (e.g. out of
/// file descriptors), so the loop does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// The acceptor: owns the listening socket and the runtime connections run on.
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    limits: Limits,
    runtime: Handle,
    shutdown: Arc<watch::Sender<bool>>,
}

/// Stops a running [`Server`]. Cheap to clone and safe to call more than once.
#[derive(Clone)]
pub struct ShutdownHandle {
    shutdown: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }
}

impl Server {
    /// Binds `cfg.listen_addr`. Connections will be spawned on the current runtime.
    pub async fn bind(cfg: &Config) -> Result<Self, ServerError> {
        Self::bind_on(Handle::current(), cfg).await
    }

    /// Binds `bind_address:port` with default limits.
    pub async fn start(bind_address: &str, port: u16) -> Result<Self, ServerError> {
        Self::bind(&Config::new(bind_address, port)).await
    }

    /// Binds `cfg.listen_addr`, spawning connections on `runtime`.
    pub async fn bind_on(runtime: Handle, cfg: &Config) -> Result<Self, ServerError> {
        let bind_error = |source: io::Error| ServerError::Bind {
            addr: cfg.listen_addr.clone(),
            source,
        };

        let addr: SocketAddr = cfg
            .listen_addr
            .parse()
            .map_err(|e| bind_error(io::Error::new(io::ErrorKind::InvalidInput, e)))?;

        let listener = TcpListener::bind(addr).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;

        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            listener,
            local_addr,
            limits: Limits::from(cfg),
            runtime,
            shutdown: Arc::new(shutdown),
        })
    }

    /// Address actually bound; differs from the config when port 0 was asked for.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            shutdown: Arc::clone(&self.shutdown),
        }
    }

    /// Accepts until stopped or until the listener itself breaks.
    ///
    /// Connections already accepted keep running on the runtime after this
    /// returns.
    pub async fn run(self) -> Result<(), ServerError> {
        let Server {
            mut listener,
            local_addr,
            limits,
            runtime,
            shutdown,
        } = self;
        info!("Listening on {}", local_addr);

        accept_loop(&mut listener, shutdown.subscribe(), |socket, peer| {
            info!("Accepted connection from {}", peer);
            spawn_connection(&runtime, limits, socket, peer);
        })
        .await
        .map_err(|source| ServerError::Accept {
            addr: local_addr,
            source,
        })?;

        info!("Server stopped");
        Ok(())
    }
}

/// Source of inbound connections for [`accept_loop`].
pub(crate) trait Accept {
    fn accept(&mut self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send;
}

impl Accept for TcpListener {
    fn accept(&mut self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send {
        TcpListener::accept(self)
    }
}

/// Hands every accepted socket to `on_accept` and re-arms, until `stop`
/// flips or the acceptor fails for good.
async fn accept_loop<A, F>(
    acceptor: &mut A,
    mut stop: watch::Receiver<bool>,
    mut on_accept: F,
) -> io::Result<()>
where
    A: Accept,
    F: FnMut(TcpStream, SocketAddr),
{
    loop {
        let accepted = tokio::select! {
            res = acceptor.accept() => res,
            _ = stop.wait_for(|stopped| *stopped) => return Ok(()),
        };

        match accepted {
            Ok((socket, peer)) => on_accept(socket, peer),
            Err(e) if is_fatal_accept_error(&e) => {
                error!(error = %e, "Listener failed");
                return Err(e);
            }
            Err(e) if is_peer_accept_error(&e) => {
                debug!(error = %e, "Peer went away during accept");
            }
            Err(e) => {
                warn!(error = %e, "Failed to accept, backing off");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}

fn spawn_connection(runtime: &Handle, limits: Limits, socket: TcpStream, peer: SocketAddr) {
    let conn = Connection::new(socket, limits);
    let span = tracing::info_span!("connection", %peer);

    runtime.spawn(
        async move {
            let summary = conn.run().await;
            match summary.result {
                Ok(()) => debug!(phases = ?summary.history, "Connection closed"),
                Err(ConnectionError::DeadlineExceeded(_)) => {
                    info!("Connection closed by deadline")
                }
                Err(e) => debug!(error = %e, "Connection closed on error"),
            }
        }
        .instrument(span),
    );
}

/// The listener itself is broken.
fn is_fatal_accept_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotConnected | io::ErrorKind::InvalidInput
    )
}

/// Failed before the handshake finished; only that one peer is affected.
fn is_peer_accept_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
    )
}

/// Process entry point: build the runtime, bind, serve until Ctrl-C.
///
/// Failures go to the log rather than back to the caller. Dropping the
/// runtime on return tears down any connection still in flight.
pub fn start_server(cfg: &Config) {
    let runtime = match Builder::new_multi_thread()
        .worker_threads(cfg.workers)
        .thread_name("vigil-worker")
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            let err = ServerError::Runtime(e);
            error!(error = %err, "Server not started");
            return;
        }
    };

    let result = runtime.block_on(async {
        let server = Server::bind_on(Handle::current(), cfg).await?;
        let handle = server.shutdown_handle();

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Shutdown signal received");
                    handle.stop();
                }
                Err(e) => warn!(error = %e, "Could not listen for Ctrl-C"),
            }
        });

        server.run().await
    });

    if let Err(e) = result {
        error!(error = %e, "Server terminated");
    }
}

/// [`start_server`] with default settings on `bind_address:port`.
pub fn start_server_on(bind_address: &str, port: u16) {
    start_server(&Config::new(bind_address, port));
}
