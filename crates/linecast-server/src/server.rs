//! TCP listener and readiness-multiplexed broadcast loop.
//!
//! The loop is a single task: the registry, the queues and the router are
//! only ever touched from it, so nothing is locked. Sockets are read and
//! written with `try_read`/`try_write` after readiness has been signalled,
//! which never blocks.

use std::future::Future;
use std::io;
use std::net::SocketAddr;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, select_all};
use tokio::io::Interest;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::{debug, error, info, warn};

use linecast_protocol::FrameHeader;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::registry::{ConnectionId, ConnectionRegistry};
use crate::router::BroadcastRouter;

/// What woke the loop up.
enum Wakeup {
    /// The listener produced a connection (or an accept error).
    Accepted(io::Result<(TcpStream, SocketAddr)>),
    /// At least one registered connection is ready.
    Ready,
}

enum ReadOutcome {
    Idle,
    Frames(Vec<bytes::Bytes>),
    Closed,
    Failed(io::Error),
}

enum WriteOutcome {
    Idle,
    Wrote { bytes: usize, frame_done: bool },
    Failed(io::Error),
}

/// The broadcast server.
pub struct BroadcastServer {
    config: ServerConfig,
    listener: TcpListener,
    registry: ConnectionRegistry<TcpStream>,
    router: BroadcastRouter,
    /// Receives at most one frame's worth of bytes per read.
    scratch: Vec<u8>,
}

impl BroadcastServer {
    /// Binds the listening socket with the configured backlog.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;

        let addr = config.bind_addr;
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr).map_err(|e| ServerError::bind(addr, e))?;
        let listener = socket
            .listen(config.backlog)
            .map_err(|e| ServerError::bind(addr, e))?;

        info!(
            addr = %listener.local_addr()?,
            backlog = config.backlog,
            frame_size = config.layout.frame_size(),
            "Broadcast server listening"
        );

        let layout = config.layout;
        Ok(Self {
            listener,
            registry: ConnectionRegistry::new(layout),
            router: BroadcastRouter::new(layout),
            scratch: vec![0u8; layout.frame_size()],
            config,
        })
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Number of registered client connections.
    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    /// Runs the loop forever. Per-connection failures only tear down the
    /// connection involved.
    pub async fn run(&mut self) {
        loop {
            self.turn().await;
        }
    }

    /// Runs the loop until `shutdown` completes.
    pub async fn run_until_shutdown<S>(&mut self, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        tokio::select! {
            _ = self.run() => {}
            _ = shutdown => {
                info!(
                    connections = self.registry.len(),
                    "Shutdown signal received"
                );
            }
        }
    }

    /// One iteration: wait for readiness, accept, read and route, write.
    async fn turn(&mut self) {
        if let Wakeup::Accepted(result) = self.wait_ready().await {
            self.accept(result);
        }
        self.read_ready();
        self.write_ready();
    }

    /// Blocks until the listener or any connection is ready.
    ///
    /// Every connection is watched for reads; only those with queued output
    /// are watched for writes, otherwise an idle writable socket would wake
    /// the loop continuously.
    async fn wait_ready(&self) -> Wakeup {
        let mut waiters: Vec<BoxFuture<'_, Wakeup>> = Vec::with_capacity(self.registry.len() + 1);
        waiters.push(self.listener.accept().map(Wakeup::Accepted).boxed());

        for conn in self.registry.iter() {
            let interest = if conn.has_pending_output() {
                Interest::READABLE.add(Interest::WRITABLE)
            } else {
                Interest::READABLE
            };
            waiters.push(
                conn.stream()
                    .ready(interest)
                    .map(|_| Wakeup::Ready)
                    .boxed(),
            );
        }

        let (wakeup, _, _) = select_all(waiters).await;
        wakeup
    }

    fn accept(&mut self, result: io::Result<(TcpStream, SocketAddr)>) {
        match result {
            Ok((stream, peer)) => {
                let id = self.registry.register(stream, Some(peer));
                self.router
                    .notify(&mut self.registry, id, &self.config.welcome);
                info!(connection = %id, %peer, "New connection");
            }
            Err(e) => {
                error!(error = %e, "Failed to accept connection");
            }
        }
    }

    /// Reads from every readable connection and routes complete frames.
    fn read_ready(&mut self) {
        let layout = self.router.layout();

        for id in self.registry.ids() {
            let outcome = {
                let Some(conn) = self.registry.get_mut(id) else {
                    continue;
                };
                match conn.stream().try_read(&mut self.scratch) {
                    Ok(0) => ReadOutcome::Closed,
                    Ok(n) => ReadOutcome::Frames(conn.inbound_mut().push(&self.scratch[..n])),
                    Err(e)
                        if matches!(
                            e.kind(),
                            io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                        ) =>
                    {
                        ReadOutcome::Idle
                    }
                    Err(e) => ReadOutcome::Failed(e),
                }
            };

            match outcome {
                ReadOutcome::Idle => {}
                ReadOutcome::Frames(frames) => {
                    for frame in frames {
                        let payload = layout.decode(&frame);
                        let declared = FrameHeader::parse(&frame, layout.header_width())
                            .map(|h| h.declared_len)
                            .ok();
                        let delivered = self.router.route(&mut self.registry, id, &payload);
                        debug!(
                            connection = %id,
                            bytes = payload.len(),
                            declared_len = ?declared,
                            delivered,
                            "Received frame"
                        );
                    }
                }
                ReadOutcome::Closed => self.disconnect(id, None),
                ReadOutcome::Failed(e) => self.disconnect(id, Some(e)),
            }
        }
    }

    /// Writes at most one frame to each writable connection with pending
    /// output. A partly written frame is resumed on the next turn.
    fn write_ready(&mut self) {
        for id in self.registry.ids() {
            let outcome = {
                let Some(conn) = self.registry.get_mut(id) else {
                    continue;
                };
                let result = match conn.next_outbound() {
                    Some((stream, frame)) => stream.try_write(frame),
                    None => continue,
                };
                match result {
                    Ok(0) => WriteOutcome::Failed(io::ErrorKind::WriteZero.into()),
                    Ok(n) => WriteOutcome::Wrote {
                        bytes: n,
                        frame_done: conn.consume_outbound(n),
                    },
                    Err(e)
                        if matches!(
                            e.kind(),
                            io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                        ) =>
                    {
                        WriteOutcome::Idle
                    }
                    Err(e) => WriteOutcome::Failed(e),
                }
            };

            match outcome {
                WriteOutcome::Idle => {}
                WriteOutcome::Wrote { bytes, frame_done } => {
                    debug!(connection = %id, bytes, frame_done, "Sent frame");
                }
                // A failed write is treated exactly like a failed read.
                WriteOutcome::Failed(e) => self.disconnect(id, Some(e)),
            }
        }
    }

    /// Unregisters and closes a connection, discarding anything queued.
    fn disconnect(&mut self, id: ConnectionId, cause: Option<io::Error>) {
        let Some(mut conn) = self.registry.unregister(id) else {
            return;
        };

        let dropped = conn.queue().len();
        let partial = conn.inbound_mut().pending();
        match cause {
            None => info!(
                connection = %id,
                peer = ?conn.peer(),
                dropped_frames = dropped,
                "Client disconnected"
            ),
            Some(e) => warn!(
                connection = %id,
                peer = ?conn.peer(),
                dropped_frames = dropped,
                error = %e,
                "Client connection failed"
            ),
        }
        if partial > 0 {
            debug!(connection = %id, bytes = partial, "Discarding partial frame");
        }
        // Dropping the stream closes the socket.
        drop(conn.into_stream());
    }
}
