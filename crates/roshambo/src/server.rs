//! `RoshamboServer` builder and server loop.
//!
//! This is the entry point for running a Roshambo server. It ties
//! together all the layers: transport → protocol → session → room.

use std::sync::Arc;

use roshambo_protocol::JsonCodec;
use roshambo_room::{RoomConfig, RoomRegistry};
use roshambo_transport::{Transport, WebSocketTransport};
use serde::{Deserialize, Serialize};

use crate::RoshamboError;
use crate::handler::handle_connection;

/// Server settings. Everything has a default, so a bare
/// `RoshamboServer::builder().build()` serves `/ws/{code}` on
/// `127.0.0.1:8080` with matches to three points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: String,
    /// Request path prefix; the rest of the path is the room code.
    pub path_prefix: String,
    /// Per-room settings.
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            path_prefix: "/ws/".to_string(),
            room: RoomConfig::default(),
        }
    }
}

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// registry does its own synchronization, so nothing here needs a lock.
pub(crate) struct ServerState {
    pub(crate) registry: RoomRegistry,
    pub(crate) codec: JsonCodec,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a Roshambo server.
///
/// # Example
///
/// ```rust,no_run
/// use roshambo::prelude::*;
///
/// # async fn start() -> Result<(), RoshamboError> {
/// let server = RoshamboServer::builder()
///     .bind("0.0.0.0:8080")
///     .winning_points(5)
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct RoshamboServerBuilder {
    config: ServerConfig,
}

impl RoshamboServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Starts from an existing configuration.
    pub fn from_config(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the request path prefix that precedes the room code.
    pub fn path_prefix(mut self, prefix: &str) -> Self {
        self.config.path_prefix = prefix.to_string();
        self
    }

    /// Sets the room configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.config.room = config;
        self
    }

    /// Sets the score at which a match ends.
    pub fn winning_points(mut self, points: u32) -> Self {
        self.config.room.winning_points = points;
        self
    }

    /// Validates the room settings, binds the listener and builds the
    /// server.
    pub async fn build(self) -> Result<RoshamboServer, RoshamboError> {
        let registry = RoomRegistry::new(self.config.room.clone())?;
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry,
            codec: JsonCodec,
            config: self.config,
        });

        Ok(RoshamboServer { transport, state })
    }
}

impl Default for RoshamboServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Roshambo server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct RoshamboServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl RoshamboServer {
    /// Creates a new builder.
    pub fn builder() -> RoshamboServerBuilder {
        RoshamboServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The live room registry. Clones share state with the server.
    pub fn registry(&self) -> RoomRegistry {
        self.state.registry.clone()
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task for each accepted connection. Runs until the
    /// process is terminated; a failed accept is logged and skipped.
    pub async fn run(mut self) -> Result<(), RoshamboError> {
        tracing::info!(
            prefix = %self.state.config.path_prefix,
            winning_points = self.state.config.room.winning_points,
            "Roshambo server running"
        );

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
