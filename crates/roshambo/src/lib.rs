//! # Roshambo
//!
//! A two-player rock-paper-scissors match server over WebSocket.
//!
//! Players connect to `/ws/{code}`. The first two connections with the same
//! code share a room and play rounds until one of them reaches the winning
//! score; a third connection is turned away. Every room runs as its own
//! actor task, so rooms never contend with one another.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roshambo::prelude::*;
//!
//! # async fn start() -> Result<(), RoshamboError> {
//! let server = RoshamboServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::RoshamboError;
pub use server::{RoshamboServer, RoshamboServerBuilder, ServerConfig};

pub use roshambo_protocol as protocol;
pub use roshambo_room as room;
pub use roshambo_transport as transport;

use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter` when the variable is unset or invalid.
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Everything needed to run a server or drive one from tests.
pub mod prelude {
    pub use crate::{
        RoshamboError, RoshamboServer, RoshamboServerBuilder, ServerConfig,
        init_tracing,
    };
    pub use roshambo_protocol::{
        ClientMessage, Codec, GAME_STARTED_TEXT, INVALID_CODE_TEXT, JsonCodec,
        Move, ROOM_FULL_TEXT, RoomCode, Scores, ServerMessage, Slot,
    };
    pub use roshambo_room::{
        RoomConfig, RoomError, RoomHandle, RoomPhase, RoomRegistry,
        WINNING_POINTS,
    };
}
