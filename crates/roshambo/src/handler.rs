//! Per-connection handler: room admission and message routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Parse the room code from the request path → reject if invalid
//!   2. Join the room through the registry → reject if full
//!   3. Loop: forward moves to the room, relay room notifications
//!   4. On disconnect → leave the room

use std::sync::Arc;

use roshambo_protocol::{
    ClientMessage, Codec, INVALID_CODE_TEXT, ROOM_FULL_TEXT, RoomCode,
    ServerMessage, Slot,
};
use roshambo_room::{RoomError, RoomHandle};
use roshambo_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::RoshamboError;
use crate::server::ServerState;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), RoshamboError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, path = conn.path(), "handling new connection");

    // --- Step 1: Room code ---
    let code = match RoomCode::from_path(conn.path(), &state.config.path_prefix)
    {
        Ok(code) => code,
        Err(e) => {
            tracing::info!(%conn_id, error = %e, "rejecting invalid room code");
            return reject(&conn, INVALID_CODE_TEXT).await;
        }
    };

    // --- Step 2: Join ---
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (room, slot) = match state.registry.join(&code, tx).await {
        Ok(joined) => joined,
        Err(RoomError::RoomFull(_)) => {
            tracing::info!(%conn_id, %code, "room full, turning connection away");
            return reject(&conn, ROOM_FULL_TEXT).await;
        }
        Err(e) => {
            let _ = conn.close().await;
            return Err(e.into());
        }
    };
    tracing::info!(%conn_id, %code, %slot, room_id = %room.room_id(), "player seated");

    // --- Step 3: Message loop ---
    let result = relay(&conn, &state, &room, slot, &mut rx).await;

    // --- Step 4: Leave ---
    // Harmless when the room is already gone (match over or torn down).
    match room.leave(slot).await {
        Ok(()) | Err(RoomError::Unavailable(_)) => {}
        Err(e) => tracing::debug!(%conn_id, %slot, error = %e, "leave failed"),
    }
    result
}

/// Pumps messages both ways until the client leaves or the room is done
/// with this connection.
async fn relay(
    conn: &WebSocketConnection,
    state: &ServerState,
    room: &RoomHandle,
    slot: Slot,
    rx: &mut mpsc::UnboundedReceiver<ServerMessage>,
) -> Result<(), RoshamboError> {
    let conn_id = conn.id();

    loop {
        tokio::select! {
            inbound = conn.recv() => match inbound {
                Ok(Some(data)) => {
                    handle_client_message(conn_id, state, room, slot, &data).await;
                }
                Ok(None) => {
                    tracing::info!(%conn_id, %slot, "connection closed cleanly");
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!(%conn_id, %slot, error = %e, "recv error");
                    return Err(e.into());
                }
            },

            outbound = rx.recv() => match outbound {
                Some(msg) => {
                    let text = state.codec.encode(&msg)?;
                    conn.send_text(&text).await?;
                    if matches!(msg, ServerMessage::GameOver { .. }) {
                        tracing::debug!(%conn_id, %slot, "match over, closing");
                        conn.close().await?;
                        return Ok(());
                    }
                }
                None => {
                    // The room dropped our sender: the opponent left and the
                    // room was torn down.
                    tracing::info!(%conn_id, %slot, "room closed, disconnecting");
                    conn.close().await?;
                    return Ok(());
                }
            },
        }
    }
}

/// Decodes one inbound frame and forwards it to the room. Undecodable
/// frames and rejected moves are dropped.
async fn handle_client_message(
    conn_id: ConnectionId,
    state: &ServerState,
    room: &RoomHandle,
    slot: Slot,
    data: &[u8],
) {
    let msg: ClientMessage = match state.codec.decode(data) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "ignoring undecodable message");
            return;
        }
    };

    match msg {
        ClientMessage::Move { choice } => {
            if let Err(e) = room.submit(slot, choice).await {
                tracing::debug!(%conn_id, %slot, error = %e, "move rejected");
            }
        }
    }
}

/// Sends a plain-text notice and closes the connection.
async fn reject(
    conn: &WebSocketConnection,
    notice: &str,
) -> Result<(), RoshamboError> {
    conn.send_text(notice).await?;
    conn.close().await?;
    Ok(())
}
