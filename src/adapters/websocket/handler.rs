//! WebSocket upgrade handler for relay connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Upgrade to WebSocket
//! 2. Open a relay session (registers the connection)
//! 3. Forward outbound events to the client from a writer task
//! 4. Decode and dispatch inbound frames until disconnect
//! 5. Close the session (releases all room memberships)

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::application::{RelayHub, RelaySession};
use crate::domain::foundation::ConnectionId;
use crate::domain::relay::ServerEvent;

/// Handle WebSocket upgrade requests.
///
/// No authentication: any client may connect and claim any user name.
pub async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<RelayHub>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Handle an established WebSocket connection.
///
/// Runs for the lifetime of the connection.
async fn handle_socket(socket: WebSocket, hub: RelayHub) {
    let (sender, mut receiver) = socket.split();

    let (mut session, outbox) = match RelaySession::open(hub).await {
        Ok(opened) => opened,
        Err(e) => {
            tracing::error!("Failed to open relay session: {}", e);
            return;
        }
    };
    let connection_id = session.id();

    let mut send_task = tokio::spawn(forward_outbox(connection_id, outbox, sender));

    loop {
        tokio::select! {
            frame = receiver.next() => {
                let text = match frame {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Binary(_))) => {
                        tracing::warn!(
                            connection_id = %connection_id,
                            "Received unsupported binary message"
                        );
                        continue;
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                        // WebSocket protocol ping/pong - handled automatically by axum
                        continue;
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::debug!(connection_id = %connection_id, "Client sent close frame");
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::debug!(connection_id = %connection_id, "Receive error: {}", e);
                        break;
                    }
                    None => break,
                };

                if let Err(e) = session.handle_frame(&text).await {
                    if e.is_recoverable() {
                        tracing::warn!(
                            connection_id = %connection_id,
                            "Dropping inbound frame: {}",
                            e
                        );
                    } else {
                        tracing::error!(
                            connection_id = %connection_id,
                            "Relay rejected event, closing connection: {}",
                            e
                        );
                        break;
                    }
                }
            }
            _ = &mut send_task => {
                tracing::debug!(connection_id = %connection_id, "Writer finished, closing connection");
                break;
            }
        }
    }

    if let Err(e) = session.close().await {
        tracing::debug!(connection_id = %connection_id, "Close failed: {}", e);
    }
    send_task.abort();
}

/// Write queued events to the client until the queue closes or a send fails.
async fn forward_outbox(
    connection_id: ConnectionId,
    mut outbox: mpsc::UnboundedReceiver<ServerEvent>,
    mut sender: SplitSink<WebSocket, Message>,
) {
    while let Some(event) = outbox.recv().await {
        let json = match event.encode() {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(connection_id = %connection_id, "Failed to serialize event: {}", e);
                continue;
            }
        };

        if let Err(e) = sender.send(Message::Text(json)).await {
            tracing::debug!(
                connection_id = %connection_id,
                "Send error, closing connection: {}",
                e
            );
            break;
        }
    }
}
