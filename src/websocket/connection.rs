use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::protocol::{
    ActionRequest, ConnId, CreateRequest, Envelope, JoinRequest, ServerMessage,
};
use crate::server::DraftServer;

pub(super) async fn handle_socket(socket: WebSocket, server: Arc<DraftServer>, addr: SocketAddr) {
    let (mut sender, mut receiver) = socket.split();
    let conn_id: ConnId = Uuid::new_v4();
    let (tx, mut rx) = mpsc::channel::<Arc<ServerMessage>>(server.config().client_queue_capacity);

    tracing::info!(%conn_id, client_addr = %addr, "WebSocket connection established");

    // Writer task: drains the outbound queue onto the socket. A write failure
    // ends the task; cleanup happens when the connection winds down.
    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match serde_json::to_string(&*message) {
                Ok(text) => text,
                Err(err) => {
                    tracing::error!(error = %err, "failed to serialize outbound message");
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Read loop: any read failure terminates only this connection.
    let read_server = Arc::clone(&server);
    let read_tx = tx.clone();
    let receive_task = tokio::spawn(async move {
        let max_message_size = read_server.config().max_message_size;
        while let Some(frame) = receiver.next().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(err) => {
                    tracing::debug!(%conn_id, error = %err, "WebSocket read failed");
                    break;
                }
            };

            match frame {
                Message::Text(text) => {
                    if text.len() > max_message_size {
                        tracing::warn!(
                            %conn_id,
                            size = text.len(),
                            max = max_message_size,
                            "inbound message exceeds size limit"
                        );
                        send_error(&read_tx, "Invalid message format").await;
                        continue;
                    }
                    dispatch(&read_server, conn_id, &read_tx, &text).await;
                }
                Message::Close(_) => {
                    tracing::info!(%conn_id, "WebSocket connection closed");
                    break;
                }
                // Binary frames are not part of the protocol; pings are
                // answered by axum itself.
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = send_task => {}
        _ = receive_task => {}
    }

    server.disconnect(&conn_id).await;
    tracing::info!(%conn_id, "connection cleaned up");
}

/// Route one inbound frame by its `type` field. Handler-specific parse
/// failures and engine errors are reported to the sender only.
async fn dispatch(server: &Arc<DraftServer>, conn_id: ConnId, tx: &OutboundQueue, text: &str) {
    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(_) => {
            send_error(tx, "Invalid message format").await;
            return;
        }
    };

    match envelope.message_type.as_str() {
        "create" => handle_create(server, tx, text).await,
        "join" => handle_join(server, conn_id, tx, text).await,
        "action" => handle_action(server, conn_id, tx, text).await,
        _ => send_error(tx, "Unknown message type").await,
    }
}

async fn handle_create(server: &Arc<DraftServer>, tx: &OutboundQueue, text: &str) {
    let request: CreateRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(_) => {
            send_error(tx, "Invalid create message format").await;
            return;
        }
    };

    let room = server.create_room(&request);
    // The keys exist exactly once on the wire: in this reply to the creator.
    let response = ServerMessage::CreateResponse {
        room_id: room.id.clone(),
        red_team_key: room.red_key.clone().unwrap_or_default(),
        blue_team_key: room.blue_key.clone().unwrap_or_default(),
    };
    send(tx, response).await;
}

async fn handle_join(
    server: &Arc<DraftServer>,
    conn_id: ConnId,
    tx: &OutboundQueue,
    text: &str,
) {
    let request: JoinRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(_) => {
            send_error(tx, "Invalid join message format").await;
            return;
        }
    };

    let (room, _side) = match server
        .join_room(&request.room_id, conn_id, tx.clone(), &request.key)
        .await
    {
        Ok(joined) => joined,
        Err(err) => {
            send_error(tx, &err.to_string()).await;
            return;
        }
    };

    // The joiner gets the state directly, then everyone (joiner included)
    // gets the broadcast.
    send(tx, ServerMessage::Status(room.snapshot().await)).await;
    server.broadcast_status(&room).await;
}

async fn handle_action(
    server: &Arc<DraftServer>,
    conn_id: ConnId,
    tx: &OutboundQueue,
    text: &str,
) {
    let request: ActionRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(_) => {
            send_error(tx, "Invalid action message format").await;
            return;
        }
    };

    let Some(room_id) = server.conn_room(&conn_id) else {
        send_error(tx, "You are not in a room").await;
        return;
    };

    match server.process_action(&room_id, &conn_id, &request).await {
        Ok(room) => server.broadcast_status(&room).await,
        Err(err) => send_error(tx, &err.to_string()).await,
    }
}

type OutboundQueue = mpsc::Sender<Arc<ServerMessage>>;

async fn send(tx: &OutboundQueue, message: ServerMessage) {
    if tx.send(Arc::new(message)).await.is_err() {
        tracing::debug!("outbound queue closed, message dropped");
    }
}

async fn send_error(tx: &OutboundQueue, message: &str) {
    send(
        tx,
        ServerMessage::Error {
            message: message.to_string(),
        },
    )
    .await;
}
