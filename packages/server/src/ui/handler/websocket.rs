//! WebSocket connection handlers.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::mpsc;

use crate::ui::state::AppState;

/// Pending pixel updates per viewer before sends start to wait
pub const VIEWER_QUEUE_CAPACITY: usize = 64;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    tracing::debug!("Upgrading viewer connection");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives pixel updates from the rx channel and pushes them to the WebSocket sender.
///
/// # Arguments
///
/// * `rx` - Channel receiver fed by the BroadcastHub
/// * `sender` - WebSocket sink of this viewer
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::Receiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    })
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (sender, mut receiver) = socket.split();

    let (tx, rx) = mpsc::channel(VIEWER_QUEUE_CAPACITY);
    let connection_id = state.connect_viewer_usecase.execute(tx).await;

    // Spawn a task to drain messages from this viewer
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    // Viewers are receive-only
                    tracing::debug!(
                        "Ignoring message from viewer '{}': {}",
                        connection_id,
                        text.as_str()
                    );
                }
                Message::Close(_) => {
                    tracing::debug!("Viewer '{}' requested close", connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to push pixel updates to this viewer
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.disconnect_viewer_usecase.execute(connection_id).await;
}
