//! WebSocket event channel.
//!
//! Each frame is a JSON text message `{"event": ..., "data": ...}`. Client
//! events are answered on the same socket; Telegram traffic broadcast by
//! the factory is forwarded to every open socket.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use appfactory_core::Factory;
use appfactory_models::{ClientEvent, CursorResponse, ServerEvent};

use crate::state::AppState;

/// GET /ws - Upgrade to the event channel.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handles one client event and returns the reply to send back.
pub async fn handle_client_event(factory: &Factory, event: ClientEvent) -> ServerEvent {
    match event {
        ClientEvent::WebMessage {
            message,
            conversation_id,
        } => {
            if message.trim().is_empty() {
                return ServerEvent::Error {
                    message: "Message is required".to_string(),
                };
            }
            let reply = factory.chat(&message, conversation_id.as_deref()).await;
            ServerEvent::CursorResponse(CursorResponse::from(&reply))
        }
        ClientEvent::GetConversation(id) => {
            ServerEvent::ConversationHistory(factory.conversation_history(&id).await)
        }
    }
}

/// Parses a text frame and dispatches it.
pub async fn handle_text_frame(factory: &Factory, text: &str) -> ServerEvent {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => handle_client_event(factory, event).await,
        Err(e) => {
            debug!(error = %e, "Unparseable client frame");
            ServerEvent::Error {
                message: "Failed to process message".to_string(),
            }
        }
    }
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = state.add_connection().await;
    info!(connection = %connection_id, "Web client connected");

    let (mut sender, mut receiver) = socket.split();
    let (reply_tx, mut reply_rx) = mpsc::channel::<ServerEvent>(32);
    let mut events = state.factory.subscribe();

    let send_task = tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                reply = reply_rx.recv() => match reply {
                    Some(event) => event,
                    None => break,
                },
                broadcast = events.recv() => match broadcast {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Web client lagging, events dropped");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            };

            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "Failed to encode event");
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = receiver.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };

        // One task per frame; replies may arrive out of order.
        let factory = state.factory.clone();
        let reply_tx = reply_tx.clone();
        tokio::spawn(async move {
            let reply = handle_text_frame(&factory, &text).await;
            let _ = reply_tx.send(reply).await;
        });
    }

    drop(reply_tx);
    send_task.abort();
    state.remove_connection(&connection_id).await;
    info!(connection = %connection_id, "Web client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use appfactory_core::FactoryConfig;

    #[tokio::test]
    async fn test_web_message_then_history() {
        let factory = Factory::new(FactoryConfig::default());

        let reply = handle_text_frame(
            &factory,
            r#"{"event":"web_message","data":{"message":"hi","conversationId":"web_1"}}"#,
        )
        .await;
        match reply {
            ServerEvent::CursorResponse(r) => assert!(r.content.contains("\"hi\"")),
            other => panic!("unexpected reply: {:?}", other),
        }

        let history =
            handle_text_frame(&factory, r#"{"event":"get_conversation","data":"web_1"}"#).await;
        match history {
            ServerEvent::ConversationHistory(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].text, "hi");
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bad_frame_is_error_event() {
        let factory = Factory::new(FactoryConfig::default());
        let reply = handle_text_frame(&factory, "not json").await;
        assert!(matches!(reply, ServerEvent::Error { .. }));
    }

    #[tokio::test]
    async fn test_empty_message_is_error_event() {
        let factory = Factory::new(FactoryConfig::default());
        let reply = handle_client_event(
            &factory,
            ClientEvent::WebMessage {
                message: " ".to_string(),
                conversation_id: None,
            },
        )
        .await;
        assert!(matches!(reply, ServerEvent::Error { .. }));
    }
}
