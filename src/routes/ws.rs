//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::logic::*;
use crate::protocol::{to_case_out, to_summary, ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "codesleuth_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "codesleuth_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "codesleuth_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "codesleuth_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "codesleuth_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::ListCases => {
      let cases = state.cases_in_order().into_iter().map(to_summary).collect();
      ServerWsMessage::Cases { cases }
    }

    ClientWsMessage::OpenCase { case_id } => match state.case(&case_id) {
      Some(case) => {
        tracing::info!(target: "validation", %case_id, "WS case opened");
        ServerWsMessage::Case { case: to_case_out(case) }
      }
      None => ServerWsMessage::Error { message: format!("Unknown case: {case_id}") },
    },

    ClientWsMessage::CodeChanged { user_id, case_id, html, css } => {
      let (result, unlocked, balance) = on_code_changed(state, &user_id, &case_id, &html, &css).await;
      tracing::info!(target: "validation", %case_id, score = result.score, unlocked = unlocked.len(), "WS code change evaluated");
      ServerWsMessage::Validation { result, unlocked, balance }
    }

    ClientWsMessage::HintState { user_id, case_id } => {
      match hint_state(state, &user_id, &case_id).await {
        Ok((balance, steps)) => ServerWsMessage::HintState { balance, steps },
        Err(e) => ServerWsMessage::Error { message: e },
      }
    }

    ClientWsMessage::PurchaseHint { user_id, case_id, step_id } => {
      match purchase_hint(state, &user_id, &case_id, &step_id).await {
        Ok((purchase, _balance)) => {
          tracing::info!(target: "hints", %case_id, %step_id, "WS hint purchase handled");
          ServerWsMessage::HintPurchase { purchase }
        }
        Err(e) => ServerWsMessage::Error { message: e },
      }
    }

    ClientWsMessage::ResetCase { user_id, case_id } => {
      match reset_case(state, &user_id, &case_id).await {
        Ok(()) => ServerWsMessage::CaseReset { case_id },
        Err(e) => ServerWsMessage::Error { message: e },
      }
    }

    ClientWsMessage::CloseCase { user_id, case_id, html, css } => {
      match close_case(state, &user_id, &case_id, &html, &css).await {
        Ok(close) => ServerWsMessage::CaseClosed { close },
        Err(e) => ServerWsMessage::Error { message: e },
      }
    }

    ClientWsMessage::Achievements { user_id } => {
      let achievements = achievement_state(state, &user_id).await;
      ServerWsMessage::Achievements { achievements }
    }
  }
}
