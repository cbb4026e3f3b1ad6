//! WebSocket route handler
//!
//! Pushes the watchlist rows and the chart state to the client whenever the
//! corresponding watch channel changes. The current values are sent on
//! connect.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use bellafi_core::MarketSnapshot;
use bellafi_services::{ChartState, WatchlistRow};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::chart::ChartView;
use crate::AppState;

/// Messages pushed to the client
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushMessage {
    Snapshot {
        rows: Vec<WatchlistRow>,
    },
    Chart {
        #[serde(flatten)]
        view: ChartView,
    },
}

impl PushMessage {
    fn snapshot(state: &AppState) -> Self {
        PushMessage::Snapshot {
            rows: state.service.rows(),
        }
    }

    fn chart(state: &AppState) -> Self {
        PushMessage::Chart {
            view: state.chart.state().into(),
        }
    }

    fn to_message(&self) -> Option<Message> {
        match serde_json::to_string(self) {
            Ok(json) => Some(Message::Text(json.into())),
            Err(e) => {
                warn!("Failed to serialize push message: {}", e);
                None
            }
        }
    }
}

/// Watch receivers backing one connection
struct Subscriptions {
    snapshot: watch::Receiver<MarketSnapshot>,
    watchlist: watch::Receiver<Vec<String>>,
    chart: watch::Receiver<ChartState>,
}

impl Subscriptions {
    /// Subscribe with the current values marked as already sent
    fn new(state: &AppState) -> Self {
        let mut subs = Self {
            snapshot: state.service.subscribe_snapshot(),
            watchlist: state.service.subscribe_watchlist(),
            chart: state.chart.subscribe(),
        };
        subs.snapshot.mark_unchanged();
        subs.watchlist.mark_unchanged();
        subs.chart.mark_unchanged();
        subs
    }

    /// Wait for the next change; `None` once a channel has closed
    ///
    /// Rows are pushed for both snapshot and membership changes.
    async fn next_push(&mut self, state: &AppState) -> Option<PushMessage> {
        let changed = tokio::select! {
            changed = self.snapshot.changed() => changed.map(|_| PushMessage::snapshot(state)),
            changed = self.watchlist.changed() => changed.map(|_| PushMessage::snapshot(state)),
            changed = self.chart.changed() => changed.map(|_| PushMessage::chart(state)),
        };
        changed.ok()
    }
}

/// Create WebSocket routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/ws", get(ws_handler))
}

/// WebSocket upgrade handler
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    info!("WebSocket upgrade request received");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let mut subs = Subscriptions::new(&state);

    for initial in [PushMessage::snapshot(&state), PushMessage::chart(&state)] {
        if let Some(msg) = initial.to_message() {
            if sender.send(msg).await.is_err() {
                return;
            }
        }
    }

    loop {
        let push = tokio::select! {
            push = subs.next_push(&state) => match push {
                Some(push) => push,
                None => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    debug!("WebSocket receive error: {}", e);
                    break;
                }
            },
        };

        if let Some(msg) = push.to_message() {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    }

    info!("WebSocket client disconnected");
}
