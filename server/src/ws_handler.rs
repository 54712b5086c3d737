use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use common::games::SessionRng;
use common::games::snake::{Command, GameController, SnakeSettings};
use common::leaderboard::{LeaderboardService, ScoreGateway};
use common::{log, SessionId};

use crate::protocol::{ClientMessage, ServerMessage};
use crate::score_saver::ScoreSaver;
use crate::web_server::WebServerState;

const OUTGOING_QUEUE: usize = 128;
const FLUSH_TIMEOUT: Duration = Duration::from_millis(200);

pub async fn handle_websocket<G: ScoreGateway>(socket: WebSocket, state: WebServerState<G>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(OUTGOING_QUEUE);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let text = match msg.to_json() {
                Ok(text) => text,
                Err(e) => {
                    log!("Failed to encode server message: {}", e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let session_id = state.tracker.open_session().await;
    log!("[ws:{}] Connected", session_id);

    let session = GameSession::new(
        session_id.clone(),
        &state.game_settings,
        state.leaderboard.clone(),
        tx,
    );
    session.greet().await;

    let mut shutdown_rx = state.tracker.subscribe_shutdown();
    if state.tracker.is_shutting_down() {
        session.send(ServerMessage::ShuttingDown {
            message: "Server is shutting down".to_string(),
        })
        .await;
    } else {
        loop {
            tokio::select! {
                incoming = ws_receiver.next() => {
                    match incoming {
                        Some(Ok(Message::Text(text))) => session.handle_text(text.as_str()).await,
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => {
                            log!("[ws:{}] WebSocket error: {}", session_id, e);
                            break;
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    session.send(ServerMessage::ShuttingDown {
                        message: "Server is shutting down".to_string(),
                    })
                    .await;
                    break;
                }
            }
        }
    }

    session.close().await;
    drop(session);
    state.tracker.close_session(&session_id).await;
    log!("[ws:{}] Disconnected", session_id);

    if tokio::time::timeout(FLUSH_TIMEOUT, &mut send_task).await.is_err() {
        send_task.abort();
    }
}

/// One player's connection: a game driven by its own ticks plus a save path
/// to the shared leaderboard.
struct GameSession<G: ScoreGateway> {
    session_id: SessionId,
    controller: GameController,
    saver: ScoreSaver<G>,
    leaderboard: LeaderboardService<G>,
    tx: mpsc::Sender<ServerMessage>,
    forward_task: JoinHandle<()>,
}

impl<G: ScoreGateway> GameSession<G> {
    fn new(
        session_id: SessionId,
        settings: &SnakeSettings,
        leaderboard: LeaderboardService<G>,
        tx: mpsc::Sender<ServerMessage>,
    ) -> Self {
        Self::with_rng(session_id, settings, leaderboard, tx, SessionRng::from_random())
    }

    fn with_rng(
        session_id: SessionId,
        settings: &SnakeSettings,
        leaderboard: LeaderboardService<G>,
        tx: mpsc::Sender<ServerMessage>,
        rng: SessionRng,
    ) -> Self {
        let controller = GameController::new(settings.clone(), rng);
        let forward_task = spawn_state_forwarder(&controller, tx.clone());
        Self {
            session_id,
            controller,
            saver: ScoreSaver::new(leaderboard.clone()),
            leaderboard,
            tx,
            forward_task,
        }
    }

    async fn send(&self, message: ServerMessage) {
        send_to_client(&self.tx, message, &self.session_id).await;
    }

    async fn greet(&self) {
        let state = self.controller.get_state();
        self.send(ServerMessage::Hello {
            session_id: self.session_id.to_string(),
            grid_size: state.grid_size,
        })
        .await;
        self.send(ServerMessage::State { state }).await;
        send_leaderboard(&self.leaderboard, &self.tx, &self.session_id).await;
    }

    async fn handle_text(&self, text: &str) {
        let Some(message) = ClientMessage::parse(text) else {
            self.send(ServerMessage::error("Unrecognized message")).await;
            return;
        };

        match message {
            ClientMessage::Key { key } => {
                self.controller.handle_key(&key).await;
            }
            ClientMessage::Start => {
                self.controller.dispatch(Command::Start).await;
            }
            ClientMessage::Save { username } => self.spawn_save(username),
        }
    }

    // Runs off the read loop so input and ticks keep flowing while the store
    // is busy.
    fn spawn_save(&self, username: String) {
        let snapshot = self.controller.get_state();
        let saver = self.saver.clone();
        let leaderboard = self.leaderboard.clone();
        let tx = self.tx.clone();
        let session_id = self.session_id.clone();

        tokio::spawn(async move {
            let reply = saver.save(&snapshot, &username).await;
            let saved = reply.record.is_some();
            send_to_client(
                &tx,
                ServerMessage::SaveResult {
                    result: reply.status,
                    message: reply.message,
                },
                &session_id,
            )
            .await;
            if saved {
                send_leaderboard(&leaderboard, &tx, &session_id).await;
            }
        });
    }

    async fn close(&self) {
        self.controller.shutdown().await;
        self.forward_task.abort();
    }
}

fn spawn_state_forwarder(
    controller: &GameController,
    tx: mpsc::Sender<ServerMessage>,
) -> JoinHandle<()> {
    let mut state_rx = controller.subscribe();
    tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let state = state_rx.borrow_and_update().clone();
            if tx.send(ServerMessage::State { state }).await.is_err() {
                break;
            }
        }
    })
}

async fn send_leaderboard<G: ScoreGateway>(
    leaderboard: &LeaderboardService<G>,
    tx: &mpsc::Sender<ServerMessage>,
    session_id: &SessionId,
) {
    let message = match leaderboard.top().await {
        Ok(records) => ServerMessage::leaderboard(records),
        Err(e) => {
            log!("[ws:{}] Failed to load leaderboard: {}", session_id, e);
            ServerMessage::error(format!("Leaderboard unavailable: {}", e))
        }
    };
    send_to_client(tx, message, session_id).await;
}

async fn send_to_client(
    tx: &mpsc::Sender<ServerMessage>,
    message: ServerMessage,
    session_id: &SessionId,
) {
    if let Err(e) = tx.send(message).await {
        log!("[ws:{}] Failed to send message: {}", session_id, e);
    }
}
