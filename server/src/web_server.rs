use std::future::Future;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use common::games::snake::SnakeSettings;
use common::leaderboard::{LeaderboardError, LeaderboardService, ScoreGateway};
use common::log;

use crate::connection_tracker::ConnectionTracker;
use crate::ws_handler::handle_websocket;

pub struct WebServerState<G: ScoreGateway> {
    pub leaderboard: LeaderboardService<G>,
    pub tracker: ConnectionTracker,
    pub game_settings: Arc<SnakeSettings>,
}

impl<G: ScoreGateway> Clone for WebServerState<G> {
    fn clone(&self) -> Self {
        Self {
            leaderboard: self.leaderboard.clone(),
            tracker: self.tracker.clone(),
            game_settings: self.game_settings.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewScore {
    pub username: String,
    pub score: u32,
}

pub fn build_router<G: ScoreGateway>(
    state: WebServerState<G>,
    static_files_path: Option<&str>,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/ws", get(ws_upgrade_handler::<G>))
        .route("/api/leaderboard", get(leaderboard_handler::<G>))
        .route("/api/scores", post(create_score_handler::<G>))
        .route("/api/scores/{username}", get(find_score_handler::<G>));

    if let Some(path) = static_files_path {
        app = app.nest_service("/ui", ServeDir::new(path));
    }

    app.layer(cors).with_state(state)
}

pub async fn run_web_server<G: ScoreGateway>(
    state: WebServerState<G>,
    bind_address: &str,
    static_files_path: Option<&str>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let app = build_router(state, static_files_path);

    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    log!("Web server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn ws_upgrade_handler<G: ScoreGateway>(
    ws: WebSocketUpgrade,
    State(state): State<WebServerState<G>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn leaderboard_error_response(e: LeaderboardError) -> Response {
    let status = match &e {
        LeaderboardError::InvalidUsername(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LeaderboardError::DuplicateUsername(_) => StatusCode::CONFLICT,
        LeaderboardError::Gateway(err) => {
            log!("Score store request failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(status, e.to_string())
}

async fn leaderboard_handler<G: ScoreGateway>(
    State(state): State<WebServerState<G>>,
) -> Response {
    match state.leaderboard.top().await {
        Ok(records) => Json(records).into_response(),
        Err(e) => leaderboard_error_response(e),
    }
}

async fn find_score_handler<G: ScoreGateway>(
    State(state): State<WebServerState<G>>,
    Path(username): Path<String>,
) -> Response {
    match state.leaderboard.find(&username).await {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, format!("No score for '{}'", username)),
        Err(e) => leaderboard_error_response(e),
    }
}

async fn create_score_handler<G: ScoreGateway>(
    State(state): State<WebServerState<G>>,
    Json(body): Json<NewScore>,
) -> Response {
    match state.leaderboard.save_score(&body.username, body.score).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => leaderboard_error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use common::leaderboard::{InMemoryScoreStore, ScoreRecord};

    fn state() -> WebServerState<InMemoryScoreStore> {
        WebServerState {
            leaderboard: LeaderboardService::new(InMemoryScoreStore::default(), 3),
            tracker: ConnectionTracker::new(),
            game_settings: Arc::new(SnakeSettings::default()),
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn post_score(
        state: &WebServerState<InMemoryScoreStore>,
        username: &str,
        score: u32,
    ) -> Response {
        create_score_handler(
            State(state.clone()),
            Json(NewScore {
                username: username.to_string(),
                score,
            }),
        )
        .await
    }

    #[tokio::test]
    async fn test_create_score_returns_created() {
        let state = state();
        let response = post_score(&state, " Alice ", 42).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let record: ScoreRecord = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(record.username.as_str(), "Alice");
        assert_eq!(record.score, 42);
    }

    #[tokio::test]
    async fn test_create_score_status_codes() {
        let state = state();
        post_score(&state, "Alice", 1).await;

        assert_eq!(post_score(&state, "Alice", 5).await.status(), StatusCode::CONFLICT);
        assert_eq!(
            post_score(&state, "  ", 5).await.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn test_leaderboard_is_ranked_and_limited() {
        let state = state();
        for (name, score) in [("a", 10), ("b", 40), ("c", 20), ("d", 30)] {
            post_score(&state, name, score).await;
        }

        let response = leaderboard_handler(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let records: Vec<ScoreRecord> = serde_json::from_value(body_json(response).await).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(names, vec!["b", "d", "c"]);
    }

    #[tokio::test]
    async fn test_find_score() {
        let state = state();
        post_score(&state, "Alice", 7).await;

        let found = find_score_handler(State(state.clone()), Path("Alice".to_string())).await;
        assert_eq!(found.status(), StatusCode::OK);
        assert_eq!(body_json(found).await["score"], 7);

        let missing = find_score_handler(State(state.clone()), Path("Bob".to_string())).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_router_builds_with_and_without_static_files() {
        let _ = build_router(state(), None);
        let _ = build_router(state(), Some("web"));
    }
}
