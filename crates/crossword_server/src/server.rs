//! REST API over the session manager.

use crate::config::{CorsConfig, ServerConfig};
use crate::error::GameError;
use crate::session::{AttemptOutcome, CreatedGame, GameView, JoinedGame, SessionManager};
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Request for creating a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    /// Creator's display name.
    pub player_name: String,
    /// Words to place. Defaults to the generator's setting.
    #[serde(default)]
    pub word_count: Option<usize>,
}

/// Request for joining a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameRequest {
    /// Session to join.
    pub game_id: String,
    /// Display name.
    pub player_name: String,
}

/// Request naming a player in a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRequest {
    /// Session ID.
    pub game_id: String,
    /// Player ID.
    pub player_id: String,
}

/// Request for guessing a word.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptWordRequest {
    /// Session ID.
    pub game_id: String,
    /// Player ID.
    pub player_id: String,
    /// Placement-order id of the word.
    pub word_id: u32,
    /// The guess.
    pub attempt: String,
}

/// JSON body of a rejected request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub error: String,
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = match &self {
            e if e.is_not_found() => StatusCode::NOT_FOUND,
            GameError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            debug!(error = %self, %status, "Request rejected");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// JSON body extractor whose rejections use the `{error}` body with 400.
#[derive(Debug, Clone)]
struct ApiJson<T>(T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorBody>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(error = %rejection.body_text(), "Malformed request body");
                Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorBody {
                        error: rejection.body_text(),
                    }),
                ))
            }
        }
    }
}

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    sessions: SessionManager,
}

/// Builds the API router with the given cross-origin policy.
#[instrument(skip(sessions, cors))]
pub fn router(sessions: SessionManager, cors: &CorsConfig) -> Router {
    info!("Building game router");
    Router::new()
        .route("/health", get(health))
        .route("/game/create", post(create_game))
        .route("/game/join", post(join_game))
        .route("/game/toggle-ready", post(toggle_ready))
        .route("/game/start", post(start_game))
        .route("/game/attempt", post(attempt_word))
        .route("/game/pass", post(pass_turn))
        .route("/game/{game_id}", get(get_game))
        .layer(cors.layer())
        .layer(middleware::from_fn(log_requests))
        .with_state(AppState { sessions })
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;
    info!(%method, %uri, status = %response.status(), "Request handled");
    response
}

async fn health() -> &'static str {
    "ok"
}

#[instrument(skip(state, req), fields(player_name = %req.player_name))]
async fn create_game(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateGameRequest>,
) -> Result<Json<CreatedGame>, GameError> {
    let created = state
        .sessions
        .create_game(&req.player_name, req.word_count)?;
    Ok(Json(created))
}

#[instrument(skip(state, req), fields(game_id = %req.game_id, player_name = %req.player_name))]
async fn join_game(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<JoinGameRequest>,
) -> Result<Json<JoinedGame>, GameError> {
    let joined = state.sessions.join_game(&req.game_id, &req.player_name)?;
    Ok(Json(joined))
}

#[instrument(skip(state, req), fields(game_id = %req.game_id, player_id = %req.player_id))]
async fn toggle_ready(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PlayerRequest>,
) -> Result<Json<GameView>, GameError> {
    let game = state.sessions.toggle_ready(&req.game_id, &req.player_id)?;
    Ok(Json(game))
}

#[instrument(skip(state, req), fields(game_id = %req.game_id, player_id = %req.player_id))]
async fn start_game(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PlayerRequest>,
) -> Result<Json<GameView>, GameError> {
    let game = state.sessions.start_game(&req.game_id, &req.player_id)?;
    Ok(Json(game))
}

#[instrument(
    skip(state, req),
    fields(game_id = %req.game_id, player_id = %req.player_id, word_id = req.word_id)
)]
async fn attempt_word(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AttemptWordRequest>,
) -> Result<Json<AttemptOutcome>, GameError> {
    let outcome =
        state
            .sessions
            .attempt_word(&req.game_id, &req.player_id, req.word_id, &req.attempt)?;
    Ok(Json(outcome))
}

#[instrument(skip(state, req), fields(game_id = %req.game_id, player_id = %req.player_id))]
async fn pass_turn(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PlayerRequest>,
) -> Result<Json<GameView>, GameError> {
    let game = state.sessions.pass_turn(&req.game_id, &req.player_id)?;
    Ok(Json(game))
}

#[instrument(skip(state))]
async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<GameView>, GameError> {
    let game = state.sessions.get_game(&game_id)?;
    Ok(Json(game))
}

/// Periodically drops idle sessions.
fn spawn_eviction(sessions: SessionManager, ttl: Duration) -> tokio::task::JoinHandle<()> {
    let period = (ttl / 2).max(Duration::from_secs(1));
    info!(ttl_secs = ttl.as_secs(), period_secs = period.as_secs(), "Session eviction enabled");
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            sessions.evict_idle(ttl);
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Runs the HTTP server until Ctrl+C.
#[instrument(skip(config), fields(host = %config.host(), port = config.port()))]
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let sessions = config.session_manager()?;

    let eviction = config
        .session_ttl()
        .map(|ttl| spawn_eviction(sessions.clone(), ttl));

    let app = router(sessions, config.cors());
    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!("Server ready at http://{}:{}/", config.host(), config.port());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(eviction) = eviction {
        eviction.abort();
    }
    info!("Server stopped");
    Ok(())
}
