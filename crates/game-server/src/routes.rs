use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use twenty48_core::{MoveOutcome, SoundCue, Tone};
use twenty48_core::engine::Direction;

use crate::app::{AppState, GameView};
use crate::store::HistoryEntry;

type ApiError = (StatusCode, String);

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: String,
}

#[derive(Deserialize)]
pub struct MoveRequest {
    direction: Direction,
}

#[derive(Serialize)]
pub(crate) struct MoveResponse {
    outcome: MoveOutcome,
    state: GameView,
    /// Cues are still reported when muted; this tells the client to stay quiet.
    muted: bool,
}

#[derive(Deserialize, Default)]
pub struct HistoryQuery {
    limit: Option<usize>,
}

#[derive(Serialize)]
pub(crate) struct HistoryResponse {
    count: usize,
    games: Vec<HistoryEntry>,
}

/// Tone parameters for one cue, so clients can synthesize what `cues` name.
#[derive(Serialize)]
pub(crate) struct SoundEntry {
    cue: SoundCue,
    tones: &'static [Tone],
}

#[derive(Serialize, Deserialize)]
pub struct Settings {
    muted: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/game", get(get_game))
        .route("/game/new", post(new_game))
        .route("/game/move", post(apply_move))
        .route("/history", get(list_history))
        .route("/settings", get(get_settings).put(put_settings))
        .route("/sounds", get(sounds))
        .with_state(state)
}

fn internal(err: rusqlite::Error) -> ApiError {
    error!(%err, "score store failure");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub(crate) async fn get_game(State(state): State<AppState>) -> Json<GameView> {
    let game = state.game.lock().await;
    Json(game.view())
}

pub(crate) async fn new_game(State(state): State<AppState>) -> Result<Json<GameView>, ApiError> {
    let mut game = state.game.lock().await;
    game.new_game().map_err(internal)?;
    Ok(Json(game.view()))
}

pub(crate) async fn apply_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let mut game = state.game.lock().await;
    let outcome = game.apply_move(req.direction).map_err(internal)?;
    let muted = game.muted().map_err(internal)?;
    Ok(Json(MoveResponse {
        outcome,
        state: game.view(),
        muted,
    }))
}

pub(crate) async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let game = state.game.lock().await;
    let games = game.history(limit).map_err(internal)?;
    Ok(Json(HistoryResponse {
        count: games.len(),
        games,
    }))
}

pub(crate) async fn sounds() -> Json<Vec<SoundEntry>> {
    Json(
        SoundCue::ALL
            .into_iter()
            .map(|cue| SoundEntry {
                cue,
                tones: cue.tones(),
            })
            .collect(),
    )
}

pub(crate) async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<Settings>, ApiError> {
    let game = state.game.lock().await;
    let muted = game.muted().map_err(internal)?;
    Ok(Json(Settings { muted }))
}

pub(crate) async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>, ApiError> {
    let mut game = state.game.lock().await;
    game.set_muted(settings.muted).map_err(internal)?;
    Ok(Json(settings))
}
