use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};
use twenty48_core::engine::{Direction, Grid};
use twenty48_core::{GameSession, MoveOutcome};

use crate::store::{GameRecord, HistoryEntry, ScoreStore};

/// Read-only view of the current game handed to renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameView {
    pub grid: Grid,
    pub score: u64,
    pub best: u64,
    pub won: bool,
    pub over: bool,
    pub moves: u64,
}

/// Owns the single active session together with its RNG and the score store.
///
/// Every input goes through `&mut self`, so moves are applied one at a time
/// and each one sees the grid left by the previous one.
pub struct Game {
    session: GameSession,
    rng: StdRng,
    store: ScoreStore,
    best: u64,
    /// Whether the current session already has a history row.
    archived: bool,
}

impl Game {
    pub fn new(store: ScoreStore, seed: Option<u64>) -> Result<Self, rusqlite::Error> {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let best = store.best_score()?;
        let session = GameSession::new(&mut rng);
        info!(best, seeded = seed.is_some(), "game ready");
        Ok(Self {
            session,
            rng,
            store,
            best,
            archived: false,
        })
    }

    pub fn view(&self) -> GameView {
        GameView {
            grid: *self.session.grid(),
            score: self.session.score(),
            best: self.best,
            won: self.session.is_won(),
            over: self.session.is_over(),
            moves: self.session.moves(),
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Apply one direction, then persist a new best score and, if the game just
    /// ended, its history row.
    pub fn apply_move(&mut self, direction: Direction) -> Result<MoveOutcome, rusqlite::Error> {
        let outcome = self.session.apply_move(direction, &mut self.rng);
        if !outcome.moved {
            debug!(%direction, over = outcome.over, "move rejected");
            return Ok(outcome);
        }
        debug!(%direction, delta = outcome.score_delta, score = self.session.score(), "moved");
        if outcome.newly_won {
            info!(score = self.session.score(), "reached the win tile");
        }
        if self.session.score() > self.best && self.store.record_score(self.session.score())? {
            self.best = self.session.score();
        }
        if outcome.over {
            info!(score = self.session.score(), moves = self.session.moves(), "game over");
            self.archive()?;
        }
        Ok(outcome)
    }

    /// Replace the session with a fresh one. A game with at least one move
    /// that was not recorded yet is archived first.
    pub fn new_game(&mut self) -> Result<(), rusqlite::Error> {
        if self.session.moves() > 0 && !self.archived {
            info!(score = self.session.score(), "abandoning game");
            self.archive()?;
        }
        self.session = GameSession::new(&mut self.rng);
        self.archived = false;
        Ok(())
    }

    fn archive(&mut self) -> Result<(), rusqlite::Error> {
        if self.archived {
            return Ok(());
        }
        let record = GameRecord {
            score: self.session.score(),
            highest_tile: self.session.grid().highest_tile(),
            moves: self.session.moves(),
            won: self.session.is_won(),
            finished_at: unix_now(),
        };
        self.store.append_history(record)?;
        self.archived = true;
        Ok(())
    }

    pub fn history(&self, limit: usize) -> Result<Vec<HistoryEntry>, rusqlite::Error> {
        self.store.history(limit)
    }

    pub fn muted(&self) -> Result<bool, rusqlite::Error> {
        self.store.muted()
    }

    pub fn set_muted(&mut self, muted: bool) -> Result<(), rusqlite::Error> {
        self.store.set_muted(muted)
    }

    #[cfg(test)]
    pub(crate) fn replace_session(&mut self, session: GameSession) {
        self.session = session;
        self.archived = false;
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Shared handle for the HTTP handlers; the mutex serializes all input.
#[derive(Clone)]
pub struct AppState {
    pub game: Arc<Mutex<Game>>,
}

impl AppState {
    pub fn new(game: Game) -> Self {
        Self {
            game: Arc::new(Mutex::new(game)),
        }
    }
}
