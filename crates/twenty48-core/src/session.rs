use rand::Rng;
use serde::Serialize;

use crate::engine::{self, Direction, Grid};
use crate::sound::SoundCue;

/// One game: grid, running score and the latched `won`/`over` flags.
///
/// A session is replaced wholesale on new game; nothing resets it in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSession {
    grid: Grid,
    score: u64,
    won: bool,
    over: bool,
    moves: u64,
}

/// What a call to [`GameSession::apply_move`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub moved: bool,
    pub score_delta: u64,
    /// Session flag after the move (latched).
    pub won: bool,
    /// Session flag after the move (latched).
    pub over: bool,
    /// True only on the move that first latched `won`.
    pub newly_won: bool,
    pub cues: Vec<SoundCue>,
}

impl GameSession {
    /// Fresh session: two spawned tiles, score 0, flags cleared.
    ///
    /// ```
    /// use twenty48_core::GameSession;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let s = GameSession::new(&mut rng);
    /// assert_eq!(s.grid().count_empty(), 14);
    /// assert_eq!(s.score(), 0);
    /// assert!(!s.is_over() && !s.is_won());
    /// ```
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut grid = Grid::EMPTY;
        engine::spawn_tile(&mut grid, rng);
        engine::spawn_tile(&mut grid, rng);
        Self {
            grid,
            score: 0,
            won: false,
            over: false,
            moves: 0,
        }
    }

    /// Rebuild a session from a known grid; `over` is derived from the grid.
    pub fn from_parts(grid: Grid, score: u64, won: bool) -> Self {
        Self {
            grid,
            score,
            won,
            over: grid.is_terminal(),
            moves: 0,
        }
    }

    /// Apply one direction input.
    ///
    /// Input on a finished game, or a direction that changes nothing, leaves
    /// the session untouched and reports `moved = false`. Otherwise the new
    /// grid is installed, the score grows by the merge total, one tile is
    /// spawned and the terminal check runs.
    ///
    /// ```
    /// use twenty48_core::{GameSession, engine::{Direction, Grid}};
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let grid = Grid::new([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
    /// let mut s = GameSession::from_parts(grid, 0, false);
    /// let out = s.apply_move(Direction::Left, &mut rng);
    /// assert!(out.moved);
    /// assert_eq!(out.score_delta, 4);
    /// assert_eq!(s.score(), 4);
    /// ```
    pub fn apply_move<R: Rng + ?Sized>(
        &mut self,
        direction: Direction,
        rng: &mut R,
    ) -> MoveOutcome {
        if self.over {
            return self.rejected();
        }
        let t = engine::transition(self.grid, direction);
        if !t.moved {
            return self.rejected();
        }

        self.grid = t.grid;
        self.score += t.score_delta;
        let newly_won = t.merged_win && !self.won;
        self.won |= t.merged_win;
        engine::spawn_tile(&mut self.grid, rng);
        self.moves += 1;
        self.over = engine::is_terminal(&self.grid);

        let mut cues = Vec::with_capacity(3);
        cues.push(if t.score_delta > 0 {
            SoundCue::Merge
        } else {
            SoundCue::Move
        });
        if newly_won {
            cues.push(SoundCue::Win);
        }
        if self.over {
            cues.push(SoundCue::GameOver);
        }

        MoveOutcome {
            moved: true,
            score_delta: t.score_delta,
            won: self.won,
            over: self.over,
            newly_won,
            cues,
        }
    }

    fn rejected(&self) -> MoveOutcome {
        MoveOutcome {
            moved: false,
            score_delta: 0,
            won: self.won,
            over: self.over,
            newly_won: false,
            cues: Vec::new(),
        }
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Number of accepted moves.
    #[inline]
    pub fn moves(&self) -> u64 {
        self.moves
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.over
    }

    #[inline]
    pub fn is_won(&self) -> bool {
        self.won
    }
}

/// Start a new game; same as [`GameSession::new`].
pub fn new_game<R: Rng + ?Sized>(rng: &mut R) -> GameSession {
    GameSession::new(rng)
}

/// Free-function form of [`GameSession::apply_move`].
pub fn apply_move<R: Rng + ?Sized>(
    session: &mut GameSession,
    direction: Direction,
    rng: &mut R,
) -> MoveOutcome {
    session.apply_move(direction, rng)
}
