//! Engine module: the 4x4 grid, the slide/merge transition, tile spawning
//! and the terminal-state check.
//!
//! - `Grid` is the board value with convenience methods.
//! - Free functions mirror the methods when convenient (e.g., `transition`).
//! - Everything here is pure except `spawn_tile`, which takes the RNG it uses.

mod ops;
pub mod state;

pub use state::{Direction, Grid, GridError, MAX_TILE, ParseDirectionError, SIZE, WIN_TILE};

pub use ops::{
    Transition, can_move, count_empty, highest_tile, is_terminal, legal_moves, spawn_tile,
    tile_sum, transition,
};
