//! twenty48-core: the 2048 board engine.
//!
//! This crate provides:
//! - A `Grid` value type with the pure slide/merge `transition`
//! - `spawn_tile` with an injected RNG, and the `is_terminal` check
//! - `GameSession`, which strings those together into one game with score and
//!   latched win/over flags
//! - `SoundCue`s describing what an audio adapter should play after a move
//!
//! Quick start:
//! ```
//! use twenty48_core::{GameSession, engine::Direction};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut session = GameSession::new(&mut rng);
//! let mut moves = 0u32;
//! while !session.is_over() && moves < 8 {
//!     for d in Direction::ALL {
//!         if session.apply_move(d, &mut rng).moved {
//!             moves += 1;
//!             break;
//!         }
//!     }
//! }
//! assert!(session.score() % 2 == 0);
//! ```
pub mod engine;
pub mod session;
pub mod sound;

pub use session::{GameSession, MoveOutcome, apply_move, new_game};
pub use sound::{SoundCue, Tone};
