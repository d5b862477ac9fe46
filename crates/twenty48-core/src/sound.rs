//! Sound cues emitted by the session for an audio adapter to play.
//!
//! The engine never produces audio itself; it only says which cue a move
//! deserves and what the cue sounds like.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    /// Tiles slid without merging.
    Move,
    /// At least one merge happened.
    Merge,
    /// The win tile appeared for the first time this game.
    Win,
    /// The move left no legal moves.
    GameOver,
}

/// A single sine tone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration_s: f32,
    pub gain: f32,
    /// Offset from the start of the cue.
    pub delay_ms: u32,
}

const fn tone(frequency_hz: f32, duration_s: f32, gain: f32, delay_ms: u32) -> Tone {
    Tone {
        frequency_hz,
        duration_s,
        gain,
        delay_ms,
    }
}

const MOVE_TONES: [Tone; 1] = [tone(400.0, 0.1, 0.05, 0)];
const MERGE_TONES: [Tone; 1] = [tone(600.0, 0.15, 0.08, 0)];
const GAME_OVER_TONES: [Tone; 1] = [tone(200.0, 0.2, 0.3, 0)];
// C5 D5 E5 G5
const WIN_TONES: [Tone; 4] = [
    tone(523.0, 0.1, 0.15, 0),
    tone(587.0, 0.1, 0.15, 100),
    tone(659.0, 0.1, 0.15, 200),
    tone(784.0, 0.1, 0.15, 300),
];

impl SoundCue {
    pub const ALL: [SoundCue; 4] = [
        SoundCue::Move,
        SoundCue::Merge,
        SoundCue::Win,
        SoundCue::GameOver,
    ];

    pub fn tones(self) -> &'static [Tone] {
        match self {
            SoundCue::Move => &MOVE_TONES,
            SoundCue::Merge => &MERGE_TONES,
            SoundCue::Win => &WIN_TONES,
            SoundCue::GameOver => &GAME_OVER_TONES,
        }
    }
}
