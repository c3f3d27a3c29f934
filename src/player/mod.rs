//! The player character: state flags, facing, and the per-tick state machine.

mod input;
pub mod jump;
mod machine;

use bitflags::bitflags;
use macroquad::prelude::Vec2;

pub use input::Intents;
pub use machine::PlayerStateMachine;

bitflags! {
    /// Independently combinable character state flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PlayerState: u8 {
        /// Nothing else going on
        const IDLE    = 0b0000_0001;
        /// Walking
        const MOVE    = 0b0000_0010;
        /// On the jump arc; never set with `FALL`
        const JUMP    = 0b0000_0100;
        /// Unsupported and not jumping
        const FALL    = 0b0000_1000;
        /// Rolling
        const ROLL    = 0b0001_0000;
        /// First attack
        const ATTACK1 = 0b0010_0000;
        /// Second attack
        const ATTACK2 = 0b0100_0000;
        /// Third attack
        const ATTACK3 = 0b1000_0000;
    }
}

impl PlayerState {
    /// Airborne flags are mutually exclusive.
    #[inline]
    pub fn is_consistent(self) -> bool {
        !self.contains(Self::JUMP | Self::FALL)
    }
}

/// Horizontal sprite orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    /// Facing right
    #[default]
    Normal,
    /// Facing left
    Reversed,
}

impl Facing {
    /// +1 for normal (right), -1 for reversed (left).
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Normal => 1.0,
            Facing::Reversed => -1.0,
        }
    }
}

/// The single player-controlled character.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Feet position in world pixels, y grows downward
    pub pos: Vec2,
    /// Active flags
    pub state: PlayerState,
    /// Sprite orientation
    pub facing: Facing,
    /// y the current jump departs from and returns to
    pub jump_floor: f32,
    /// Sign of the current jump velocity, true while ascending
    pub going_up: bool,
    /// Debounce latch: a held jump key never re-triggers a jump
    pub jump_reset: bool,
    /// Shared clock anchor for state durations (jump arc, roll) and
    /// animation frames. Both must read the same value or the jump
    /// height and the jump animation drift apart.
    pub animation_start_ms: f64,
}

impl Player {
    /// Idle player standing at `pos`, clock anchored at `now_ms`.
    pub fn spawn(pos: Vec2, now_ms: f64) -> Self {
        Self {
            pos,
            state: PlayerState::IDLE,
            facing: Facing::Normal,
            jump_floor: pos.y,
            going_up: true,
            jump_reset: false,
            animation_start_ms: now_ms,
        }
    }

    /// Milliseconds since the shared clock was last reset, never negative.
    #[inline]
    pub fn elapsed_ms(&self, now_ms: f64) -> f32 {
        (now_ms - self.animation_start_ms).max(0.0) as f32
    }

    #[inline]
    pub(crate) fn reset_clock(&mut self, now_ms: f64) {
        self.animation_start_ms = now_ms;
    }
}
