use tracing::debug;

use super::{jump, Facing, Intents, Player, PlayerState};
use crate::config::SimConfig;
use crate::spatial::CollisionProbe;

/// Turns intents into player state, then moves the player against the
/// collision grid.
///
/// Intents are evaluated per control axis in a fixed order (jump, roll,
/// horizontal move, attacks) and only act on edges: a flag is set or cleared
/// when the intent disagrees with the current state, never re-applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStateMachine {
    move_step: f32,
    roll_step: f32,
    gravity_step: f32,
    roll_duration_ms: f32,
    jump_duration_ms: f32,
    jump_height: f32,
}

impl PlayerStateMachine {
    /// Snapshot the tunables; `tile_h` scales the jump height.
    pub fn new(cfg: &SimConfig, tile_h: u32) -> Self {
        Self {
            move_step: cfg.move_step,
            roll_step: cfg.roll_step,
            gravity_step: cfg.gravity_step,
            roll_duration_ms: cfg.roll_duration_ms,
            jump_duration_ms: cfg.jump_duration_ms,
            jump_height: cfg.jump_height(tile_h),
        }
    }

    /// Jump apex in pixels.
    #[inline]
    pub fn jump_height(&self) -> f32 {
        self.jump_height
    }

    /// Take-off to landing, in milliseconds.
    #[inline]
    pub fn jump_duration_ms(&self) -> f32 {
        self.jump_duration_ms
    }

    /// Advance `player` by one tick.
    pub fn tick(&self, player: &mut Player, intents: &Intents, probe: &CollisionProbe<'_>, now_ms: f64) {
        let before = player.state;

        self.apply_intents(player, intents, now_ms);
        self.resolve_physics(player, probe, now_ms);

        debug_assert!(
            player.state.is_consistent(),
            "JUMP and FALL set together: {:?}",
            player.state
        );
        if player.state != before {
            debug!(from = ?before, to = ?player.state, x = player.pos.x, y = player.pos.y, "player_state_changed");
        }
    }

    /// First half of a tick: flag transitions from input edges, in the order
    /// jump, roll, move, attacks.
    pub fn apply_intents(&self, player: &mut Player, intents: &Intents, now_ms: f64) {
        Self::apply_jump_intent(player, intents.jump, now_ms);
        Self::apply_roll_intent(player, intents, now_ms);
        Self::apply_move_intent(player, intents.left, intents.right, now_ms);
        Self::apply_attack_intent(player, PlayerState::ATTACK1, intents.attack1, now_ms);
        Self::apply_attack_intent(player, PlayerState::ATTACK2, intents.attack2, now_ms);
        Self::apply_attack_intent(player, PlayerState::ATTACK3, intents.attack3, now_ms);
    }

    /// Take off when the key is held, re-armed and the player is grounded.
    /// Releasing the key re-arms only once the current jump is over.
    fn apply_jump_intent(player: &mut Player, held: bool, now_ms: f64) {
        let airborne = player.state.intersects(PlayerState::JUMP | PlayerState::FALL);
        if held {
            if player.jump_reset && !airborne {
                player.state.insert(PlayerState::JUMP);
                player.reset_clock(now_ms);
                player.jump_reset = false;
            }
        } else if !player.state.contains(PlayerState::JUMP) {
            player.jump_reset = true;
        }
    }

    /// A roll started mid-jump keeps the jump's clock so the arc and its
    /// animation stay in step.
    fn apply_roll_intent(player: &mut Player, intents: &Intents, now_ms: f64) {
        if intents.wants_roll() && !player.state.contains(PlayerState::ROLL) {
            player.state.insert(PlayerState::ROLL);
            if !player.state.contains(PlayerState::JUMP) {
                player.reset_clock(now_ms);
            }
        }
    }

    fn apply_move_intent(player: &mut Player, left: bool, right: bool, now_ms: f64) {
        let keeps_clock = player.state.intersects(PlayerState::JUMP | PlayerState::ROLL);
        let changed = match (left, right) {
            (true, true) | (false, false) => {
                let was_moving = player.state.contains(PlayerState::MOVE);
                player.state.remove(PlayerState::MOVE);
                was_moving
            }
            (false, true) => Self::start_move(player, Facing::Normal),
            (true, false) => Self::start_move(player, Facing::Reversed),
        };
        if changed && !keeps_clock {
            player.reset_clock(now_ms);
        }
    }

    fn start_move(player: &mut Player, facing: Facing) -> bool {
        if player.state.contains(PlayerState::MOVE) && player.facing == facing {
            return false;
        }
        player.state.insert(PlayerState::MOVE);
        player.facing = facing;
        true
    }

    /// Attack flags mirror their intent.
    fn apply_attack_intent(player: &mut Player, flag: PlayerState, held: bool, now_ms: f64) {
        if player.state.contains(flag) == held {
            return;
        }
        player.state.set(flag, held);
        if !player.state.contains(PlayerState::JUMP) {
            player.reset_clock(now_ms);
        }
    }

    /// Second half of a tick: jump arc, horizontal motion, then gravity.
    pub fn resolve_physics(&self, player: &mut Player, probe: &CollisionProbe<'_>, now_ms: f64) {
        self.resolve_jump(player, probe, now_ms);
        self.resolve_horizontal(player, now_ms);
        self.resolve_fall(player, probe, now_ms);
    }

    fn resolve_jump(&self, player: &mut Player, probe: &CollisionProbe<'_>, now_ms: f64) {
        if !player.state.contains(PlayerState::JUMP) {
            return;
        }

        let elapsed = player.elapsed_ms(now_ms);
        let previous_y = player.pos.y;
        let new_y = player.jump_floor - jump::height(elapsed, self.jump_height, self.jump_duration_ms);
        player.pos.y = new_y;
        // Ascending means y shrinks; a flat sample (take-off tick) still counts.
        player.going_up = new_y <= previous_y;

        if probe.has_grid() {
            let feet_y = new_y + probe.tile_h() / 2.0;
            if !player.going_up && probe.is_solid(player.pos.x, feet_y) {
                player.pos.y = probe.row_top(feet_y);
                Self::land(player);
            }
        } else if elapsed >= self.jump_duration_ms {
            player.pos.y = player.jump_floor;
            Self::land(player);
        }
    }

    fn land(player: &mut Player) {
        player.jump_floor = player.pos.y;
        player.state.remove(PlayerState::JUMP);
        player.going_up = true;
    }

    fn resolve_horizontal(&self, player: &mut Player, now_ms: f64) {
        if player.state.contains(PlayerState::ROLL) {
            if player.elapsed_ms(now_ms) < self.roll_duration_ms {
                player.pos.x += self.roll_step * player.facing.sign();
            } else {
                player.state.remove(PlayerState::ROLL);
            }
        } else if player.state.contains(PlayerState::MOVE) {
            player.pos.x += self.move_step * player.facing.sign();
        }
    }

    /// Gravity only exists where there is ground to land on.
    fn resolve_fall(&self, player: &mut Player, probe: &CollisionProbe<'_>, now_ms: f64) {
        if !probe.has_grid() {
            return;
        }

        let supported = probe.is_solid(player.pos.x, player.pos.y + 1.0);
        if !supported && !player.state.intersects(PlayerState::JUMP | PlayerState::FALL) {
            player.state.insert(PlayerState::FALL);
            player.reset_clock(now_ms);
        }

        if player.state.contains(PlayerState::FALL) {
            player.pos.y += self.gravity_step;
            if probe.is_solid(player.pos.x, player.pos.y) {
                player.pos.y = probe.row_top(player.pos.y);
                player.jump_floor = player.pos.y;
                player.state.remove(PlayerState::FALL);
            }
        }
    }
}
