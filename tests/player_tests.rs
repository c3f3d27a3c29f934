// tests/player_tests.rs

use macroquad::prelude::vec2;
use macroquad_tiled_platformer::{
    CollisionProbe, Facing, Intents, IrLayer, Level, Player, PlayerState, PlayerStateMachine, SimConfig, TileGrid,
};

const TICK_MS: f64 = 16.0;

fn open_level() -> TileGrid {
    let level = Level {
        width: 4,
        height: 4,
        tile_w: 64,
        tile_h: 64,
        tilesets: vec![],
        layers: vec![IrLayer::tiles("ground", 4, 4, vec![0; 16])],
    };
    TileGrid::from_level(level, "collision").expect("valid level")
}

/// 10x4 grid of 32px tiles with a solid floor on the bottom row (top at y=96).
fn floored_level() -> TileGrid {
    let mut data = vec![0; 40];
    data[30..].fill(1);
    let level = Level {
        width: 10,
        height: 4,
        tile_w: 32,
        tile_h: 32,
        tilesets: vec![],
        layers: vec![IrLayer::tiles("collision", 10, 4, data)],
    };
    TileGrid::from_level(level, "collision").expect("valid level")
}

#[test]
fn holding_right_moves_by_fixed_step() {
    let grid = open_level();
    let probe = CollisionProbe::new(&grid);
    let cfg = SimConfig::default();
    let machine = PlayerStateMachine::new(&cfg, grid.tile_h);
    let right = Intents { right: true, ..Default::default() };

    let mut p = Player::spawn(vec2(100.0, 200.0), 0.0);
    machine.tick(&mut p, &right, &probe, TICK_MS);
    assert!(p.state.contains(PlayerState::MOVE));
    assert_eq!(p.facing, Facing::Normal);
    assert_eq!(p.animation_start_ms, TICK_MS);

    for i in 2..=10 {
        machine.tick(&mut p, &right, &probe, i as f64 * TICK_MS);
    }
    assert_eq!(p.pos.x, 100.0 + 10.0 * cfg.move_step);
    assert_eq!(p.animation_start_ms, TICK_MS, "held direction never resets the clock");

    machine.tick(&mut p, &Intents::default(), &probe, 11.0 * TICK_MS);
    assert!(!p.state.contains(PlayerState::MOVE));
    assert_eq!(p.pos.x, 100.0 + 10.0 * cfg.move_step);
}

#[test]
fn roll_moves_until_duration_then_clears() {
    let grid = open_level();
    let probe = CollisionProbe::new(&grid);
    let cfg = SimConfig::default();
    let machine = PlayerStateMachine::new(&cfg, grid.tile_h);
    let roll_left = Intents { down: true, left: true, ..Default::default() };

    let mut p = Player::spawn(vec2(500.0, 200.0), 0.0);
    let mut now = 0.0;
    machine.tick(&mut p, &roll_left, &probe, now);
    assert!(p.state.contains(PlayerState::ROLL));
    assert_eq!(p.facing, Facing::Reversed);
    assert_eq!(p.pos.x, 500.0 - cfg.roll_step);

    let mut x = p.pos.x;
    loop {
        now += TICK_MS;
        machine.tick(&mut p, &roll_left, &probe, now);
        if !p.state.contains(PlayerState::ROLL) {
            break;
        }
        assert_eq!(p.pos.x, x - cfg.roll_step, "roll step only, not roll + move");
        x = p.pos.x;
    }

    assert!(now as f32 >= cfg.roll_duration_ms);
    assert!(((now - TICK_MS) as f32) < cfg.roll_duration_ms);
    assert_eq!(p.pos.x, x, "no displacement on the tick the roll ends");
}

#[test]
fn roll_alias_intent_starts_roll() {
    let machine = PlayerStateMachine::new(&SimConfig::default(), 64);
    let mut p = Player::spawn(vec2(0.0, 0.0), 0.0);
    machine.apply_intents(&mut p, &Intents { roll: true, right: true, ..Default::default() }, 5.0);
    assert!(p.state.contains(PlayerState::ROLL));

    let mut q = Player::spawn(vec2(0.0, 0.0), 0.0);
    machine.apply_intents(&mut q, &Intents { roll: true, ..Default::default() }, 5.0);
    assert!(!q.state.contains(PlayerState::ROLL), "roll needs a direction");
}

#[test]
fn falls_by_gravity_and_lands_on_row_top() {
    let grid = floored_level();
    let probe = CollisionProbe::new(&grid);
    let cfg = SimConfig::default();
    let machine = PlayerStateMachine::new(&cfg, grid.tile_h);

    let mut p = Player::spawn(vec2(100.0, 20.0), 0.0);
    machine.tick(&mut p, &Intents::default(), &probe, TICK_MS);
    assert!(p.state.contains(PlayerState::FALL));
    assert_eq!(p.pos.y, 20.0 + cfg.gravity_step);

    let mut now = TICK_MS;
    while p.state.contains(PlayerState::FALL) {
        now += TICK_MS;
        assert!(now < 10_000.0, "never landed");
        machine.tick(&mut p, &Intents::default(), &probe, now);
        assert!(p.state.is_consistent());
    }

    assert_eq!(p.pos.y, 96.0);
    assert_eq!(p.jump_floor, 96.0);

    machine.tick(&mut p, &Intents::default(), &probe, now + TICK_MS);
    assert!(!p.state.contains(PlayerState::FALL), "resting on the floor");
    assert_eq!(p.pos.y, 96.0);
}

#[test]
fn jump_follows_arc_and_lands_on_floor() {
    let grid = floored_level();
    let probe = CollisionProbe::new(&grid);
    let cfg = SimConfig::default();
    let machine = PlayerStateMachine::new(&cfg, grid.tile_h);
    let jump = Intents { jump: true, ..Default::default() };

    let mut p = Player::spawn(vec2(100.0, 96.0), 0.0);
    // arm the latch, then press
    machine.tick(&mut p, &Intents::default(), &probe, TICK_MS);
    machine.tick(&mut p, &jump, &probe, 2.0 * TICK_MS);
    assert!(p.state.contains(PlayerState::JUMP));
    assert!(p.going_up);

    let mut now = 2.0 * TICK_MS;
    let mut apex = p.pos.y;
    let mut saw_descent = false;
    while p.state.contains(PlayerState::JUMP) {
        now += TICK_MS;
        assert!(now < 5_000.0, "never landed");
        machine.tick(&mut p, &Intents::default(), &probe, now);
        assert!(!p.state.contains(PlayerState::FALL));
        apex = apex.min(p.pos.y);
        saw_descent |= !p.going_up;
    }

    assert!(saw_descent);
    assert!(96.0 - apex > machine.jump_height() * 0.95, "apex {apex}");
    assert!(96.0 - apex <= machine.jump_height() + 1e-3);
    assert_eq!(p.pos.y, 96.0);
    assert_eq!(p.jump_floor, 96.0);
    assert!(p.going_up, "landing re-arms ascent");
}

#[test]
fn jump_without_collision_returns_to_floor() {
    let grid = open_level();
    let probe = CollisionProbe::new(&grid);
    let cfg = SimConfig::default();
    let machine = PlayerStateMachine::new(&cfg, grid.tile_h);

    let mut p = Player::spawn(vec2(0.0, 300.0), 0.0);
    p.jump_reset = true;
    machine.tick(&mut p, &Intents { jump: true, ..Default::default() }, &probe, 0.0);
    assert!(p.state.contains(PlayerState::JUMP));

    machine.tick(&mut p, &Intents::default(), &probe, 456.5);
    assert!((300.0 - p.pos.y - machine.jump_height()).abs() < 1e-2);

    machine.tick(&mut p, &Intents::default(), &probe, f64::from(cfg.jump_duration_ms) + 1.0);
    assert!(!p.state.contains(PlayerState::JUMP));
    assert_eq!(p.pos.y, 300.0);
}
