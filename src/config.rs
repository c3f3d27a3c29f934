//! Session tunables, loaded from JSON with defaults for every field.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Tag names looked up in the sprite atlas, one per animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationTags {
    /// Standing still
    pub idle: String,
    /// Walking
    pub run: String,
    /// Jump arc
    pub jump: String,
    /// Shown while falling; Aseprite exports call it `j_down`
    pub fall: String,
    /// Dodge roll
    pub roll: String,
    /// First attack
    pub attack1: String,
    /// Second attack
    pub attack2: String,
    /// Third attack
    pub attack3: String,
}

impl Default for AnimationTags {
    fn default() -> Self {
        Self {
            idle: "idle".to_owned(),
            run: "run".to_owned(),
            jump: "jump".to_owned(),
            fall: "j_down".to_owned(),
            roll: "roll".to_owned(),
            attack1: "1_atk".to_owned(),
            attack2: "2_atk".to_owned(),
            attack3: "3_atk".to_owned(),
        }
    }
}

/// Tunables for one play session. Distances are pixels, steps are pixels
/// per tick, durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Player spawn point `[x, y]`
    pub spawn: [f32; 2],
    /// Horizontal walk speed
    pub move_step: f32,
    /// Horizontal roll speed, added to the walk step
    pub roll_step: f32,
    /// Fall speed while unsupported
    pub gravity_step: f32,
    /// Base duration of one animation frame
    pub frame_ms: f32,
    /// How long a roll keeps its flag
    pub roll_duration_ms: f32,
    /// Time from take-off to landing back on `jump_floor`
    pub jump_duration_ms: f32,
    /// Jump apex above `jump_floor`, in tiles of the level
    pub jump_height_tiles: f32,
    /// Sprite pixels to world pixels
    pub player_scale: f32,
    /// Transparent rows cropped from the bottom of every sprite frame
    pub pixel_trim: f32,
    /// Name of the non-rendered physics layer
    pub collision_layer: String,
    /// Atlas tag names per animation
    pub tags: AnimationTags,
}

const DEFAULT_FRAME_MS: f32 = 83.0;

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            spawn: [220.0, 384.0],
            move_step: 3.0,
            roll_step: 3.0,
            gravity_step: 6.0,
            frame_ms: DEFAULT_FRAME_MS,
            roll_duration_ms: 8.0 * DEFAULT_FRAME_MS,
            jump_duration_ms: 22.0 * DEFAULT_FRAME_MS / 2.0,
            jump_height_tiles: 3.5,
            player_scale: 3.0,
            pixel_trim: 4.0,
            collision_layer: "collision".to_owned(),
            tags: AnimationTags::default(),
        }
    }
}

impl SimConfig {
    /// Parse and validate a config document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|source| LoadError::Json { path: None, source })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let p = path.as_ref();
        let txt = std::fs::read_to_string(p).map_err(|source| LoadError::Io {
            path: p.to_path_buf(),
            source,
        })?;
        let cfg: Self = serde_json::from_str(&txt).map_err(|source| LoadError::Json {
            path: Some(p.to_path_buf()),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Jump apex in pixels for a level with `tile_h`-pixel tiles.
    #[inline]
    pub fn jump_height(&self, tile_h: u32) -> f32 {
        tile_h as f32 * self.jump_height_tiles
    }

    /// Reject non-finite or non-positive durations, heights and scales.
    pub fn validate(&self) -> Result<(), LoadError> {
        let positive = [
            ("frame_ms", self.frame_ms),
            ("roll_duration_ms", self.roll_duration_ms),
            ("jump_duration_ms", self.jump_duration_ms),
            ("jump_height_tiles", self.jump_height_tiles),
            ("player_scale", self.player_scale),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(LoadError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        let finite = [
            ("spawn.x", self.spawn[0]),
            ("spawn.y", self.spawn[1]),
            ("move_step", self.move_step),
            ("roll_step", self.roll_step),
            ("gravity_step", self.gravity_step),
            ("pixel_trim", self.pixel_trim),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(LoadError::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if self.collision_layer.is_empty() {
            return Err(LoadError::InvalidConfig(
                "collision_layer must not be empty".to_owned(),
            ));
        }
        Ok(())
    }
}
