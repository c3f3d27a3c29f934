use std::collections::HashSet;

use macroquad::prelude::vec2;
use tracing::{info, warn};

use crate::animation::{AnimTag, AnimationResolver, SpriteFrame};
use crate::config::SimConfig;
use crate::error::{ConfigIssue, LoadError};
use crate::ir_map::{Level, SpriteAtlas};
use crate::map::TileGrid;
use crate::player::{Intents, Player, PlayerStateMachine};
use crate::render::batch::PlayerSprite;
use crate::render::{
    build_static, write_player_quad, Frame, Rasterizer, StaticGeometry, TextureId, TextureTable, Vertex,
};
use crate::spatial::CollisionProbe;

/// Owns one play session: the level, the atlas, the player and the
/// geometry handed to the rasterizer.
///
/// Drive it with one [`Simulation::tick`] per displayed frame. Nothing in a
/// tick blocks; all loading happens before construction.
pub struct Simulation {
    grid: TileGrid,
    atlas: SpriteAtlas,
    machine: PlayerStateMachine,
    resolver: AnimationResolver,
    geometry: StaticGeometry,
    player: Player,
    sprite: SpriteFrame,
    player_vertices: [Vertex; 6],
    player_sprite: PlayerSprite,
    player_texture: Option<TextureId>,
    pending: Vec<ConfigIssue>,
    reported: HashSet<ConfigIssue>,
}

impl Simulation {
    /// Validate `level` against `config` and build a session from it.
    pub fn from_level(
        config: &SimConfig,
        level: Level,
        atlas: SpriteAtlas,
        textures: &TextureTable,
        now_ms: f64,
    ) -> Result<Self, LoadError> {
        let grid = TileGrid::from_level(level, &config.collision_layer)?;
        Self::new(config, grid, atlas, textures, now_ms)
    }

    /// Start a session on an already validated grid.
    ///
    /// Builds the static geometry once and spawns the player at
    /// `config.spawn`. Fails on a bad config or an atlas without a size.
    pub fn new(
        config: &SimConfig,
        grid: TileGrid,
        atlas: SpriteAtlas,
        textures: &TextureTable,
        now_ms: f64,
    ) -> Result<Self, LoadError> {
        config.validate()?;
        if atlas.image_w == 0 || atlas.image_h == 0 {
            return Err(LoadError::InvalidAtlas(format!(
                "atlas image '{}' has zero size",
                atlas.image
            )));
        }

        let build = build_static(&grid, textures);
        let player_texture = textures.get(&atlas.image);

        let mut sim = Self {
            machine: PlayerStateMachine::new(config, grid.tile_h),
            resolver: AnimationResolver::new(config),
            geometry: build.geometry,
            player: Player::spawn(vec2(config.spawn[0], config.spawn[1]), now_ms),
            sprite: SpriteFrame::NONE,
            player_vertices: [Vertex::default(); 6],
            player_sprite: PlayerSprite {
                scale: config.player_scale,
                pixel_trim: config.pixel_trim,
                atlas_w: atlas.image_w as f32,
                atlas_h: atlas.image_h as f32,
            },
            player_texture,
            pending: Vec::new(),
            reported: HashSet::new(),
            grid,
            atlas,
        };

        for issue in build.issues {
            sim.report(issue);
        }
        if player_texture.is_none() {
            sim.report(ConfigIssue::MissingTexture(sim.atlas.image.clone()));
        }

        info!(
            spawn_x = sim.player.pos.x,
            spawn_y = sim.player.pos.y,
            jump_height = sim.machine.jump_height(),
            "simulation_ready"
        );
        Ok(sim)
    }

    /// Advance one tick: intents, physics, animation, player quad.
    pub fn tick(&mut self, intents: &Intents, now_ms: f64) -> Frame<'_> {
        let probe = CollisionProbe::new(&self.grid);
        self.machine.tick(&mut self.player, intents, &probe, now_ms);

        self.sprite = self.resolve_sprite(now_ms);
        write_player_quad(
            &mut self.player_vertices,
            self.player.pos,
            self.player.facing,
            self.sprite.rect,
            &self.player_sprite,
        );

        self.frame()
    }

    /// Missing animations fall back to idle, then to an empty sprite.
    fn resolve_sprite(&mut self, now_ms: f64) -> SpriteFrame {
        let elapsed = self.player.elapsed_ms(now_ms);
        let err = match self.resolver.resolve(&self.atlas, self.player.state, elapsed) {
            Ok(frame) => return frame,
            Err(err) => err,
        };
        self.report(err.into());

        match self.resolver.resolve_tag(&self.atlas, AnimTag::Idle, elapsed) {
            Ok(frame) => frame,
            Err(err) => {
                self.report(err.into());
                SpriteFrame::NONE
            }
        }
    }

    /// What to draw for the most recent tick.
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            static_vertices: self.geometry.vertices(),
            batches: self.geometry.batches(),
            player_vertices: &self.player_vertices,
            player_texture: self.player_texture,
        }
    }

    /// Hand the current frame to `rasterizer` without advancing time.
    pub fn present<R: Rasterizer>(&self, rasterizer: &mut R) {
        rasterizer.submit(&self.frame());
    }

    /// Configuration problems seen since the last call, each reported once
    /// per session.
    pub fn take_issues(&mut self) -> Vec<ConfigIssue> {
        std::mem::take(&mut self.pending)
    }

    fn report(&mut self, issue: ConfigIssue) {
        if self.reported.insert(issue.clone()) {
            warn!(?issue, "configuration_issue");
            self.pending.push(issue);
        }
    }

    /// Player after the last tick.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Host-side override, e.g. to respawn after leaving the level.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// The level this session plays on.
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Level geometry built at startup.
    pub fn geometry(&self) -> &StaticGeometry {
        &self.geometry
    }

    /// Frame chosen by the last tick.
    pub fn sprite(&self) -> SpriteFrame {
        self.sprite
    }
}
