#![warn(missing_docs)]

//! Tile-based platformer core for Macroquad: Tiled levels, Aseprite sprite
//! sheets, a flag-based player state machine with tile collision, and batched
//! level geometry.

pub mod animation;
pub mod assets;
pub mod config;
mod error;
pub mod ir_map;
pub mod loader {
    //! JSON decoders for Tiled levels and Aseprite sprite sheets.
    pub mod json_loader;
}
pub mod map;
pub mod player;
pub mod render;
mod sim;
pub mod spatial;

pub use animation::{select_tag, AnimTag, AnimationResolver, SpriteFrame};
pub use assets::{load_assets, LoadedAssets};
pub use config::{AnimationTags, SimConfig};
pub use error::{AnimationError, ConfigIssue, LoadError};
pub use ir_map::{FrameRect, IrLayer, IrLayerKind, IrTileset, Level, SpriteAtlas, TagRange};
pub use map::{CollisionLayer, TileGrid};
pub use player::{Facing, Intents, Player, PlayerState, PlayerStateMachine};
pub use render::{
    build_static, register_textures, BatchDescriptor, Frame, MacroquadRasterizer, Rasterizer, StaticBuild,
    StaticGeometry, TextureId, TextureTable, Vertex,
};
pub use sim::Simulation;
pub use spatial::{CollisionProbe, TileFlip, TileId};
