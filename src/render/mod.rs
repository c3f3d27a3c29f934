//! Static level geometry, the player quad, and the rasterizer seam.

pub mod batch;
pub mod macroquad_backend;
mod rasterizer;

pub use batch::{build_static, write_player_quad, BatchDescriptor, StaticBuild, StaticGeometry, Vertex};
pub use macroquad_backend::MacroquadRasterizer;
pub use rasterizer::{register_textures, Frame, Rasterizer, TextureId, TextureTable};
