//! Tile ids and point-in-collision-grid queries.

mod index;
mod probe;

pub use index::{TileFlip, TileId, GID_MASK};
pub use probe::CollisionProbe;
