//! Validated, immutable level grid and tileset ownership lookup.

use crate::error::LoadError;
use crate::ir_map::{IrLayer, IrLayerKind, IrTileset, Level};
use crate::spatial::TileId;
use tracing::{debug, info};

/// Borrowed view of the collision layer.
#[derive(Debug, Clone, Copy)]
pub struct CollisionLayer<'a> {
    /// Columns in the collision grid
    pub width: usize,
    /// Row-major cell values, 0 = empty
    pub data: &'a [u32],
}

/// Immutable, validated tile grid for one level.
#[derive(Debug, Clone)]
pub struct TileGrid {
    /// Grid width in tiles
    pub width: usize,
    /// Grid height in tiles
    pub height: usize,
    /// Tile width in pixels
    pub tile_w: u32,
    /// Tile height in pixels
    pub tile_h: u32,
    tilesets: Vec<IrTileset>,
    layers: Vec<IrLayer>,
    collision: Option<usize>,
}

impl TileGrid {
    /// Validate `level` and freeze it. The first layer named `collision_layer`
    /// becomes the physics grid and is never drawn.
    pub fn from_level(level: Level, collision_layer: &str) -> Result<Self, LoadError> {
        let Level {
            width,
            height,
            tile_w,
            tile_h,
            mut tilesets,
            layers,
        } = level;

        if tile_w == 0 || tile_h == 0 {
            return Err(LoadError::InvalidMap(format!(
                "tile size must be non-zero, got {tile_w}x{tile_h}"
            )));
        }
        if layers.is_empty() {
            return Err(LoadError::InvalidMap("level has no layers".to_owned()));
        }

        for layer in &layers {
            if let IrLayerKind::Tiles {
                width,
                height,
                data,
            } = &layer.kind
            {
                if data.len() != width * height {
                    return Err(LoadError::InvalidLayerSize {
                        layer: layer.name.clone(),
                        expected: width * height,
                        actual: data.len(),
                    });
                }
            }
        }

        for ts in &tilesets {
            let reason = if ts.first_gid == 0 {
                Some("firstgid must be at least 1")
            } else if ts.columns == 0 {
                Some("columns must be non-zero")
            } else if ts.tile_w == 0 || ts.tile_h == 0 {
                Some("tile size must be non-zero")
            } else if ts.image_w == 0 || ts.image_h == 0 {
                Some("image size must be non-zero")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(LoadError::InvalidTileset {
                    image: ts.image.clone(),
                    first_gid: ts.first_gid,
                    reason,
                });
            }
        }

        // Sort by first_gid so ownership lookup is a binary search
        tilesets.sort_by_key(|t| t.first_gid);
        if let Some(pair) = tilesets.windows(2).find(|w| w[0].first_gid == w[1].first_gid) {
            return Err(LoadError::InvalidMap(format!(
                "tilesets '{}' and '{}' share firstgid {}",
                pair[0].image, pair[1].image, pair[0].first_gid
            )));
        }

        let collision = layers.iter().position(|l| {
            l.name == collision_layer && matches!(l.kind, IrLayerKind::Tiles { .. })
        });
        if collision.is_none() {
            debug!(collision_layer, "collision_layer_absent");
        }

        info!(
            width,
            height,
            layers = layers.len(),
            tilesets = tilesets.len(),
            has_collision = collision.is_some(),
            "level_loaded"
        );

        Ok(Self {
            width,
            height,
            tile_w,
            tile_h,
            tilesets,
            layers,
            collision,
        })
    }

    /// Layers in paint order, including the collision layer.
    pub fn layers(&self) -> &[IrLayer] {
        &self.layers
    }

    /// Tilesets sorted by `first_gid`.
    pub fn tilesets(&self) -> &[IrTileset] {
        &self.tilesets
    }

    /// Index of the collision layer in [`Self::layers`].
    pub fn collision_index(&self) -> Option<usize> {
        self.collision
    }

    /// The physics grid, if the level has one.
    pub fn collision(&self) -> Option<CollisionLayer<'_>> {
        let layer = self.layers.get(self.collision?)?;
        match &layer.kind {
            IrLayerKind::Tiles { width, data, .. } => Some(CollisionLayer {
                width: *width,
                data,
            }),
            IrLayerKind::Image { .. } => None,
        }
    }

    /// Owning tileset of `gid`: the one with the largest `first_gid <= gid`.
    ///
    /// Returns the tileset index, the tileset and the local tile index, or
    /// `None` for empty cells, ids below every tileset and ids past the
    /// owner's [`IrTileset::capacity`].
    #[inline]
    pub fn ts_for_gid(&self, gid: TileId) -> Option<(usize, &IrTileset, u32)> {
        let clean = gid.clean();
        if clean == 0 {
            return None;
        }
        let idx = self.tilesets.partition_point(|t| t.first_gid <= clean);
        let ts_idx = idx.checked_sub(1)?;
        let ts = &self.tilesets[ts_idx];
        let local = clean - ts.first_gid;
        if local >= ts.capacity() {
            return None;
        }
        Some((ts_idx, ts, local))
    }
}
