// src/ir_map.rs
//! In-memory level and sprite-sheet schema produced by the loaders.
use macroquad::prelude::Vec2;
use std::collections::HashMap;

/// Canonical, format-agnostic level.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    /// Grid width in tiles
    pub width: usize,
    /// Grid height in tiles
    pub height: usize,
    /// Tile width in pixels
    pub tile_w: u32,
    /// Tile height in pixels
    pub tile_h: u32,
    /// Tilesets, sorted by `first_gid`
    pub tilesets: Vec<IrTileset>,
    /// Layers in paint order (first is furthest back)
    pub layers: Vec<IrLayer>,
}

/// One image atlas with a regular grid.
#[derive(Debug, Clone, PartialEq)]
pub struct IrTileset {
    /// First global tile id owned by this tileset
    pub first_gid: u32,
    /// Image path, relative to the level file
    pub image: String,
    /// Image width in pixels
    pub image_w: u32,
    /// Image height in pixels
    pub image_h: u32,
    /// Tile width in pixels
    pub tile_w: u32,
    /// Tile height in pixels
    pub tile_h: u32,
    /// Tiles per image row
    pub columns: u32,
    /// Number of tiles, 0 if unknown
    pub tilecount: u32,
    /// 0 if not used
    pub spacing: u32,
    /// 0 if not used
    pub margin: u32,
}

impl IrTileset {
    /// Number of addressable tiles: `tilecount` when known, otherwise the
    /// grid that fits in the image.
    pub fn capacity(&self) -> u32 {
        if self.tilecount > 0 {
            return self.tilecount;
        }
        let usable = self
            .image_h
            .saturating_sub(self.margin.saturating_mul(2))
            .saturating_add(self.spacing);
        let rows = usable
            .checked_div(self.tile_h.saturating_add(self.spacing))
            .unwrap_or(0);
        self.columns.saturating_mul(rows)
    }
}

/// What a layer holds.
#[derive(Debug, Clone, PartialEq)]
pub enum IrLayerKind {
    /// Dense row-major grid of raw global ids, 0 = empty.
    Tiles {
        /// Columns
        width: usize,
        /// Rows
        height: usize,
        /// raw GIDs (flip flags allowed)
        data: Vec<u32>,
    },
    /// A single static picture.
    Image {
        /// Image path, relative to the level file
        image: String,
        /// Image width in pixels
        width: u32,
        /// Image height in pixels
        height: u32,
    },
}

/// A named layer.
#[derive(Debug, Clone, PartialEq)]
pub struct IrLayer {
    /// Layer name; the collision layer is found by name
    pub name: String,
    /// Hidden layers are not drawn
    pub visible: bool,
    /// world offset for this layer
    pub offset: Vec2,
    /// Payload
    pub kind: IrLayerKind,
}

impl IrLayer {
    /// Convenience constructor for a visible tile layer at the origin.
    pub fn tiles(name: impl Into<String>, width: usize, height: usize, data: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            offset: Vec2::ZERO,
            kind: IrLayerKind::Tiles {
                width,
                height,
                data,
            },
        }
    }

    /// Convenience constructor for a visible image layer.
    pub fn image(name: impl Into<String>, image: impl Into<String>, width: u32, height: u32, offset: Vec2) -> Self {
        Self {
            name: name.into(),
            visible: true,
            offset,
            kind: IrLayerKind::Image {
                image: image.into(),
                width,
                height,
            },
        }
    }
}

/// Pixel rectangle of one sprite frame inside the atlas image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameRect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width
    pub w: u32,
    /// Height
    pub h: u32,
}

/// Inclusive frame-index range of one animation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagRange {
    /// First frame index
    pub from: usize,
    /// Last frame index, inclusive
    pub to: usize,
}

impl TagRange {
    /// Number of frames in the range; never 0.
    #[inline]
    pub fn frame_count(self) -> usize {
        self.to.saturating_sub(self.from) + 1
    }
}

/// Sprite sheet: frame rectangles into one shared image plus named tag ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteAtlas {
    /// Image path, relative to the atlas file
    pub image: String,
    /// Image width in pixels
    pub image_w: u32,
    /// Image height in pixels
    pub image_h: u32,
    /// Frames in export order
    pub frames: Vec<FrameRect>,
    /// tag name -> inclusive frame range
    pub tags: HashMap<String, TagRange>,
}

impl SpriteAtlas {
    /// Frame range for `tag`, if present.
    pub fn tag(&self, tag: &str) -> Option<TagRange> {
        self.tags.get(tag).copied()
    }
}
