use crate::map::{CollisionLayer, TileGrid};

/// Answers "is this world point inside a solid collision cell?".
///
/// Anything outside the grid, or any query against a level without a
/// collision layer, reports empty.
#[derive(Debug, Clone, Copy)]
pub struct CollisionProbe<'g> {
    layer: Option<CollisionLayer<'g>>,
    tile_w: f32,
    tile_h: f32,
}

impl<'g> CollisionProbe<'g> {
    /// Probe over `grid`'s collision layer, if any.
    pub fn new(grid: &'g TileGrid) -> Self {
        Self {
            layer: grid.collision(),
            tile_w: grid.tile_w as f32,
            tile_h: grid.tile_h as f32,
        }
    }

    /// `false` when the level has no collision layer.
    #[inline]
    pub fn has_grid(&self) -> bool {
        self.layer.is_some()
    }

    /// Tile height in pixels, used to snap onto a row.
    #[inline]
    pub fn tile_h(&self) -> f32 {
        self.tile_h
    }

    /// Flat cell index for a world point, `None` outside the grid.
    pub fn world_to_cell(&self, x: f32, y: f32) -> Option<usize> {
        let layer = self.layer?;
        let col = (x / self.tile_w).floor();
        let row = (y / self.tile_h).floor();
        if !col.is_finite() || !row.is_finite() || col < 0.0 || row < 0.0 {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        if col >= layer.width {
            return None;
        }
        let index = col + row * layer.width;
        (index < layer.data.len()).then_some(index)
    }

    /// Whether `(x, y)` lies in a non-zero collision cell.
    pub fn is_solid(&self, x: f32, y: f32) -> bool {
        match (self.layer, self.world_to_cell(x, y)) {
            (Some(layer), Some(index)) => layer.data[index] != 0,
            _ => false,
        }
    }

    /// Top edge of the tile row containing `y`.
    #[inline]
    pub fn row_top(&self, y: f32) -> f32 {
        (y / self.tile_h).floor() * self.tile_h
    }
}
