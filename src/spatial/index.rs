use bitflags::bitflags;

bitflags! {
    /// Tiled's per-cell transform flags, stored in the top bits of a cell value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TileFlip: u32 {
        /// Mirror left to right
        const HORIZONTAL = 0x8000_0000;
        /// Mirror top to bottom
        const VERTICAL   = 0x4000_0000;
        /// Swap x and y, applied before the mirrors
        const DIAGONAL   = 0x2000_0000;
    }
}

/// Bits left for the global id once the flip flags are masked off.
pub const GID_MASK: u32 = 0x1FFF_FFFF;

/// Raw cell value of a tile layer: a global tile id plus flip flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId(pub u32);

impl TileId {
    /// Cell value as stored, flip flags included.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Global id with the flip flags stripped; 0 means an empty cell.
    #[inline]
    pub fn clean(self) -> u32 {
        self.0 & GID_MASK
    }

    /// Whether the cell holds no tile.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.clean() == 0
    }

    /// Flip flags set on this cell. The batcher remaps the tile UVs with them.
    #[inline]
    pub fn flips(self) -> TileFlip {
        TileFlip::from_bits_truncate(self.0)
    }
}
