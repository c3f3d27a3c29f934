//! Level and player geometry as interleaved `xyz uv` triangles.
//!
//! The static pass runs once per level: tiles are grouped per tileset inside
//! each layer, so a layer costs at most one draw call per tileset. Layers get
//! a depth of `(layer_count - index) / layer_count` and are emitted back to
//! front, so no depth test is needed.

use macroquad::prelude::Vec2;
use tracing::{info, warn};

use super::rasterizer::{TextureId, TextureTable};
use crate::error::ConfigIssue;
use crate::ir_map::{FrameRect, IrLayerKind, IrTileset};
use crate::map::TileGrid;
use crate::player::Facing;
use crate::spatial::{TileFlip, TileId};

/// Two triangles, no index buffer.
pub const VERTICES_PER_QUAD: usize = 6;

/// Interleaved vertex: world position with depth, then texture coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    /// `[x, y, z]`, z in `(0, 1]`, larger is further back
    pub position: [f32; 3],
    /// Normalised texture coordinates
    pub uv: [f32; 2],
}

/// One draw call: a slice of the shared vertex buffer and the texture to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchDescriptor {
    /// Texture bound for the whole batch
    pub texture: TextureId,
    /// First vertex of the batch
    pub vertex_offset: usize,
    /// Multiple of [`VERTICES_PER_QUAD`]
    pub vertex_count: usize,
}

/// Pixel rectangle `[x0, y0, x1, y1]` at depth `z`, with one UV per corner in
/// the order top-left, bottom-left, bottom-right, top-right. Two triangles,
/// counter-clockwise from top-left.
#[inline]
fn quad_corners([x0, y0, x1, y1]: [f32; 4], z: f32, [tl, bl, br, tr]: [[f32; 2]; 4]) -> [Vertex; 6] {
    let v = |x, y, uv| Vertex { position: [x, y, z], uv };
    [
        v(x0, y0, tl),
        v(x0, y1, bl),
        v(x1, y1, br),
        v(x1, y1, br),
        v(x1, y0, tr),
        v(x0, y0, tl),
    ]
}

/// [`quad_corners`] for an unflipped `[u0, v0, u1, v1]` rectangle.
#[inline]
fn quad(rect: [f32; 4], z: f32, uv: [f32; 4]) -> [Vertex; 6] {
    quad_corners(rect, z, corner_uvs(uv, TileFlip::empty()))
}

/// Corner UVs of `[u0, v0, u1, v1]` with Tiled's flips applied: diagonal
/// (x/y swap) first, then horizontal, then vertical.
fn corner_uvs([u0, v0, u1, v1]: [f32; 4], flips: TileFlip) -> [[f32; 2]; 4] {
    let corner = |mut right: bool, mut bottom: bool| {
        if flips.contains(TileFlip::VERTICAL) {
            bottom = !bottom;
        }
        if flips.contains(TileFlip::HORIZONTAL) {
            right = !right;
        }
        if flips.contains(TileFlip::DIAGONAL) {
            std::mem::swap(&mut right, &mut bottom);
        }
        [if right { u1 } else { u0 }, if bottom { v1 } else { v0 }]
    };
    [
        corner(false, false),
        corner(false, true),
        corner(true, true),
        corner(true, false),
    ]
}

/// UV rectangle of local tile `local` inside `ts`, `None` when the tile's
/// pixel origin does not fit in `u32`.
fn tile_uv(ts: &IrTileset, local: u32) -> Option<[f32; 4]> {
    let col = local.checked_rem(ts.columns)?;
    let row = local.checked_div(ts.columns)?;
    let sx = col
        .checked_mul(ts.tile_w.checked_add(ts.spacing)?)?
        .checked_add(ts.margin)?;
    let sy = row
        .checked_mul(ts.tile_h.checked_add(ts.spacing)?)?
        .checked_add(ts.margin)?;
    let (iw, ih) = (ts.image_w as f32, ts.image_h as f32);
    let u = sx as f32 / iw;
    let v = sy as f32 / ih;
    Some([u, v, u + ts.tile_w as f32 / iw, v + ts.tile_h as f32 / ih])
}

/// Level geometry shared by every tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticGeometry {
    vertices: Vec<Vertex>,
    batches: Vec<BatchDescriptor>,
}

impl StaticGeometry {
    /// Every static quad, batch by batch.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Draw calls in paint order, back to front.
    pub fn batches(&self) -> &[BatchDescriptor] {
        &self.batches
    }

    /// Little-endian `f32` image of the vertex buffer, as uploaded.
    pub fn vertex_bytes(&self) -> Vec<u8> {
        self.vertices
            .iter()
            .flat_map(|v| v.position.into_iter().chain(v.uv))
            .flat_map(f32::to_le_bytes)
            .collect()
    }
}

/// Static pass result plus the configuration problems it skipped over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticBuild {
    /// Vertices and draw calls
    pub geometry: StaticGeometry,
    /// Each distinct problem once, in discovery order
    pub issues: Vec<ConfigIssue>,
}

/// Vertex counts for one level, gathered before any geometry is written.
struct Census {
    total_quads: usize,
    /// Largest quad count any single layer puts into each tileset
    arena_quads: Vec<usize>,
}

fn census(grid: &TileGrid) -> Census {
    let mut total_quads = 0;
    let mut arena_quads = vec![0; grid.tilesets().len()];
    let mut per_layer = vec![0; grid.tilesets().len()];

    for (i, layer) in grid.layers().iter().enumerate() {
        if Some(i) == grid.collision_index() || !layer.visible {
            continue;
        }
        match &layer.kind {
            IrLayerKind::Image { .. } => total_quads += 1,
            IrLayerKind::Tiles { data, .. } => {
                per_layer.fill(0);
                for &raw in data {
                    if let Some((ts_idx, _, _)) = grid.ts_for_gid(TileId(raw)) {
                        per_layer[ts_idx] += 1;
                    }
                }
                for (arena, &n) in arena_quads.iter_mut().zip(&per_layer) {
                    *arena = (*arena).max(n);
                    total_quads += n;
                }
            }
        }
    }

    Census {
        total_quads,
        arena_quads,
    }
}

/// Build the level's vertex buffer and draw calls.
///
/// Deterministic: the same grid and texture table always produce the same
/// bytes and descriptors.
pub fn build_static(grid: &TileGrid, textures: &TextureTable) -> StaticBuild {
    let census = census(grid);
    let mut vertices = Vec::with_capacity(census.total_quads * VERTICES_PER_QUAD);
    let mut batches = Vec::new();
    let mut issues = Vec::new();
    let mut arenas: Vec<Vec<Vertex>> = census
        .arena_quads
        .iter()
        .map(|&n| Vec::with_capacity(n * VERTICES_PER_QUAD))
        .collect();

    let layer_count = grid.layers().len() as f32;
    let (tw, th) = (grid.tile_w as f32, grid.tile_h as f32);

    for (i, layer) in grid.layers().iter().enumerate() {
        if Some(i) == grid.collision_index() || !layer.visible {
            continue;
        }
        let z = (layer_count - i as f32) / layer_count;

        match &layer.kind {
            IrLayerKind::Image {
                image,
                width,
                height,
            } => {
                let Some(texture) = textures.get(image) else {
                    report(&mut issues, ConfigIssue::MissingTexture(image.clone()));
                    continue;
                };
                let Vec2 { x, y } = layer.offset;
                let q = quad([x, y, x + *width as f32, y + *height as f32], z, [0.0, 0.0, 1.0, 1.0]);
                batches.push(BatchDescriptor {
                    texture,
                    vertex_offset: vertices.len(),
                    vertex_count: q.len(),
                });
                vertices.extend_from_slice(&q);
            }
            IrLayerKind::Tiles { width, data, .. } => {
                for (idx, &raw) in data.iter().enumerate() {
                    let gid = TileId(raw);
                    if gid.is_empty() {
                        continue;
                    }
                    let resolved = grid
                        .ts_for_gid(gid)
                        .and_then(|(ts_idx, ts, local)| Some((ts_idx, tile_uv(ts, local)?)));
                    let Some((ts_idx, uv)) = resolved else {
                        report(
                            &mut issues,
                            ConfigIssue::UnresolvedTile {
                                layer: layer.name.clone(),
                                index: idx,
                                gid: gid.clean(),
                            },
                        );
                        continue;
                    };

                    let x = (idx % width) as f32 * tw + layer.offset.x;
                    let y = (idx / width) as f32 * th + layer.offset.y;
                    let corners = corner_uvs(uv, gid.flips());
                    arenas[ts_idx].extend_from_slice(&quad_corners([x, y, x + tw, y + th], z, corners));
                }

                // flush: one draw call per tileset used by this layer
                for (ts, arena) in grid.tilesets().iter().zip(arenas.iter_mut()) {
                    if arena.is_empty() {
                        continue;
                    }
                    match textures.get(&ts.image) {
                        Some(texture) => {
                            batches.push(BatchDescriptor {
                                texture,
                                vertex_offset: vertices.len(),
                                vertex_count: arena.len(),
                            });
                            vertices.extend_from_slice(arena);
                        }
                        None => report(&mut issues, ConfigIssue::MissingTexture(ts.image.clone())),
                    }
                    arena.clear();
                }
            }
        }
    }

    info!(
        batches = batches.len(),
        vertices = vertices.len(),
        skipped = issues.len(),
        "static_geometry_built"
    );

    StaticBuild {
        geometry: StaticGeometry { vertices, batches },
        issues,
    }
}

fn report(issues: &mut Vec<ConfigIssue>, issue: ConfigIssue) {
    if !issues.contains(&issue) {
        warn!(?issue, "static_geometry_issue");
        issues.push(issue);
    }
}

/// Player sprite placement parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSprite {
    /// Sprite pixels to world pixels
    pub scale: f32,
    /// Source pixels cropped below the feet
    pub pixel_trim: f32,
    /// Atlas image width, for normalising u
    pub atlas_w: f32,
    /// Atlas image height, for normalising v
    pub atlas_h: f32,
}

/// Overwrite `out` with the player quad: feet at `pos`, horizontally
/// centred, UVs mirrored when facing left.
pub fn write_player_quad(out: &mut [Vertex; 6], pos: Vec2, facing: Facing, frame: FrameRect, sprite: &PlayerSprite) {
    let (fw, fh) = (frame.w as f32, frame.h as f32);
    let half_w = fw * sprite.scale / 2.0;
    let x0 = pos.x - half_w;
    let x1 = pos.x + half_w;
    let y0 = pos.y - (fh - sprite.pixel_trim) * sprite.scale;
    let y1 = pos.y + sprite.pixel_trim;

    let u = frame.x as f32 / sprite.atlas_w;
    let v = frame.y as f32 / sprite.atlas_h;
    let s = fw / sprite.atlas_w;
    let t = fh / sprite.atlas_h;
    let (u0, u1) = match facing {
        Facing::Normal => (u, u + s),
        Facing::Reversed => (u + s, u),
    };

    *out = quad([x0, y0, x1, y1], 0.0, [u0, v, u1, v + t]);
}
