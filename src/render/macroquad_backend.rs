//! [`Rasterizer`](super::Rasterizer) backed by macroquad textures and meshes.

use macroquad::color::WHITE;
use macroquad::models::{draw_mesh, Mesh, Vertex as MeshVertex};
use macroquad::texture::{FilterMode, Image, Texture2D};
use tracing::warn;

use super::batch::Vertex;
use super::rasterizer::{Frame, Rasterizer, TextureId};

/// Vertices per mesh draw; a multiple of 6 that stays under macroquad's
/// default per-draw-call capacity.
const MAX_DRAW_VERTICES: usize = 4800;

/// [`Rasterizer`] on top of macroquad's immediate-mode meshes.
///
/// Call [`Rasterizer::submit`] between `clear_background` and `next_frame`
/// with the camera already set.
pub struct MacroquadRasterizer {
    textures: Vec<Texture2D>,
    mesh: Mesh,
}

impl Default for MacroquadRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MacroquadRasterizer {
    /// Empty texture list and a reusable mesh buffer.
    pub fn new() -> Self {
        Self {
            textures: Vec::new(),
            mesh: Mesh {
                vertices: Vec::with_capacity(MAX_DRAW_VERTICES),
                indices: Vec::with_capacity(MAX_DRAW_VERTICES),
                texture: None,
            },
        }
    }

    fn draw(&mut self, texture: TextureId, vertices: &[Vertex]) {
        let Some(tex) = self.textures.get(texture.0 as usize) else {
            warn!(texture = texture.0, "unknown_texture");
            return;
        };
        self.mesh.texture = Some(tex.clone());

        for chunk in vertices.chunks(MAX_DRAW_VERTICES) {
            self.mesh.vertices.clear();
            self.mesh.indices.clear();
            self.mesh.vertices.extend(chunk.iter().map(|v| {
                let [x, y, z] = v.position;
                let [u, w] = v.uv;
                MeshVertex::new(x, y, z, u, w, WHITE)
            }));
            self.mesh.indices.extend(0..chunk.len() as u16);
            draw_mesh(&self.mesh);
        }
    }
}

impl Rasterizer for MacroquadRasterizer {
    type Image = Image;

    fn create_texture(&mut self, image: &Image) -> TextureId {
        let tex = Texture2D::from_image(image);
        tex.set_filter(FilterMode::Nearest);
        self.textures.push(tex);
        TextureId(self.textures.len() as u32 - 1)
    }

    fn submit(&mut self, frame: &Frame<'_>) {
        for batch in frame.batches {
            let end = batch.vertex_offset + batch.vertex_count;
            match frame.static_vertices.get(batch.vertex_offset..end) {
                Some(vertices) => self.draw(batch.texture, vertices),
                None => warn!(
                    offset = batch.vertex_offset,
                    count = batch.vertex_count,
                    "batch_out_of_range"
                ),
            }
        }

        if let Some(texture) = frame.player_texture {
            self.draw(texture, frame.player_vertices);
        }
    }
}
