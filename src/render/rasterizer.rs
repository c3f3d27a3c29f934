use std::collections::HashMap;

use tracing::debug;

use super::batch::{BatchDescriptor, Vertex};

/// Handle to a texture living in the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Image path -> texture handle, filled once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureTable {
    by_image: HashMap<String, TextureId>,
}

impl TextureTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `image` to `id`, replacing any earlier handle.
    pub fn insert(&mut self, image: impl Into<String>, id: TextureId) {
        self.by_image.insert(image.into(), id);
    }

    /// Handle registered for `image`.
    #[inline]
    pub fn get(&self, image: &str) -> Option<TextureId> {
        self.by_image.get(image).copied()
    }

    /// Number of registered images.
    pub fn len(&self) -> usize {
        self.by_image.len()
    }

    /// No images registered.
    pub fn is_empty(&self) -> bool {
        self.by_image.is_empty()
    }
}

/// Everything the rasterizer needs for one displayed frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Level geometry, built once at load
    pub static_vertices: &'a [Vertex],
    /// Draw calls into `static_vertices`, back to front
    pub batches: &'a [BatchDescriptor],
    /// Player quad, rebuilt every tick
    pub player_vertices: &'a [Vertex; 6],
    /// Atlas texture, `None` if it was never registered
    pub player_texture: Option<TextureId>,
}

/// Draw backend.
pub trait Rasterizer {
    /// Decoded image type the backend uploads.
    type Image;

    /// Upload `image`; called once per distinct image before the first tick.
    fn create_texture(&mut self, image: &Self::Image) -> TextureId;

    /// One draw call per batch in order, binding its texture first, then the
    /// player quad on top.
    fn submit(&mut self, frame: &Frame<'_>);
}

/// Create one texture per distinct image path.
pub fn register_textures<R: Rasterizer>(rasterizer: &mut R, images: &[(String, R::Image)]) -> TextureTable {
    let mut table = TextureTable::new();
    for (path, image) in images {
        if table.get(path).is_some() {
            continue;
        }
        let id = rasterizer.create_texture(image);
        debug!(image = %path, id = id.0, "texture_created");
        table.insert(path.clone(), id);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counting {
        created: u32,
    }

    impl Rasterizer for Counting {
        type Image = ();

        fn create_texture(&mut self, _image: &()) -> TextureId {
            self.created += 1;
            TextureId(self.created - 1)
        }

        fn submit(&mut self, _frame: &Frame<'_>) {}
    }

    #[test]
    fn registers_each_image_once() {
        let mut r = Counting::default();
        let images = vec![
            ("tiles.png".to_owned(), ()),
            ("sky.png".to_owned(), ()),
            ("tiles.png".to_owned(), ()),
        ];
        let table = register_textures(&mut r, &images);
        assert_eq!(r.created, 2);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("tiles.png"), Some(TextureId(0)));
        assert_eq!(table.get("sky.png"), Some(TextureId(1)));
    }
}
