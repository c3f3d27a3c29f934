//! Startup asset loading: level, sprite sheet, configuration and the images
//! they reference. Everything here finishes before the first tick.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use macroquad::texture::{load_image, Image};
use tracing::info;

use crate::config::SimConfig;
use crate::ir_map::{IrLayerKind, Level, SpriteAtlas};
use crate::loader::json_loader::{decode_atlas_file, decode_level_file};

/// Decoded assets, ready for [`crate::register_textures`] and
/// [`crate::Simulation::from_level`].
pub struct LoadedAssets {
    /// Tunables, defaulted when no config file was given
    pub config: SimConfig,
    /// Decoded level with image paths resolved
    pub level: Level,
    /// Decoded sprite sheet with its image path resolved
    pub atlas: SpriteAtlas,
    /// Images keyed by resolved path, one entry per distinct file
    pub images: Vec<(String, Image)>,
}

/// Load a Tiled level, an Aseprite sheet and an optional config file.
///
/// Image paths resolve relative to the file that names them and are stored
/// resolved, which is also how the images are keyed. Sizes the JSON
/// leaves out are filled in from the decoded images.
pub async fn load_assets(
    level_path: &str,
    atlas_path: &str,
    config_path: Option<&str>,
) -> anyhow::Result<LoadedAssets> {
    let config = match config_path {
        Some(p) => SimConfig::load(p).with_context(|| format!("Loading config {p}"))?,
        None => SimConfig::default(),
    };

    let (mut level, level_dir) =
        decode_level_file(level_path).with_context(|| format!("Loading level {level_path}"))?;
    let mut atlas =
        decode_atlas_file(atlas_path).with_context(|| format!("Loading sprite sheet {atlas_path}"))?;
    let atlas_dir = Path::new(atlas_path).parent().unwrap_or_else(|| Path::new("./"));

    rebase_image_paths(&mut level, &level_dir, &mut atlas, atlas_dir);

    let mut images: Vec<(String, Image)> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    let mut wanted: Vec<String> = level.tilesets.iter().map(|t| t.image.clone()).collect();
    for layer in &level.layers {
        if let IrLayerKind::Image { image, .. } = &layer.kind {
            wanted.push(image.clone());
        }
    }
    wanted.push(atlas.image.clone());

    for path in wanted {
        if seen.contains_key(&path) {
            continue;
        }
        let image = load_image(&path)
            .await
            .with_context(|| format!("Loading image {path}"))?;
        seen.insert(path.clone(), images.len());
        images.push((path, image));
    }

    let size_of = |key: &str| {
        seen.get(key)
            .map(|&i| (images[i].1.width() as u32, images[i].1.height() as u32))
    };
    fill_missing_sizes(&mut level, &mut atlas, size_of);

    info!(
        level = level_path,
        atlas = atlas_path,
        images = images.len(),
        "assets_loaded"
    );

    Ok(LoadedAssets {
        config,
        level,
        atlas,
        images,
    })
}

/// Rewrite every image reference as a path joined onto the directory of the
/// file that names it, so equal keys always mean the same file.
fn rebase_image_paths(level: &mut Level, level_dir: &Path, atlas: &mut SpriteAtlas, atlas_dir: &Path) {
    let join = |dir: &Path, rel: &str| dir.join(rel).to_string_lossy().into_owned();
    for ts in &mut level.tilesets {
        ts.image = join(level_dir, &ts.image);
    }
    for layer in &mut level.layers {
        if let IrLayerKind::Image { image, .. } = &mut layer.kind {
            *image = join(level_dir, image);
        }
    }
    atlas.image = join(atlas_dir, &atlas.image);
}

/// Replace zero image sizes with the dimensions of the decoded image.
fn fill_missing_sizes(
    level: &mut Level,
    atlas: &mut SpriteAtlas,
    size_of: impl Fn(&str) -> Option<(u32, u32)>,
) {
    for ts in &mut level.tilesets {
        if ts.image_w == 0 || ts.image_h == 0 {
            if let Some((w, h)) = size_of(&ts.image) {
                ts.image_w = w;
                ts.image_h = h;
            }
        }
    }
    for layer in &mut level.layers {
        if let IrLayerKind::Image { image, width, height } = &mut layer.kind {
            if *width == 0 || *height == 0 {
                if let Some((w, h)) = size_of(image) {
                    *width = w;
                    *height = h;
                }
            }
        }
    }
    if atlas.image_w == 0 || atlas.image_h == 0 {
        if let Some((w, h)) = size_of(&atlas.image) {
            atlas.image_w = w;
            atlas.image_h = h;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir_map::{IrLayer, IrTileset};
    use macroquad::prelude::vec2;

    fn atlas(image: &str) -> SpriteAtlas {
        SpriteAtlas {
            image: image.to_owned(),
            image_w: 0,
            image_h: 0,
            frames: Vec::new(),
            tags: HashMap::new(),
        }
    }

    #[test]
    fn same_name_in_different_directories_stays_distinct() {
        let mut level = Level {
            width: 1,
            height: 1,
            tile_w: 16,
            tile_h: 16,
            tilesets: Vec::new(),
            layers: vec![IrLayer::image("sky", "sheet.png", 0, 0, vec2(0.0, 0.0))],
        };
        let mut atlas = atlas("sheet.png");

        rebase_image_paths(&mut level, Path::new("levels"), &mut atlas, Path::new("sprites"));

        let IrLayerKind::Image { image, .. } = &level.layers[0].kind else {
            panic!("image layer expected");
        };
        assert_eq!(Path::new(image), Path::new("levels").join("sheet.png"));
        assert_eq!(Path::new(&atlas.image), Path::new("sprites").join("sheet.png"));
        assert_ne!(image, &atlas.image);
    }

    #[test]
    fn fills_only_missing_sizes() {
        let mut level = Level {
            width: 1,
            height: 1,
            tile_w: 16,
            tile_h: 16,
            tilesets: vec![IrTileset {
                first_gid: 1,
                image: "tiles.png".to_owned(),
                image_w: 0,
                image_h: 0,
                tile_w: 16,
                tile_h: 16,
                columns: 2,
                tilecount: 4,
                spacing: 0,
                margin: 0,
            }],
            layers: vec![
                IrLayer::image("sky", "sky.png", 0, 0, vec2(0.0, 0.0)),
                IrLayer::image("hills", "hills.png", 50, 20, vec2(0.0, 0.0)),
            ],
        };
        let mut atlas = atlas("elf.png");

        fill_missing_sizes(&mut level, &mut atlas, |_| Some((32, 24)));

        assert_eq!((level.tilesets[0].image_w, level.tilesets[0].image_h), (32, 24));
        assert!(matches!(level.layers[0].kind, IrLayerKind::Image { width: 32, height: 24, .. }));
        assert!(matches!(level.layers[1].kind, IrLayerKind::Image { width: 50, height: 20, .. }));
        assert_eq!((atlas.image_w, atlas.image_h), (32, 24));
    }
}
