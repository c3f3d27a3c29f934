// src/loader/json_loader.rs
//! Tiled map and Aseprite sheet JSON into the in-memory schema.
use crate::error::LoadError;
use crate::ir_map::{FrameRect, IrLayer, IrLayerKind, IrTileset, Level, SpriteAtlas, TagRange};
use macroquad::prelude::vec2;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Deserialize)]
struct JsonLayer {
    #[serde(rename = "type")]
    kind: Option<String>, // "tilelayer" expected here
    #[serde(default)]
    name: String,
    #[serde(default)]
    data: Vec<u32>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    width: usize,
    #[serde(default)]
    height: usize,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    offsetx: f32,
    #[serde(default)]
    offsety: f32,
    #[serde(default)]
    image: String,
    #[serde(default)]
    imagewidth: u32,
    #[serde(default)]
    imageheight: u32,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct JsonTilesetBody {
    columns: u32,
    tilewidth: u32,
    tileheight: u32,
    imagewidth: u32,
    imageheight: u32,
    image: String,
    tilecount: u32,
    spacing: u32,
    margin: u32,
}

#[derive(Deserialize)]
struct JsonTilesetRef {
    firstgid: u32,
    #[serde(default)]
    source: Option<String>,
    #[serde(flatten)]
    body: JsonTilesetBody,
}

#[derive(Deserialize)]
struct JsonMap {
    width: usize,
    height: usize,
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    infinite: bool,
    layers: Vec<JsonLayer>,
    #[serde(default)]
    tilesets: Vec<JsonTilesetRef>,
}

fn parse_json<T: serde::de::DeserializeOwned>(txt: &str, path: Option<&Path>) -> Result<T, LoadError> {
    serde_json::from_str(txt).map_err(|source| LoadError::Json {
        path: path.map(Path::to_path_buf),
        source,
    })
}

fn read_json_file(path: &Path) -> Result<String, LoadError> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(LoadError::UnsupportedFormat(path.display().to_string()));
    }
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn tileset_to_ir(first_gid: u32, body: JsonTilesetBody, image: String) -> IrTileset {
    IrTileset {
        first_gid,
        image,
        image_w: body.imagewidth,
        image_h: body.imageheight,
        tile_w: body.tilewidth,
        tile_h: body.tileheight,
        columns: body.columns,
        tilecount: body.tilecount,
        spacing: body.spacing,
        margin: body.margin,
    }
}

fn layer_to_ir(l: JsonLayer) -> Result<Option<IrLayer>, LoadError> {
    let kind = match l.kind.as_deref().unwrap_or("tilelayer") {
        "tilelayer" => {
            if let Some(enc) = l.encoding.as_deref().filter(|e| *e != "csv") {
                return Err(LoadError::UnsupportedFormat(format!(
                    "layer '{}' uses {enc} encoding; export with CSV layer format",
                    l.name
                )));
            }
            if l.data.len() != l.width * l.height {
                return Err(LoadError::InvalidLayerSize {
                    layer: l.name,
                    expected: l.width * l.height,
                    actual: l.data.len(),
                });
            }
            IrLayerKind::Tiles {
                width: l.width,
                height: l.height,
                data: l.data,
            }
        }
        "imagelayer" => {
            if l.image.is_empty() {
                return Err(LoadError::InvalidMap(format!(
                    "image layer '{}' has no image",
                    l.name
                )));
            }
            IrLayerKind::Image {
                image: l.image,
                width: l.imagewidth,
                height: l.imageheight,
            }
        }
        other => {
            debug!(layer = %l.name, kind = other, "layer_skipped");
            return Ok(None);
        }
    };

    Ok(Some(IrLayer {
        name: l.name,
        visible: l.visible,
        offset: vec2(l.x + l.offsetx, l.y + l.offsety),
        kind,
    }))
}

/// `map_dir` resolves external tilesets; `None` rejects them.
fn map_to_ir(j: JsonMap, map_dir: Option<&Path>) -> Result<Level, LoadError> {
    if j.infinite {
        return Err(LoadError::UnsupportedFormat(
            "infinite (chunked) maps".to_owned(),
        ));
    }

    let mut tilesets = Vec::with_capacity(j.tilesets.len());
    for ts in j.tilesets {
        let Some(source) = ts.source else {
            let image = ts.body.image.clone();
            tilesets.push(tileset_to_ir(ts.firstgid, ts.body, image));
            continue;
        };

        let Some(dir) = map_dir else {
            return Err(LoadError::InvalidMap(format!(
                "external tileset {source} needs the map's file path"
            )));
        };
        let ts_path = dir.join(&source);
        let ext: JsonTilesetBody = parse_json(&read_json_file(&ts_path)?, Some(&ts_path))?;

        // image paths stay relative to the map file
        let image = match Path::new(&source).parent() {
            Some(p) if !p.as_os_str().is_empty() => p.join(&ext.image).to_string_lossy().into_owned(),
            _ => ext.image.clone(),
        };
        tilesets.push(tileset_to_ir(ts.firstgid, ext, image));
    }

    // Sort by first_gid so the owner of a gid is a binary search away
    tilesets.sort_by_key(|t| t.first_gid);

    let mut layers = Vec::with_capacity(j.layers.len());
    for l in j.layers {
        if let Some(layer) = layer_to_ir(l)? {
            layers.push(layer);
        }
    }

    info!(
        width = j.width,
        height = j.height,
        layers = layers.len(),
        tilesets = tilesets.len(),
        "level_decoded"
    );

    Ok(Level {
        width: j.width,
        height: j.height,
        tile_w: j.tilewidth,
        tile_h: j.tileheight,
        tilesets,
        layers,
    })
}

/// Decode a Tiled JSON map whose tilesets are all embedded.
pub fn decode_level_str(json: &str) -> Result<Level, LoadError> {
    map_to_ir(parse_json(json, None)?, None)
}

/// Decode a Tiled JSON map file, following external `.json` tilesets.
///
/// Returns the level and the directory its image paths are relative to.
pub fn decode_level_file<P: AsRef<Path>>(path: P) -> Result<(Level, PathBuf), LoadError> {
    let p = path.as_ref();
    let txt = read_json_file(p)?;
    let j: JsonMap = parse_json(&txt, Some(p))?;

    let map_dir = p
        .parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"));

    Ok((map_to_ir(j, Some(&map_dir))?, map_dir))
}

#[derive(Deserialize)]
struct JsonRect {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

#[derive(Deserialize)]
struct JsonFrame {
    frame: JsonRect,
}

/// Aseprite exports frames either as a list or as a filename-keyed object.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonFrames {
    List(Vec<JsonFrame>),
    Hash(serde_json::Map<String, JsonValue>),
}

#[derive(Deserialize, Default)]
struct JsonSize {
    w: u32,
    h: u32,
}

#[derive(Deserialize)]
struct JsonFrameTag {
    name: String,
    from: usize,
    to: usize,
}

#[derive(Deserialize)]
struct JsonMeta {
    image: String,
    #[serde(default)]
    size: JsonSize,
    #[serde(default, rename = "frameTags")]
    frame_tags: Vec<JsonFrameTag>,
}

#[derive(Deserialize)]
struct JsonSheet {
    frames: JsonFrames,
    meta: JsonMeta,
}

fn sheet_to_ir(sheet: JsonSheet, path: Option<&Path>) -> Result<SpriteAtlas, LoadError> {
    let frames: Vec<JsonFrame> = match sheet.frames {
        JsonFrames::List(list) => list,
        JsonFrames::Hash(map) => map
            .into_iter()
            .map(|(_, v)| {
                serde_json::from_value(v).map_err(|source| LoadError::Json {
                    path: path.map(Path::to_path_buf),
                    source,
                })
            })
            .collect::<Result<_, _>>()?,
    };
    if frames.is_empty() {
        return Err(LoadError::InvalidAtlas("sprite sheet has no frames".to_owned()));
    }

    let mut tags = HashMap::with_capacity(sheet.meta.frame_tags.len());
    for t in sheet.meta.frame_tags {
        if t.from > t.to || t.to >= frames.len() {
            return Err(LoadError::InvalidAtlas(format!(
                "tag '{}' range {}..={} outside {} frames",
                t.name,
                t.from,
                t.to,
                frames.len()
            )));
        }
        tags.insert(t.name, TagRange { from: t.from, to: t.to });
    }

    info!(frames = frames.len(), tags = tags.len(), image = %sheet.meta.image, "atlas_decoded");

    Ok(SpriteAtlas {
        image: sheet.meta.image,
        image_w: sheet.meta.size.w,
        image_h: sheet.meta.size.h,
        frames: frames
            .into_iter()
            .map(|f| FrameRect {
                x: f.frame.x,
                y: f.frame.y,
                w: f.frame.w,
                h: f.frame.h,
            })
            .collect(),
        tags,
    })
}

/// Decode an Aseprite JSON sprite sheet.
pub fn decode_atlas_str(json: &str) -> Result<SpriteAtlas, LoadError> {
    sheet_to_ir(parse_json(json, None)?, None)
}

/// Read and decode an Aseprite JSON file. Errors carry the path.
pub fn decode_atlas_file<P: AsRef<Path>>(path: P) -> Result<SpriteAtlas, LoadError> {
    let p = path.as_ref();
    let txt = read_json_file(p)?;
    sheet_to_ir(parse_json(&txt, Some(p))?, Some(p))
}
