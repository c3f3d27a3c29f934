use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal error raised while decoding or validating startup assets.
///
/// Any of these aborts startup: the tick loop never runs on partially
/// loaded assets.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O error
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File that failed to read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
    /// JSON parse error
    #[error("JSON parse error in {}: {source}", source_name(.path))]
    Json {
        /// File being parsed, `None` for inline sources
        path: Option<PathBuf>,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
    /// Unsupported file format (non-JSON)
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    /// Structurally invalid level
    #[error("invalid level: {0}")]
    InvalidMap(String),
    /// A tile layer's data length does not match width * height
    #[error("invalid layer size for layer '{layer}': expected {expected} cells, found {actual}")]
    InvalidLayerSize {
        /// Layer name
        layer: String,
        /// `width * height`
        expected: usize,
        /// `data.len()`
        actual: usize,
    },
    /// A tileset with zero columns or zero image/tile size
    #[error("invalid tileset '{image}' (firstgid {first_gid}): {reason}")]
    InvalidTileset {
        /// Tileset image path
        image: String,
        /// First global id of the tileset
        first_gid: u32,
        /// What is wrong with it
        reason: &'static str,
    },
    /// Structurally invalid sprite atlas
    #[error("invalid sprite atlas: {0}")]
    InvalidAtlas(String),
    /// Configuration value out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

fn source_name(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "<inline>".to_owned(),
    }
}

/// Failure to map a player state onto an atlas frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnimationError {
    /// The atlas has no tag with this name
    #[error("animation tag '{0}' not found in atlas")]
    MissingTag(String),
    /// The tag range points past the atlas frame list
    #[error("animation tag '{tag}' references frame {index} but atlas has {frames} frames")]
    FrameOutOfRange {
        /// Tag name
        tag: String,
        /// Offending frame index
        index: usize,
        /// Number of frames in the atlas
        frames: usize,
    },
}

/// Non-fatal configuration problem surfaced to the host.
///
/// The simulation resolves each of these to a safe fallback and keeps ticking.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigIssue {
    /// Animation tag missing from the atlas; idle (or nothing) was drawn instead
    MissingAnimationTag(String),
    /// Animation tag whose range runs past the atlas frame list
    AnimationOutOfRange(String),
    /// Cell value that no tileset owns; the tile was skipped
    UnresolvedTile {
        /// Layer name
        layer: String,
        /// Cell index in the layer
        index: usize,
        /// Cleaned global id
        gid: u32,
    },
    /// Image with no registered texture; geometry referencing it was skipped
    MissingTexture(String),
}

impl From<AnimationError> for ConfigIssue {
    fn from(err: AnimationError) -> Self {
        match err {
            AnimationError::MissingTag(tag) => ConfigIssue::MissingAnimationTag(tag),
            AnimationError::FrameOutOfRange { tag, .. } => ConfigIssue::AnimationOutOfRange(tag),
        }
    }
}
