//! Maps player state and elapsed time onto one sprite-atlas frame.

use crate::config::{AnimationTags, SimConfig};
use crate::error::AnimationError;
use crate::ir_map::{FrameRect, SpriteAtlas};
use crate::player::PlayerState;

/// One animation per recognisable player activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimTag {
    /// Falling with no jump in progress
    Fall,
    /// Ascending or descending a jump arc
    Jump,
    /// Dodge roll
    Roll,
    /// Walking on the ground
    Run,
    /// First attack
    Attack1,
    /// Second attack
    Attack2,
    /// Third attack
    Attack3,
    /// Fallback when no other flag applies
    Idle,
}

/// Highest priority first; the first flag present in the state wins.
const PRIORITY: [(PlayerState, AnimTag); 7] = [
    (PlayerState::FALL, AnimTag::Fall),
    (PlayerState::JUMP, AnimTag::Jump),
    (PlayerState::ROLL, AnimTag::Roll),
    (PlayerState::MOVE, AnimTag::Run),
    (PlayerState::ATTACK1, AnimTag::Attack1),
    (PlayerState::ATTACK2, AnimTag::Attack2),
    (PlayerState::ATTACK3, AnimTag::Attack3),
];

/// Exactly one tag for any combination of flags.
pub fn select_tag(state: PlayerState) -> AnimTag {
    PRIORITY
        .iter()
        .find(|(flag, _)| state.contains(*flag))
        .map_or(AnimTag::Idle, |(_, tag)| *tag)
}

/// A resolved frame: where it came from and the pixels to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteFrame {
    /// Animation the frame belongs to
    pub tag: AnimTag,
    /// Index into the atlas frame list
    pub index: usize,
    /// Source rectangle in the atlas image
    pub rect: FrameRect,
}

impl SpriteFrame {
    /// Nothing to draw: the atlas lacks even the idle animation.
    pub const NONE: SpriteFrame = SpriteFrame {
        tag: AnimTag::Idle,
        index: 0,
        rect: FrameRect { x: 0, y: 0, w: 0, h: 0 },
    };
}

/// Picks the atlas frame for a player state, holding the tag names and frame
/// timing from [`SimConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationResolver {
    tags: AnimationTags,
    frame_ms: f32,
}

impl AnimationResolver {
    /// Resolver using `cfg`'s tag names and frame time.
    pub fn new(cfg: &SimConfig) -> Self {
        Self {
            tags: cfg.tags.clone(),
            frame_ms: cfg.frame_ms,
        }
    }

    /// Atlas name of `tag`.
    pub fn tag_name(&self, tag: AnimTag) -> &str {
        match tag {
            AnimTag::Fall => &self.tags.fall,
            AnimTag::Jump => &self.tags.jump,
            AnimTag::Roll => &self.tags.roll,
            AnimTag::Run => &self.tags.run,
            AnimTag::Attack1 => &self.tags.attack1,
            AnimTag::Attack2 => &self.tags.attack2,
            AnimTag::Attack3 => &self.tags.attack3,
            AnimTag::Idle => &self.tags.idle,
        }
    }

    /// Jump plays at double speed.
    #[inline]
    pub fn frame_duration(&self, tag: AnimTag) -> f32 {
        match tag {
            AnimTag::Jump => self.frame_ms / 2.0,
            _ => self.frame_ms,
        }
    }

    /// Frame for `state` after `elapsed_ms` on the shared animation clock.
    ///
    /// Animations loop. A missing tag is an error the caller decides how to
    /// report; see [`AnimationError`].
    pub fn resolve(
        &self,
        atlas: &SpriteAtlas,
        state: PlayerState,
        elapsed_ms: f32,
    ) -> Result<SpriteFrame, AnimationError> {
        self.resolve_tag(atlas, select_tag(state), elapsed_ms)
    }

    /// Frame of `tag` shown `elapsed_ms` after the clock reset, looping.
    pub fn resolve_tag(
        &self,
        atlas: &SpriteAtlas,
        tag: AnimTag,
        elapsed_ms: f32,
    ) -> Result<SpriteFrame, AnimationError> {
        let name = self.tag_name(tag);
        let range = atlas
            .tag(name)
            .ok_or_else(|| AnimationError::MissingTag(name.to_owned()))?;

        let step = (elapsed_ms.max(0.0) / self.frame_duration(tag)).floor() as usize;
        let index = range.from + step % range.frame_count();
        let rect = atlas
            .frames
            .get(index)
            .copied()
            .ok_or_else(|| AnimationError::FrameOutOfRange {
                tag: name.to_owned(),
                index,
                frames: atlas.frames.len(),
            })?;

        Ok(SpriteFrame { tag, index, rect })
    }
}
