//! Engine response blocks
//!
//! A response is a list of self-identifying blocks. Each block starts with a
//! four byte ASCII tag naming its kind; the payload is little-endian binary.
//! Blocks may arrive in any order, a kind may appear several times (one
//! collision block per collision) and absent kinds decode as empty.
//!
//! | tag    | payload |
//! |--------|---------|
//! | `tran` | `u32 n`, then n x (`i32 id`, `3f position`, `4f rotation`, `3f forward`) |
//! | `rigi` | `u32 n`, then n x (`i32 id`, `3f velocity`, `3f angular_velocity`, `u8 sleeping`) |
//! | `coll` | `i32 collider`, `i32 collidee`, `3f relative_velocity`, `u32 n`, n x contact |
//! | `enco` | `i32 object`, `u32 n`, n x contact |
//! | `cama` | `16f projection`, `16f camera` (column-major) |
//! | `imag` | `u32 n`, then n x (`u8 len`, pass name, `u32 width`, `u32 height`, `u32 size`, bytes) |
//! | `flex` | `u32 n`, then n x (`i32 id`, `u32 p`, p x `4f` particle, p x `3f` velocity) |
//!
//! A contact is `3f normal` followed by `3f point`.

mod decode;
mod encode;

use std::fmt;

use trialgen_math::Vec3;

use crate::frame::{
    CameraMatrices, CollisionEvent, EnvCollisionEvent, ImagePass, ObjectObservation,
    ParticleObservation,
};
use crate::object::ObjectId;

pub use decode::decode_response;
pub use encode::{
    encode_camera, encode_collision, encode_env_collision, encode_flex_particles, encode_images,
    encode_rigidbodies, encode_transforms,
};

/// One undecoded block as received from the engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawBlock {
    pub tag: [u8; 4],
    pub payload: Vec<u8>,
}

impl RawBlock {
    pub fn new(tag: [u8; 4], payload: Vec<u8>) -> Self {
        Self { tag, payload }
    }

    /// Kind of this block, if the tag is known
    pub fn kind(&self) -> Option<BlockKind> {
        BlockKind::from_tag(self.tag)
    }
}

/// Known block kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Transforms,
    Rigidbodies,
    Collision,
    EnvCollision,
    CameraMatrices,
    Images,
    FlexParticles,
}

impl BlockKind {
    pub const ALL: [BlockKind; 7] = [
        BlockKind::Transforms,
        BlockKind::Rigidbodies,
        BlockKind::Collision,
        BlockKind::EnvCollision,
        BlockKind::CameraMatrices,
        BlockKind::Images,
        BlockKind::FlexParticles,
    ];

    pub fn tag(self) -> [u8; 4] {
        match self {
            BlockKind::Transforms => *b"tran",
            BlockKind::Rigidbodies => *b"rigi",
            BlockKind::Collision => *b"coll",
            BlockKind::EnvCollision => *b"enco",
            BlockKind::CameraMatrices => *b"cama",
            BlockKind::Images => *b"imag",
            BlockKind::FlexParticles => *b"flex",
        }
    }

    pub fn from_tag(tag: [u8; 4]) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.tag();
        write!(f, "{}", String::from_utf8_lossy(&tag))
    }
}

/// Velocity and sleep state of one rigid body
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidbodyState {
    pub id: ObjectId,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub sleeping: bool,
}

/// All blocks of one response, decoded and merged by kind
///
/// Entries keep the order in which the engine sent them. Aligning them to
/// the canonical object order is the stepper's job.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedResponse {
    pub transforms: Vec<ObjectObservation>,
    pub rigidbodies: Vec<RigidbodyState>,
    pub collisions: Vec<CollisionEvent>,
    pub env_collisions: Vec<EnvCollisionEvent>,
    pub camera: Option<CameraMatrices>,
    pub images: Vec<ImagePass>,
    pub particles: Vec<ParticleObservation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for kind in BlockKind::ALL {
            assert_eq!(BlockKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(BlockKind::from_tag(*b"xxxx"), None);
    }

    #[test]
    fn test_display_is_tag() {
        assert_eq!(BlockKind::EnvCollision.to_string(), "enco");
    }
}
