//! Per-frame observations

use trialgen_math::{Mat4, Quat, Vec3};

use crate::object::ObjectId;

/// One object's state at a frame
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectObservation {
    pub id: ObjectId,
    pub position: Vec3,
    pub forward: Vec3,
    pub rotation: Quat,
    /// Present when rigidbody data was requested
    pub velocity: Option<Vec3>,
    pub angular_velocity: Option<Vec3>,
    pub sleeping: Option<bool>,
}

impl ObjectObservation {
    /// Observation with transform data only
    pub fn transform(id: ObjectId, position: Vec3, rotation: Quat, forward: Vec3) -> Self {
        Self {
            id,
            position,
            forward,
            rotation,
            velocity: None,
            angular_velocity: None,
            sleeping: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactPoint {
    pub normal: Vec3,
    pub point: Vec3,
}

/// Object-object collision that started this frame
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionEvent {
    pub collider: ObjectId,
    pub collidee: ObjectId,
    pub relative_velocity: Vec3,
    pub contacts: Vec<ContactPoint>,
}

/// Object-environment collision that started this frame
#[derive(Clone, Debug, PartialEq)]
pub struct EnvCollisionEvent {
    pub object: ObjectId,
    pub contacts: Vec<ContactPoint>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraMatrices {
    pub projection: Mat4,
    pub camera: Mat4,
}

/// One rendered image pass, stored as the engine encoded it
#[derive(Clone, Debug, PartialEq)]
pub struct ImagePass {
    /// Pass mask name, e.g. `_img`
    pub pass_mask: String,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Particle positions (x, y, z, inverse mass) and velocities of one flex object
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleObservation {
    pub id: ObjectId,
    pub particles: Vec<[f32; 4]>,
    pub velocities: Vec<Vec3>,
}

/// Everything observed at one frame
///
/// `objects` holds alive objects only, in canonical registry order.
/// `particles` follows the same order restricted to flex objects.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub index: u32,
    pub objects: Vec<ObjectObservation>,
    pub collisions: Vec<CollisionEvent>,
    pub env_collisions: Vec<EnvCollisionEvent>,
    pub camera: Option<CameraMatrices>,
    pub images: Vec<ImagePass>,
    pub particles: Vec<ParticleObservation>,
}

impl Frame {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    pub fn object(&self, id: ObjectId) -> Option<&ObjectObservation> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn image(&self, pass_mask: &str) -> Option<&ImagePass> {
        self.images.iter().find(|i| i.pass_mask == pass_mask)
    }
}
