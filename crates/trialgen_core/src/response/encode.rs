//! Block encoding
//!
//! The engine produces these blocks itself. Encoders exist so that scripted
//! engines and tests can build responses in the same wire form.

use trialgen_math::Vec3;

use super::{BlockKind, RawBlock, RigidbodyState};
use crate::frame::{
    CameraMatrices, CollisionEvent, ContactPoint, EnvCollisionEvent, ImagePass, ObjectObservation,
    ParticleObservation,
};

#[derive(Default)]
struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    fn u8(&mut self, v: u8) {
        self.bytes.push(v);
    }

    fn u32(&mut self, v: u32) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    fn count(&mut self, n: usize) {
        self.u32(n as u32);
    }

    fn i32(&mut self, v: i32) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    fn f32s(&mut self, values: &[f32]) {
        for v in values {
            self.bytes.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn vec3(&mut self, v: Vec3) {
        self.f32s(&v.to_array());
    }

    fn contacts(&mut self, contacts: &[ContactPoint]) {
        self.count(contacts.len());
        for c in contacts {
            self.vec3(c.normal);
            self.vec3(c.point);
        }
    }

    fn finish(self, kind: BlockKind) -> RawBlock {
        RawBlock::new(kind.tag(), self.bytes)
    }
}

pub fn encode_transforms(objects: &[ObjectObservation]) -> RawBlock {
    let mut w = Writer::default();
    w.count(objects.len());
    for o in objects {
        w.i32(o.id.get());
        w.vec3(o.position);
        w.f32s(&o.rotation.to_array());
        w.vec3(o.forward);
    }
    w.finish(BlockKind::Transforms)
}

pub fn encode_rigidbodies(states: &[RigidbodyState]) -> RawBlock {
    let mut w = Writer::default();
    w.count(states.len());
    for s in states {
        w.i32(s.id.get());
        w.vec3(s.velocity);
        w.vec3(s.angular_velocity);
        w.u8(s.sleeping as u8);
    }
    w.finish(BlockKind::Rigidbodies)
}

pub fn encode_collision(event: &CollisionEvent) -> RawBlock {
    let mut w = Writer::default();
    w.i32(event.collider.get());
    w.i32(event.collidee.get());
    w.vec3(event.relative_velocity);
    w.contacts(&event.contacts);
    w.finish(BlockKind::Collision)
}

pub fn encode_env_collision(event: &EnvCollisionEvent) -> RawBlock {
    let mut w = Writer::default();
    w.i32(event.object.get());
    w.contacts(&event.contacts);
    w.finish(BlockKind::EnvCollision)
}

pub fn encode_camera(camera: &CameraMatrices) -> RawBlock {
    let mut w = Writer::default();
    w.f32s(camera.projection.as_slice());
    w.f32s(camera.camera.as_slice());
    w.finish(BlockKind::CameraMatrices)
}

/// Pass names longer than 255 bytes are cut
pub fn encode_images(passes: &[ImagePass]) -> RawBlock {
    let mut w = Writer::default();
    w.count(passes.len());
    for pass in passes {
        let name = pass.pass_mask.as_bytes();
        let name = &name[..name.len().min(u8::MAX as usize)];
        w.u8(name.len() as u8);
        w.bytes.extend_from_slice(name);
        w.u32(pass.width);
        w.u32(pass.height);
        w.count(pass.data.len());
        w.bytes.extend_from_slice(&pass.data);
    }
    w.finish(BlockKind::Images)
}

pub fn encode_flex_particles(objects: &[ParticleObservation]) -> RawBlock {
    let mut w = Writer::default();
    w.count(objects.len());
    for o in objects {
        w.i32(o.id.get());
        w.count(o.particles.len());
        for p in &o.particles {
            w.f32s(p);
        }
        for v in &o.velocities {
            w.vec3(*v);
        }
    }
    w.finish(BlockKind::FlexParticles)
}
