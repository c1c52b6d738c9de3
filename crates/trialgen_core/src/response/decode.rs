//! Block decoding

use trialgen_math::{Mat4, Quat, Vec3};

use super::{BlockKind, DecodedResponse, RawBlock, RigidbodyState};
use crate::error::DecodeError;
use crate::frame::{
    CameraMatrices, CollisionEvent, ContactPoint, EnvCollisionEvent, ImagePass, ObjectObservation,
    ParticleObservation,
};
use crate::object::ObjectId;

const CONTACT_SIZE: usize = 24;
const TRANSFORM_SIZE: usize = 4 + 12 + 16 + 12;
const RIGIDBODY_SIZE: usize = 4 + 12 + 12 + 1;

/// Decode and merge every block of one response
///
/// Blocks with an unknown tag are skipped with a warning.
pub fn decode_response(blocks: &[RawBlock]) -> Result<DecodedResponse, DecodeError> {
    let mut response = DecodedResponse::default();
    for block in blocks {
        let Some(kind) = block.kind() else {
            log::warn!(
                "Ignoring response block with unknown tag {:?}",
                String::from_utf8_lossy(&block.tag)
            );
            continue;
        };
        let mut reader = Reader::new(kind, &block.payload);
        match kind {
            BlockKind::Transforms => read_transforms(&mut reader, &mut response.transforms)?,
            BlockKind::Rigidbodies => read_rigidbodies(&mut reader, &mut response.rigidbodies)?,
            BlockKind::Collision => response.collisions.push(read_collision(&mut reader)?),
            BlockKind::EnvCollision => {
                response.env_collisions.push(read_env_collision(&mut reader)?)
            }
            BlockKind::CameraMatrices => {
                response.camera = Some(CameraMatrices {
                    projection: reader.mat4()?,
                    camera: reader.mat4()?,
                });
            }
            BlockKind::Images => read_images(&mut reader, &mut response.images)?,
            BlockKind::FlexParticles => read_particles(&mut reader, &mut response.particles)?,
        }
        reader.finish()?;
    }
    Ok(response)
}

fn read_transforms(
    r: &mut Reader<'_>,
    out: &mut Vec<ObjectObservation>,
) -> Result<(), DecodeError> {
    let n = r.count(TRANSFORM_SIZE)?;
    out.reserve(n);
    for _ in 0..n {
        let id = r.id()?;
        let position = r.vec3()?;
        let rotation = r.quat()?;
        let forward = r.vec3()?;
        out.push(ObjectObservation::transform(id, position, rotation, forward));
    }
    Ok(())
}

fn read_rigidbodies(r: &mut Reader<'_>, out: &mut Vec<RigidbodyState>) -> Result<(), DecodeError> {
    let n = r.count(RIGIDBODY_SIZE)?;
    out.reserve(n);
    for _ in 0..n {
        let id = r.id()?;
        let velocity = r.vec3()?;
        let angular_velocity = r.vec3()?;
        let sleeping = match r.u8()? {
            0 => false,
            1 => true,
            other => {
                return Err(DecodeError::InvalidValue {
                    kind: r.kind,
                    reason: format!("sleeping flag {other} for object {id}"),
                })
            }
        };
        out.push(RigidbodyState {
            id,
            velocity,
            angular_velocity,
            sleeping,
        });
    }
    Ok(())
}

fn read_contacts(r: &mut Reader<'_>) -> Result<Vec<ContactPoint>, DecodeError> {
    let n = r.count(CONTACT_SIZE)?;
    let mut contacts = Vec::with_capacity(n);
    for _ in 0..n {
        contacts.push(ContactPoint {
            normal: r.vec3()?,
            point: r.vec3()?,
        });
    }
    Ok(contacts)
}

fn read_collision(r: &mut Reader<'_>) -> Result<CollisionEvent, DecodeError> {
    Ok(CollisionEvent {
        collider: r.id()?,
        collidee: r.id()?,
        relative_velocity: r.vec3()?,
        contacts: read_contacts(r)?,
    })
}

fn read_env_collision(r: &mut Reader<'_>) -> Result<EnvCollisionEvent, DecodeError> {
    Ok(EnvCollisionEvent {
        object: r.id()?,
        contacts: read_contacts(r)?,
    })
}

fn read_images(r: &mut Reader<'_>, out: &mut Vec<ImagePass>) -> Result<(), DecodeError> {
    // smallest pass: empty name, zero-sized image
    let n = r.count(1 + 12)?;
    for _ in 0..n {
        let name_len = r.u8()? as usize;
        let name = r.bytes(name_len)?;
        let pass_mask = String::from_utf8(name.to_vec()).map_err(|_| DecodeError::InvalidValue {
            kind: r.kind,
            reason: "pass name is not valid UTF-8".to_string(),
        })?;
        let width = r.u32()?;
        let height = r.u32()?;
        let size = r.u32()? as usize;
        let data = r.bytes(size)?.to_vec();
        out.push(ImagePass {
            pass_mask,
            width,
            height,
            data,
        });
    }
    Ok(())
}

fn read_particles(
    r: &mut Reader<'_>,
    out: &mut Vec<ParticleObservation>,
) -> Result<(), DecodeError> {
    let n = r.count(8)?;
    for _ in 0..n {
        let id = r.id()?;
        let p = r.count(16 + 12)?;
        let mut particles = Vec::with_capacity(p);
        for _ in 0..p {
            particles.push([r.f32()?, r.f32()?, r.f32()?, r.f32()?]);
        }
        let mut velocities = Vec::with_capacity(p);
        for _ in 0..p {
            velocities.push(r.vec3()?);
        }
        out.push(ParticleObservation {
            id,
            particles,
            velocities,
        });
    }
    Ok(())
}

/// Little-endian cursor over one block payload
struct Reader<'a> {
    kind: BlockKind,
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(kind: BlockKind, bytes: &'a [u8]) -> Self {
        Self {
            kind,
            bytes,
            offset: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::Truncated {
                kind: self.kind,
                offset: self.offset,
                needed: len - self.remaining(),
            });
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.array::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn id(&mut self) -> Result<ObjectId, DecodeError> {
        Ok(ObjectId(i32::from_le_bytes(self.array()?)))
    }

    fn f32(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_le_bytes(self.array()?))
    }

    fn vec3(&mut self) -> Result<Vec3, DecodeError> {
        Ok(Vec3::new(self.f32()?, self.f32()?, self.f32()?))
    }

    fn quat(&mut self) -> Result<Quat, DecodeError> {
        Ok(Quat::new(self.f32()?, self.f32()?, self.f32()?, self.f32()?))
    }

    fn mat4(&mut self) -> Result<Mat4, DecodeError> {
        let mut m = [0.0f32; 16];
        for value in &mut m {
            *value = self.f32()?;
        }
        Ok(Mat4(m))
    }

    /// Read an element count and check the payload can hold that many
    /// elements of at least `min_size` bytes each
    fn count(&mut self, min_size: usize) -> Result<usize, DecodeError> {
        let n = self.u32()? as usize;
        let needed = n.saturating_mul(min_size);
        if needed > self.remaining() {
            return Err(DecodeError::Truncated {
                kind: self.kind,
                offset: self.offset,
                needed: needed - self.remaining(),
            });
        }
        Ok(n)
    }

    fn finish(&self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(DecodeError::TrailingBytes {
                kind: self.kind,
                remaining,
            }),
        }
    }
}
