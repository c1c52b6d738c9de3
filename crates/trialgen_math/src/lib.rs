//! Math types for trialgen
//!
//! The simulation engine reports and accepts vectors, rotations and camera
//! matrices as plain floats. These types keep that data `Pod` so it can be
//! handed to the dataset writer as flat slices.
//!
//! - [`Vec3`] - 3D vector, serialized as `{x, y, z}`
//! - [`Quat`] - rotation quaternion, serialized as `{x, y, z, w}`
//! - [`Mat4`] - 4x4 column-major matrix

mod vec3;
mod quat;
pub mod mat4;

pub use vec3::Vec3;
pub use quat::Quat;
pub use mat4::Mat4;
