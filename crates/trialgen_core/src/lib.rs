//! Core types for trialgen
//!
//! This crate provides the pieces of a trial that do not depend on how the
//! dataset is stored or how the engine is reached:
//!
//! - [`Command`] - Engine command, either a known variant or pre-built JSON
//! - [`ObjectRegistry`] - Trial-scoped object bookkeeping and cleanup
//! - [`Frame`] - One frame's observations aligned to canonical object order
//! - [`RawBlock`] / [`decode_response`] - Tagged response blocks from the engine
//! - [`EngineLink`] - Request/response channel to the engine
//! - [`FrameStepper`] - One round trip per frame plus the stop predicate
//! - [`Scenario`] / [`TrialContext`] - Scenario hooks and add-object helpers

mod command;
mod error;
mod flavor;
mod frame;
mod link;
mod object;
mod registry;
pub mod response;
mod scenario;
mod stepper;
mod trial;

pub use command::{Command, CollisionType, EngineCommand, Frequency};
pub use error::{DecodeError, RegistryError, StepError, TrialError};
pub use flavor::{DatasetFlavor, OutputKinds};
pub use frame::{
    CameraMatrices, CollisionEvent, ContactPoint, EnvCollisionEvent, Frame, ImagePass,
    ObjectObservation, ParticleObservation,
};
pub use link::{EngineLink, LinkError};
pub use object::{ModelRecord, ObjectId, ObjectRecord, Placement};
pub use registry::ObjectRegistry;
pub use response::{decode_response, BlockKind, DecodedResponse, RawBlock};
pub use scenario::{Scenario, TrialContext};
pub use stepper::{FrameStepper, StopReason, TerminationPolicy, DEFAULT_FLOOR_Y, DEFAULT_FRAME_CAP};
pub use trial::{FlexStatic, RigidStatic, TrialStatic};

// Re-export physics and math types for convenient access through trialgen_core
pub use trialgen_math::{Mat4, Quat, Vec3};
pub use trialgen_physics::{
    ClothActor, FlexActor, FlexContainer, FluidActor, ObjectCategory, PhysicsInfo,
    PhysicsInfoCache, PhysicsMaterial, PhysicsProperties, SoftActor, SolidActor,
};
