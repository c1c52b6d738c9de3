//! Physics metadata for trialgen
//!
//! This crate owns everything the trial pipeline knows about physical
//! properties without talking to the engine:
//! - Default per-model physics values ([`PhysicsInfoCache`])
//! - Material values and semantic-material estimates
//! - Object categories (rigid, transform-only, flex, non-physics)
//! - Flex actor and container parameters

pub mod category;
pub mod flex;
pub mod material;
pub mod physics_info;

// Re-export commonly used types
pub use category::ObjectCategory;
pub use flex::{ClothActor, FlexActor, FlexContainer, FluidActor, SoftActor, SolidActor};
pub use material::{PhysicsMaterial, PhysicsProperties, SemanticMaterial};
pub use physics_info::{PhysicsInfo, PhysicsInfoCache, PhysicsInfoError};
