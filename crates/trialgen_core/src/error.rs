//! Error types for the core crate

use thiserror::Error;
use trialgen_physics::ObjectCategory;

use crate::link::LinkError;
use crate::object::ObjectId;
use crate::response::BlockKind;

/// Errors from registering objects
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistryError {
    /// The id is already registered in this trial
    #[error("object id {0} is already registered")]
    DuplicateId(ObjectId),
    /// The id is not registered in this trial
    #[error("object id {0} is not registered")]
    UnknownId(ObjectId),
    /// Flex categories must be registered together with their actor parameters
    #[error("object {id} has flex category {category:?} but no actor parameters")]
    FlexWithoutActor { id: ObjectId, category: ObjectCategory },
}

/// Errors from decoding an engine response
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error("{kind} block truncated at byte {offset}: needed {needed} more bytes")]
    Truncated {
        kind: BlockKind,
        offset: usize,
        needed: usize,
    },
    #[error("{kind} block has {remaining} unread trailing bytes")]
    TrailingBytes { kind: BlockKind, remaining: usize },
    #[error("{kind} block has an invalid value: {reason}")]
    InvalidValue { kind: BlockKind, reason: String },
}

/// Errors from a single frame round trip
#[derive(Debug, Error)]
pub enum StepError {
    #[error("engine link failed: {0}")]
    Link(#[from] LinkError),
    #[error("malformed response: {0}")]
    Decode(#[from] DecodeError),
}

/// Errors raised by scenario hooks and the add-object helpers
#[derive(Debug, Error)]
pub enum TrialError {
    /// A default-physics add was requested for a model with no physics record
    #[error("no physics info for model '{model}'")]
    MissingPhysicsInfo { model: String },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Scenario-specific failure
    #[error("scenario error: {0}")]
    Scenario(String),
}
