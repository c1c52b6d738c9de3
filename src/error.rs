//! Run-level errors

use std::io;

use thiserror::Error;
use trialgen_core::{LinkError, StepError, TrialError};
use trialgen_output::WriterError;
use trialgen_physics::PhysicsInfoError;

use crate::config::ConfigError;
use crate::controller::ControllerState;

/// Errors that end a trial or the whole run
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to load physics table: {0}")]
    Physics(#[from] PhysicsInfoError),
    #[error("output directory error: {0}")]
    Output(#[from] io::Error),
    /// Engine failure outside a frame round trip
    #[error("engine link failed: {0}")]
    Link(#[from] LinkError),
    #[error("trial {trial}, frame {frame}: {source}")]
    Step {
        trial: u32,
        frame: u32,
        #[source]
        source: StepError,
    },
    #[error("trial {trial}{}: {source}", .frame.map(|f| format!(", frame {f}")).unwrap_or_default())]
    Trial {
        trial: u32,
        frame: Option<u32>,
        #[source]
        source: TrialError,
    },
    #[error("trial {trial}: failed to write dataset: {source}")]
    Writer {
        trial: u32,
        #[source]
        source: WriterError,
    },
    #[error("controller is {actual:?}, expected {expected:?}")]
    State {
        expected: ControllerState,
        actual: ControllerState,
    },
}

impl RunError {
    /// Whether the whole run must stop
    ///
    /// Trial-fatal errors (malformed responses, scenario and registry errors)
    /// leave the engine connection usable.
    pub fn is_run_fatal(&self) -> bool {
        match self {
            RunError::Step { source, .. } => matches!(source, StepError::Link(_)),
            RunError::Trial { .. } => false,
            _ => true,
        }
    }

    /// Trial index the error belongs to, if any
    pub fn trial(&self) -> Option<u32> {
        match self {
            RunError::Step { trial, .. }
            | RunError::Trial { trial, .. }
            | RunError::Writer { trial, .. } => Some(*trial),
            _ => None,
        }
    }
}
