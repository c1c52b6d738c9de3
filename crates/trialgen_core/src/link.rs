//! Engine link
//!
//! The engine is reached through a blocking request/response channel: one
//! batch of commands out, one list of tagged blocks back.

use thiserror::Error;

use crate::command::Command;
use crate::response::RawBlock;

/// Errors from the engine channel
///
/// Every variant is fatal to the whole run.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize commands: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("engine protocol violation: {0}")]
    Protocol(String),
    #[error("engine disconnected")]
    Disconnected,
}

/// Request/response channel to the simulation engine
pub trait EngineLink {
    /// Send one command batch and wait for the engine's response
    ///
    /// An empty batch still advances the engine by one frame.
    fn communicate(&mut self, commands: &[Command]) -> Result<Vec<RawBlock>, LinkError>;
}

impl<T: EngineLink + ?Sized> EngineLink for &mut T {
    fn communicate(&mut self, commands: &[Command]) -> Result<Vec<RawBlock>, LinkError> {
        (**self).communicate(commands)
    }
}

impl<T: EngineLink + ?Sized> EngineLink for Box<T> {
    fn communicate(&mut self, commands: &[Command]) -> Result<Vec<RawBlock>, LinkError> {
        (**self).communicate(commands)
    }
}
