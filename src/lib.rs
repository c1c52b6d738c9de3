//! trialgen - labeled physics-trial datasets from an external simulation engine
//!
//! The binary connects to the engine, picks a scenario from the configuration
//! and runs trials through [`TrialController`]. Each trial is written to its
//! own zip archive of NPY arrays.

pub mod config;
pub mod controller;
pub mod error;
pub mod scenarios;

pub use config::{AppConfig, ConfigError};
pub use controller::{ControllerState, RunSummary, TrialController, TrialSummary};
pub use error::RunError;
