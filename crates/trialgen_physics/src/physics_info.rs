//! Default physics values per model
//!
//! The [`PhysicsInfoCache`] is loaded once at startup from a bundled RON
//! table and is read-only afterwards. Share it with `Arc` wherever lookups
//! are needed.
//!
//! Most models have no entry. [`PhysicsInfoCache::lookup`] returns `None`
//! for them and never substitutes a default record; callers decide whether
//! to fall back to their own values or fail.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::material::{PhysicsMaterial, PhysicsProperties};

/// Bundled default table
const BUNDLED_TABLE: &str = include_str!("../data/physics_info.ron");

/// Default physics record for one model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsInfo {
    /// Model name; filled from the table key on load
    #[serde(default, skip_serializing)]
    pub name: String,
    /// Model library the record refers to
    pub library: String,
    pub mass: f32,
    pub dynamic_friction: f32,
    pub static_friction: f32,
    pub bounciness: f32,
}

impl PhysicsInfo {
    /// Mass and material as sent to the engine
    pub fn properties(&self) -> PhysicsProperties {
        PhysicsProperties::new(
            self.mass,
            PhysicsMaterial {
                dynamic_friction: self.dynamic_friction,
                static_friction: self.static_friction,
                bounciness: self.bounciness,
            },
        )
    }
}

/// Error loading a physics table
#[derive(Debug, Error)]
pub enum PhysicsInfoError {
    /// IO error (file not found, permission denied, etc.)
    #[error("physics table IO error: {0}")]
    Io(#[from] io::Error),
    /// Parse error (invalid RON syntax or shape)
    #[error("physics table parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// A record has values the engine would reject
    #[error("invalid physics record for '{name}': {reason}")]
    Invalid { name: String, reason: String },
}

/// Immutable model-name -> [`PhysicsInfo`] lookup table
#[derive(Clone, Debug, Default)]
pub struct PhysicsInfoCache {
    records: HashMap<String, PhysicsInfo>,
}

impl PhysicsInfoCache {
    /// Load the table bundled with this crate
    pub fn bundled() -> Result<Self, PhysicsInfoError> {
        Self::from_ron_str(BUNDLED_TABLE)
    }

    /// Load a table from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PhysicsInfoError> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Parse a table from RON text: a map of model name to record
    pub fn from_ron_str(contents: &str) -> Result<Self, PhysicsInfoError> {
        let raw: HashMap<String, PhysicsInfo> = ron::from_str(contents)?;
        let mut records = HashMap::with_capacity(raw.len());
        for (name, mut info) in raw {
            validate(&name, &info)?;
            info.name = name.clone();
            records.insert(name, info);
        }
        log::debug!("Loaded default physics info for {} models", records.len());
        Ok(Self { records })
    }

    /// Default physics record for a model, or `None` if the table has none
    pub fn lookup(&self, model_name: &str) -> Option<&PhysicsInfo> {
        self.records.get(model_name)
    }

    /// Check whether a model has a default record
    pub fn contains(&self, model_name: &str) -> bool {
        self.records.contains_key(model_name)
    }

    /// Number of models in the table
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Model names in the table, sorted
    pub fn model_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.records.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn validate(name: &str, info: &PhysicsInfo) -> Result<(), PhysicsInfoError> {
    let invalid = |reason: &str| PhysicsInfoError::Invalid {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    if !(info.mass.is_finite() && info.mass > 0.0) {
        return Err(invalid("mass must be positive"));
    }
    if info.dynamic_friction < 0.0 || info.static_friction < 0.0 {
        return Err(invalid("friction must be non-negative"));
    }
    if !(0.0..=1.0).contains(&info.bounciness) {
        return Err(invalid("bounciness must be within [0, 1]"));
    }
    Ok(())
}
