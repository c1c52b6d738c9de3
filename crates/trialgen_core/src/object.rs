//! Object identifiers, model records and registry entries

use std::fmt;

use serde::{Serialize, Deserialize};
use trialgen_math::Vec3;
use trialgen_physics::{FlexActor, ObjectCategory, PhysicsProperties};

/// Engine-side object identifier
///
/// Unique within a trial. Generated identifiers are also unique across the
/// whole engine session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub i32);

impl ObjectId {
    /// Get the raw engine value
    #[inline]
    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Model metadata needed to spawn an object
///
/// Supplied by the model library; the pipeline only forwards it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub name: String,
    /// Asset bundle location
    pub url: String,
    #[serde(default = "default_scale")]
    pub scale_factor: f32,
    /// Semantic category label of the model
    #[serde(default)]
    pub category: String,
}

fn default_scale() -> f32 {
    1.0
}

impl ModelRecord {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            scale_factor: 1.0,
            category: String::new(),
        }
    }

    pub fn with_scale_factor(mut self, scale_factor: f32) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// Initial position and Euler rotation (degrees) of a new object
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Placement {
    pub fn at(position: Vec3) -> Self {
        Self { position, rotation: Vec3::ZERO }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Everything the registry keeps about one object of the current trial
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectRecord {
    pub id: ObjectId,
    pub category: ObjectCategory,
    /// Mass and material (rigid objects only)
    pub properties: Option<PhysicsProperties>,
    /// Actor parameters (flex objects only)
    pub flex: Option<FlexActor>,
}
