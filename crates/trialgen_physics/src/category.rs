//! Object categories

use serde::{Serialize, Deserialize};

/// How an object is represented in the engine
///
/// The category decides which destroy command cleans the object up and which
/// static arrays it contributes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectCategory {
    /// Rigid body with mass and a physic material
    Rigid,
    /// Engine object observed only through its transform
    TransformOnly,
    /// Flex solid actor
    FlexSolid,
    /// Flex soft body actor
    FlexSoft,
    /// Flex cloth actor
    FlexCloth,
    /// Flex fluid actor
    FlexFluid,
    /// Scenery with no physics metadata
    NonPhysics,
}

impl ObjectCategory {
    /// Whether this object lives in a flex container
    pub fn is_flex(self) -> bool {
        matches!(
            self,
            ObjectCategory::FlexSolid
                | ObjectCategory::FlexSoft
                | ObjectCategory::FlexCloth
                | ObjectCategory::FlexFluid
        )
    }

    /// Whether this object carries mass and friction values
    pub fn has_rigid_properties(self) -> bool {
        self == ObjectCategory::Rigid
    }
}
