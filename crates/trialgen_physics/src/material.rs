//! Physical material properties sent with rigid objects

use serde::{Serialize, Deserialize};

/// Physic material values applied to a rigid body
///
/// Friction and bounciness follow the engine's conventions: frictions are
/// non-negative, bounciness is in [0.0, 1.0].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    /// Friction while sliding
    pub dynamic_friction: f32,
    /// Friction at rest
    pub static_friction: f32,
    /// Restitution (0.0 = no bounce, 1.0 = perfect bounce)
    pub bounciness: f32,
}

impl PhysicsMaterial {
    /// Create a material, clamping bounciness to [0.0, 1.0] and frictions to >= 0
    pub fn new(dynamic_friction: f32, static_friction: f32, bounciness: f32) -> Self {
        Self {
            dynamic_friction: dynamic_friction.max(0.0),
            static_friction: static_friction.max(0.0),
            bounciness: bounciness.clamp(0.0, 1.0),
        }
    }
}

/// Everything recorded about a rigid object's physics: mass plus material
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsProperties {
    pub mass: f32,
    pub material: PhysicsMaterial,
}

impl PhysicsProperties {
    pub fn new(mass: f32, material: PhysicsMaterial) -> Self {
        Self { mass, material }
    }
}

/// Semantic material of a model, used to estimate default physics values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticMaterial {
    Ceramic,
    Concrete,
    Fabric,
    Glass,
    Leather,
    Metal,
    Plastic,
    Rubber,
    Stone,
    Wood,
    Paper,
    Organic,
}

impl SemanticMaterial {
    pub const ALL: [SemanticMaterial; 12] = [
        SemanticMaterial::Ceramic,
        SemanticMaterial::Concrete,
        SemanticMaterial::Fabric,
        SemanticMaterial::Glass,
        SemanticMaterial::Leather,
        SemanticMaterial::Metal,
        SemanticMaterial::Plastic,
        SemanticMaterial::Rubber,
        SemanticMaterial::Stone,
        SemanticMaterial::Wood,
        SemanticMaterial::Paper,
        SemanticMaterial::Organic,
    ];

    /// Density in kg/m^3 (engine-scaled)
    pub fn density(self) -> f32 {
        match self {
            SemanticMaterial::Ceramic => 218.0,
            SemanticMaterial::Concrete => 200.0,
            SemanticMaterial::Fabric => 42.0,
            SemanticMaterial::Glass => 250.0,
            SemanticMaterial::Leather => 860.0,
            SemanticMaterial::Metal => 845.0,
            SemanticMaterial::Organic => 100.0,
            SemanticMaterial::Paper => 70.0,
            SemanticMaterial::Plastic => 145.0,
            SemanticMaterial::Rubber => 119.0,
            SemanticMaterial::Stone => 246.0,
            SemanticMaterial::Wood => 690.0,
        }
    }

    /// Typical physic material for this semantic material
    pub fn material(self) -> PhysicsMaterial {
        let (dynamic_friction, static_friction, bounciness) = match self {
            SemanticMaterial::Ceramic => (0.47, 0.47, 0.625),
            SemanticMaterial::Concrete => (0.49, 0.56, 0.2),
            SemanticMaterial::Fabric => (0.48, 0.48, 0.05),
            SemanticMaterial::Glass => (0.45, 0.65, 0.5),
            SemanticMaterial::Leather => (0.47, 0.47, 0.1),
            SemanticMaterial::Metal => (0.43, 0.52, 0.35),
            SemanticMaterial::Organic => (0.47, 0.47, 0.1),
            SemanticMaterial::Paper => (0.47, 0.47, 0.05),
            SemanticMaterial::Plastic => (0.44, 0.48, 0.7),
            SemanticMaterial::Rubber => (0.47, 0.47, 0.7),
            SemanticMaterial::Stone => (0.48, 0.48, 0.2),
            SemanticMaterial::Wood => (0.35, 0.4, 0.58),
        };
        PhysicsMaterial { dynamic_friction, static_friction, bounciness }
    }

    /// Best-guess physics properties for an object of the given volume
    pub fn estimate(self, volume: f32) -> PhysicsProperties {
        PhysicsProperties::new(volume * self.density(), self.material())
    }
}
