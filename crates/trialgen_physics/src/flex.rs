//! Flex (particle-based) actor parameters
//!
//! These records are written to the static section of flex-flavor trials,
//! one block per actor kind, each keyed by its own object id array.

use serde::{Serialize, Deserialize};

/// Solid actor: a rigid shape sampled into particles
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolidActor {
    pub mass_scale: f32,
    pub mesh_expansion: f32,
    pub particle_spacing: f32,
}

impl Default for SolidActor {
    fn default() -> Self {
        Self {
            mass_scale: 1.0,
            mesh_expansion: 0.0,
            particle_spacing: 0.125,
        }
    }
}

/// Soft actor: particles held together by shape-matching clusters and links
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoftActor {
    pub mass_scale: f32,
    pub volume_sampling: f32,
    pub surface_sampling: f32,
    pub cluster_spacing: f32,
    pub cluster_radius: f32,
    pub cluster_stiffness: f32,
    pub link_radius: f32,
    pub link_stiffness: f32,
    pub particle_spacing: f32,
}

impl Default for SoftActor {
    fn default() -> Self {
        Self {
            mass_scale: 1.0,
            volume_sampling: 2.0,
            surface_sampling: 0.0,
            cluster_spacing: 0.2,
            cluster_radius: 0.2,
            cluster_stiffness: 0.2,
            link_radius: 0.1,
            link_stiffness: 0.5,
            particle_spacing: 0.02,
        }
    }
}

/// Cloth actor: a tessellated sheet of particles
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClothActor {
    pub mass_scale: f32,
    pub mesh_tesselation: i32,
    pub stretch_stiffness: f32,
    pub bend_stiffness: f32,
    pub tether_stiffness: f32,
    pub tether_give: f32,
    pub pressure: f32,
}

impl Default for ClothActor {
    fn default() -> Self {
        Self {
            mass_scale: 1.0,
            mesh_tesselation: 1,
            stretch_stiffness: 0.1,
            bend_stiffness: 0.1,
            tether_stiffness: 0.0,
            tether_give: 0.0,
            pressure: 0.0,
        }
    }
}

/// Fluid actor: free particles inside a fluid container
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FluidActor {
    pub mass_scale: f32,
    pub particle_spacing: f32,
}

impl Default for FluidActor {
    fn default() -> Self {
        Self {
            mass_scale: 1.0,
            particle_spacing: 0.05,
        }
    }
}

/// Parameters of any flex actor kind
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum FlexActor {
    Solid(SolidActor),
    Soft(SoftActor),
    Cloth(ClothActor),
    Fluid(FluidActor),
}

impl FlexActor {
    pub fn mass_scale(&self) -> f32 {
        match self {
            FlexActor::Solid(a) => a.mass_scale,
            FlexActor::Soft(a) => a.mass_scale,
            FlexActor::Cloth(a) => a.mass_scale,
            FlexActor::Fluid(a) => a.mass_scale,
        }
    }

    /// Static group name used in the dataset file
    pub fn group_name(&self) -> &'static str {
        match self {
            FlexActor::Solid(_) => "solid_actors",
            FlexActor::Soft(_) => "soft_actors",
            FlexActor::Cloth(_) => "cloth_actors",
            FlexActor::Fluid(_) => "fluid_actors",
        }
    }

    /// Named float fields of this actor in a stable order (the mass scale first)
    pub fn fields(&self) -> Vec<(&'static str, f32)> {
        match self {
            FlexActor::Solid(a) => vec![
                ("mass_scale", a.mass_scale),
                ("mesh_expansion", a.mesh_expansion),
                ("particle_spacing", a.particle_spacing),
            ],
            FlexActor::Soft(a) => vec![
                ("mass_scale", a.mass_scale),
                ("volume_sampling", a.volume_sampling),
                ("surface_sampling", a.surface_sampling),
                ("cluster_spacing", a.cluster_spacing),
                ("cluster_radius", a.cluster_radius),
                ("cluster_stiffness", a.cluster_stiffness),
                ("link_radius", a.link_radius),
                ("link_stiffness", a.link_stiffness),
                ("particle_spacing", a.particle_spacing),
            ],
            FlexActor::Cloth(a) => vec![
                ("mass_scale", a.mass_scale),
                ("mesh_tesselation", a.mesh_tesselation as f32),
                ("stretch_stiffness", a.stretch_stiffness),
                ("bend_stiffness", a.bend_stiffness),
                ("tether_stiffness", a.tether_stiffness),
                ("tether_give", a.tether_give),
                ("pressure", a.pressure),
            ],
            FlexActor::Fluid(a) => vec![
                ("mass_scale", a.mass_scale),
                ("particle_spacing", a.particle_spacing),
            ],
        }
    }
}

/// Flex container settings shared by every flex actor in a trial
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlexContainer {
    pub radius: f32,
    pub solid_rest: f32,
    pub fluid_rest: f32,
    pub static_friction: f32,
    pub dynamic_friction: f32,
    pub particle_friction: f32,
    pub collision_distance: f32,
    pub substep_count: i32,
    pub iteration_count: i32,
    pub damping: f32,
    pub drag: f32,
    pub lift: f32,
    pub viscosity: f32,
    pub cohesion: f32,
    pub surface_tension: f32,
}

impl Default for FlexContainer {
    fn default() -> Self {
        Self {
            radius: 0.1875,
            solid_rest: 0.125,
            fluid_rest: 0.1125,
            static_friction: 0.5,
            dynamic_friction: 0.5,
            particle_friction: 0.5,
            collision_distance: 0.0625,
            substep_count: 3,
            iteration_count: 8,
            damping: 1.0,
            drag: 0.0,
            lift: 0.0,
            viscosity: 0.0,
            cohesion: 0.025,
            surface_tension: 0.0,
        }
    }
}

impl FlexContainer {
    /// Named fields in a stable order for the static `container` group
    pub fn fields(&self) -> Vec<(&'static str, f32)> {
        vec![
            ("radius", self.radius),
            ("solid_rest", self.solid_rest),
            ("fluid_rest", self.fluid_rest),
            ("static_friction", self.static_friction),
            ("dynamic_friction", self.dynamic_friction),
            ("particle_friction", self.particle_friction),
            ("collision_distance", self.collision_distance),
            ("substep_count", self.substep_count as f32),
            ("iteration_count", self.iteration_count as f32),
            ("damping", self.damping),
            ("drag", self.drag),
            ("lift", self.lift),
            ("viscosity", self.viscosity),
            ("cohesion", self.cohesion),
            ("surface_tension", self.surface_tension),
        ]
    }
}
