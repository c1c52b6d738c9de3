//! Per-trial static data

use trialgen_physics::{FlexActor, FlexContainer};

use crate::flavor::DatasetFlavor;
use crate::object::ObjectId;

/// Rigid properties, one entry per object in `TrialStatic::object_ids`
///
/// Objects registered without properties get NaN.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RigidStatic {
    pub mass: Vec<f32>,
    pub static_friction: Vec<f32>,
    pub dynamic_friction: Vec<f32>,
    pub bounciness: Vec<f32>,
}

/// Flex container settings plus every flex actor in canonical order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlexStatic {
    pub container: Option<FlexContainer>,
    pub actors: Vec<(ObjectId, FlexActor)>,
}

impl FlexStatic {
    /// Actors grouped by kind, each group keeping canonical order
    ///
    /// Returns one `(group_name, actors)` pair per actor kind, in the order
    /// solid, soft, cloth, fluid. Kinds without actors get an empty list.
    pub fn grouped(&self) -> Vec<(&'static str, Vec<(ObjectId, FlexActor)>)> {
        let mut groups: Vec<(&'static str, Vec<(ObjectId, FlexActor)>)> =
            ["solid_actors", "soft_actors", "cloth_actors", "fluid_actors"]
                .into_iter()
                .map(|name| (name, Vec::new()))
                .collect();
        for (id, actor) in &self.actors {
            if let Some(group) = groups.iter_mut().find(|(name, _)| *name == actor.group_name()) {
                group.1.push((*id, *actor));
            }
        }
        groups
    }
}

/// Static block of one trial
#[derive(Clone, Debug, PartialEq)]
pub struct TrialStatic {
    pub flavor: DatasetFlavor,
    /// Every object registered during the trial, in canonical order
    pub object_ids: Vec<ObjectId>,
    /// Present for the rigidbodies flavor
    pub rigid: Option<RigidStatic>,
    /// Present for the flex flavor
    pub flex: Option<FlexStatic>,
}

impl TrialStatic {
    pub fn object_count(&self) -> usize {
        self.object_ids.len()
    }
}
