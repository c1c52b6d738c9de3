//! Dataset flavors and the outputs each one requests

use bitflags::bitflags;
use serde::{Serialize, Deserialize};

use crate::command::{CollisionType, Command, EngineCommand, Frequency};

bitflags! {
    /// Per-frame outputs requested from the engine
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct OutputKinds: u32 {
        const TRANSFORMS = 1 << 0;
        const CAMERA_MATRICES = 1 << 1;
        const RIGIDBODIES = 1 << 2;
        const COLLISIONS = 1 << 3;
        const FLEX_PARTICLES = 1 << 4;
    }
}

/// What kind of dataset a scenario produces
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetFlavor {
    /// Transforms, camera matrices and images only
    Transforms,
    /// Adds velocities, sleep state, collisions and rigid static properties
    Rigidbodies,
    /// Adds flex particles and flex static parameters
    Flex,
}

impl DatasetFlavor {
    /// Outputs this flavor requests every frame
    pub fn outputs(self) -> OutputKinds {
        let base = OutputKinds::TRANSFORMS | OutputKinds::CAMERA_MATRICES;
        match self {
            DatasetFlavor::Transforms => base,
            DatasetFlavor::Rigidbodies => {
                base | OutputKinds::RIGIDBODIES | OutputKinds::COLLISIONS
            }
            DatasetFlavor::Flex => base | OutputKinds::FLEX_PARTICLES,
        }
    }

    /// Commands that turn on this flavor's per-frame outputs
    pub fn send_data_commands(self) -> Vec<Command> {
        let outputs = self.outputs();
        let mut commands = Vec::new();
        if outputs.contains(OutputKinds::TRANSFORMS) {
            commands.push(EngineCommand::SendTransforms { frequency: Frequency::Always }.into());
        }
        if outputs.contains(OutputKinds::CAMERA_MATRICES) {
            commands.push(
                EngineCommand::SendCameraMatrices {
                    frequency: Frequency::Always,
                }
                .into(),
            );
        }
        if outputs.contains(OutputKinds::COLLISIONS) {
            commands.push(
                EngineCommand::SendCollisions {
                    enter: true,
                    exit: false,
                    stay: false,
                    collision_types: vec![CollisionType::Obj, CollisionType::Env],
                }
                .into(),
            );
        }
        if outputs.contains(OutputKinds::RIGIDBODIES) {
            commands.push(EngineCommand::SendRigidbodies { frequency: Frequency::Always }.into());
        }
        if outputs.contains(OutputKinds::FLEX_PARTICLES) {
            commands.push(EngineCommand::SendFlexParticles { frequency: Frequency::Always }.into());
        }
        commands
    }

    /// Whether trials stop on their own once every object sleeps
    pub fn stops_when_sleeping(self) -> bool {
        matches!(self, DatasetFlavor::Rigidbodies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(flavor: DatasetFlavor) -> Vec<String> {
        flavor
            .send_data_commands()
            .iter()
            .filter_map(Command::type_name)
            .collect()
    }

    #[test]
    fn test_transforms_outputs() {
        assert_eq!(names(DatasetFlavor::Transforms), ["send_transforms", "send_camera_matrices"]);
    }

    #[test]
    fn test_rigidbodies_outputs() {
        let names = names(DatasetFlavor::Rigidbodies);
        assert!(names.contains(&"send_collisions".to_string()));
        assert!(names.contains(&"send_rigidbodies".to_string()));
        assert!(!names.contains(&"send_flex_particles".to_string()));
    }

    #[test]
    fn test_flex_outputs() {
        let outputs = DatasetFlavor::Flex.outputs();
        assert!(outputs.contains(OutputKinds::FLEX_PARTICLES));
        assert!(!outputs.contains(OutputKinds::RIGIDBODIES));
    }

    #[test]
    fn test_only_rigidbodies_stop_when_sleeping() {
        assert!(DatasetFlavor::Rigidbodies.stops_when_sleeping());
        assert!(!DatasetFlavor::Transforms.stops_when_sleeping());
        assert!(!DatasetFlavor::Flex.stops_when_sleeping());
    }
}
