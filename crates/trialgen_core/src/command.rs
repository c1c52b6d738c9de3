//! Engine commands
//!
//! Commands are JSON objects whose `"$type"` field names the engine
//! operation. The variants the pipeline itself needs are typed; scenarios
//! may also hand over any other command as pre-built JSON.

use serde::Serialize;
use serde_json::Value;

use trialgen_math::Vec3;
use trialgen_physics::{ClothActor, FlexContainer, FluidActor, SoftActor, SolidActor};

use crate::object::ObjectId;

/// How often the engine should send a given output
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Once,
    Always,
    Never,
}

/// Collision kinds reported by `send_collisions`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionType {
    /// Object-object
    Obj,
    /// Object-environment
    Env,
}

/// Typed engine commands
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "$type", rename_all = "snake_case")]
pub enum EngineCommand {
    // Objects
    AddObject {
        id: ObjectId,
        name: String,
        url: String,
        position: Vec3,
        rotation: Vec3,
        scale_factor: f32,
        category: String,
    },
    SetMass {
        id: ObjectId,
        mass: f32,
    },
    SetPhysicMaterial {
        id: ObjectId,
        dynamic_friction: f32,
        static_friction: f32,
        bounciness: f32,
    },
    SetObjectCollisionDetectionMode {
        id: ObjectId,
        mode: String,
    },
    ScaleObject {
        id: ObjectId,
        scale_factor: Vec3,
    },
    DestroyObject {
        id: ObjectId,
    },
    DestroyFlexObject {
        id: ObjectId,
    },

    // Flex
    SetFlexSolidActor {
        id: ObjectId,
        #[serde(flatten)]
        actor: SolidActor,
    },
    SetFlexSoftActor {
        id: ObjectId,
        #[serde(flatten)]
        actor: SoftActor,
    },
    SetFlexClothActor {
        id: ObjectId,
        #[serde(flatten)]
        actor: ClothActor,
    },
    SetFlexFluidActor {
        id: ObjectId,
        #[serde(flatten)]
        actor: FluidActor,
    },
    AssignFlexContainer {
        id: ObjectId,
        container_id: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        fluid_container: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        fluid_type: Option<String>,
    },
    LoadFlexFluidFromResources {
        id: ObjectId,
        orientation: Vec3,
        position: Vec3,
    },
    CreateFlexContainer {
        #[serde(flatten)]
        container: FlexContainer,
    },
    StepPhysics {
        frames: u32,
    },

    // Output requests
    SendTransforms {
        frequency: Frequency,
    },
    SendCameraMatrices {
        frequency: Frequency,
    },
    SendRigidbodies {
        frequency: Frequency,
    },
    SendFlexParticles {
        frequency: Frequency,
    },
    SendImages {
        frequency: Frequency,
    },
    SendCollisions {
        enter: bool,
        exit: bool,
        stay: bool,
        collision_types: Vec<CollisionType>,
    },

    // Scene
    SetScreenSize {
        width: u32,
        height: u32,
    },
    SetRenderQuality {
        render_quality: u32,
    },
    SetPhysicsSolverIterations {
        iterations: u32,
    },
    SetVignette {
        enabled: bool,
    },
    SetShadowStrength {
        strength: f32,
    },
    SetSleepThreshold {
        sleep_threshold: f32,
    },
    CreateAvatar {
        #[serde(rename = "type")]
        avatar_type: String,
        id: String,
    },
    TeleportAvatarTo {
        avatar_id: String,
        position: Vec3,
    },
    LookAtPosition {
        avatar_id: String,
        position: Vec3,
    },
    SetPassMasks {
        avatar_id: String,
        pass_masks: Vec<String>,
    },
    SetFieldOfView {
        avatar_id: String,
        field_of_view: f32,
    },
    UnloadAssetBundles,
    Terminate,
}

impl EngineCommand {
    /// Engine-side name of this command (the `"$type"` value)
    pub fn type_name(&self) -> String {
        serde_json::to_value(self)
            .ok()
            .and_then(|v| v.get("$type").and_then(Value::as_str).map(str::to_owned))
            .unwrap_or_default()
    }
}

/// A command ready to be sent to the engine
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Command {
    Engine(EngineCommand),
    /// Any other command, already in engine JSON form
    Custom(Value),
}

impl Command {
    /// Build a command from arbitrary JSON
    ///
    /// The value is sent unchanged, so it must carry its own `"$type"`.
    pub fn custom(value: Value) -> Self {
        Command::Custom(value)
    }

    /// Engine-side name of this command, if it has one
    pub fn type_name(&self) -> Option<String> {
        match self {
            Command::Engine(cmd) => Some(cmd.type_name()),
            Command::Custom(value) => value.get("$type").and_then(Value::as_str).map(str::to_owned),
        }
    }
}

impl From<EngineCommand> for Command {
    fn from(cmd: EngineCommand) -> Self {
        Command::Engine(cmd)
    }
}
