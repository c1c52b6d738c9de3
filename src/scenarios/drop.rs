//! Rigid-body drop: one primitive falls onto another

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::json;
use trialgen_core::{
    Command, DatasetFlavor, EngineCommand, Placement, Scenario, TrialContext, TrialError, Vec3,
};

use super::{load_scene, model, random_avatar_position, raw, uniform};
use crate::controller::AVATAR_ID;

/// Primitives with entries in the bundled physics table
const DROP_MODELS: [&str; 6] = ["sphere", "cube", "cylinder", "cone", "pyramid", "torus"];

pub struct DropScenario {
    rng: StdRng,
    model_url_base: String,
}

impl DropScenario {
    pub fn new(rng: StdRng, model_url_base: &str) -> Self {
        Self {
            rng,
            model_url_base: model_url_base.to_string(),
        }
    }

    fn pick_model(&mut self) -> &'static str {
        DROP_MODELS.choose(&mut self.rng).copied().unwrap_or(DROP_MODELS[0])
    }

    fn random_rotation(&mut self) -> Vec3 {
        Vec3::new(
            uniform(&mut self.rng, (0.0, 360.0)),
            uniform(&mut self.rng, (0.0, 360.0)),
            uniform(&mut self.rng, (0.0, 360.0)),
        )
    }
}

impl Scenario for DropScenario {
    fn name(&self) -> &str {
        "drop"
    }

    fn flavor(&self) -> DatasetFlavor {
        DatasetFlavor::Rigidbodies
    }

    fn scene_commands(&mut self) -> Vec<Command> {
        vec![
            load_scene("ProcGenScene"),
            raw(json!({"$type": "set_time_step", "time_step": 0.01})),
        ]
    }

    fn trial_commands(&mut self, ctx: &mut TrialContext<'_>) -> Result<Vec<Command>, TrialError> {
        let mut commands = Vec::new();

        let name = self.pick_model();
        let target = model(&self.model_url_base, name);
        let resting = Placement::at(Vec3::ZERO)
            .with_rotation(Vec3::new(0.0, uniform(&mut self.rng, (0.0, 360.0)), 0.0));
        let (_, add) = ctx.add_physics_object_default(&target, resting, None)?;
        commands.extend(add);

        let name = self.pick_model();
        let dropped = model(&self.model_url_base, name);
        let position = Vec3::new(
            uniform(&mut self.rng, (-0.2, 0.2)),
            uniform(&mut self.rng, (1.5, 2.5)),
            uniform(&mut self.rng, (-0.2, 0.2)),
        );
        let falling = Placement::at(position).with_rotation(self.random_rotation());
        let (_, add) = ctx.add_physics_object_default(&dropped, falling, None)?;
        commands.extend(add);

        let avatar = random_avatar_position(
            &mut self.rng,
            (1.5, 2.2),
            (0.8, 1.4),
            Vec3::ZERO,
            (0.0, 360.0),
        );
        commands.push(
            EngineCommand::TeleportAvatarTo {
                avatar_id: AVATAR_ID.to_string(),
                position: avatar,
            }
            .into(),
        );
        commands.push(
            EngineCommand::LookAtPosition {
                avatar_id: AVATAR_ID.to_string(),
                position: Vec3::new(0.0, 0.3, 0.0),
            }
            .into(),
        );
        Ok(commands)
    }
}
