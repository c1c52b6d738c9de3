//! Flex cloth draped over a solid object

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::json;
use trialgen_core::{
    ClothActor, Command, DatasetFlavor, EngineCommand, FlexContainer, Frame, ObjectId, Placement,
    Scenario, SolidActor, TrialContext, TrialError, Vec3,
};

use super::{load_scene, model, raw, uniform};
use crate::controller::AVATAR_ID;

const DRAPE_MODELS: [&str; 5] = ["bowl", "cup", "vase_02", "suitcase", "soccer_ball"];

/// Frame index after which a drape trial ends
const LAST_FRAME: u32 = 150;

/// Physics frames that let the solid settle before the cloth is added
const SETTLE_FRAMES: u32 = 100;

const TARGET: Vec3 = Vec3::new(-1.2, 0.0, -1.6);

pub struct DrapeScenario {
    rng: StdRng,
    model_url_base: String,
    container: FlexContainer,
    cloth: Option<ObjectId>,
}

impl DrapeScenario {
    pub fn new(rng: StdRng, model_url_base: &str) -> Self {
        Self {
            rng,
            model_url_base: model_url_base.to_string(),
            container: FlexContainer {
                collision_distance: 0.001,
                static_friction: 1.0,
                dynamic_friction: 1.0,
                iteration_count: 12,
                substep_count: 12,
                radius: 0.1875,
                damping: 0.25,
                drag: 0.0,
                ..FlexContainer::default()
            },
            cloth: None,
        }
    }
}

impl Scenario for DrapeScenario {
    fn name(&self) -> &str {
        "drape"
    }

    fn flavor(&self) -> DatasetFlavor {
        DatasetFlavor::Flex
    }

    fn field_of_view(&self) -> f32 {
        65.0
    }

    fn scene_commands(&mut self) -> Vec<Command> {
        vec![
            load_scene("tdw_room_2018"),
            raw(json!({"$type": "set_aperture", "aperture": 3.0})),
            raw(json!({"$type": "set_focus_distance", "focus_distance": 2.25})),
            raw(json!({"$type": "set_post_exposure", "post_exposure": 0.4})),
            raw(json!({"$type": "set_ambient_occlusion_intensity", "intensity": 0.25})),
            EngineCommand::CreateFlexContainer {
                container: self.container,
            }
            .into(),
            raw(json!({"$type": "set_time_step", "time_step": 0.03})),
        ]
    }

    fn trial_commands(&mut self, ctx: &mut TrialContext<'_>) -> Result<Vec<Command>, TrialError> {
        // The container is created once per scene but recorded with every trial
        ctx.registry.set_flex_container(self.container);

        let mut commands: Vec<Command> = vec![
            EngineCommand::TeleportAvatarTo {
                avatar_id: AVATAR_ID.to_string(),
                position: Vec3::new(2.0, 1.0, 1.0),
            }
            .into(),
            EngineCommand::LookAtPosition {
                avatar_id: AVATAR_ID.to_string(),
                position: Vec3::new(TARGET.x, 0.5, TARGET.z),
            }
            .into(),
        ];

        let name = DRAPE_MODELS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(DRAPE_MODELS[0]);
        let solid = Placement::at(TARGET)
            .with_rotation(Vec3::new(0.0, uniform(&mut self.rng, (0.0, 360.0)), 0.0));
        let actor = SolidActor {
            mass_scale: 500.0,
            mesh_expansion: 0.0,
            particle_spacing: 0.035,
        };
        let model_record = model(&self.model_url_base, name);
        let (_, add) = ctx.add_solid_object(&model_record, solid, None, actor, None)?;
        commands.extend(add);
        commands.push(EngineCommand::StepPhysics { frames: SETTLE_FRAMES }.into());

        let cloth = ClothActor {
            mass_scale: 1.0,
            mesh_tesselation: 1,
            tether_stiffness: uniform(&mut self.rng, (0.5, 1.0)),
            bend_stiffness: uniform(&mut self.rng, (0.5, 1.0)),
            stretch_stiffness: uniform(&mut self.rng, (0.5, 1.0)),
            ..ClothActor::default()
        };
        let above = Placement::at(Vec3::new(TARGET.x, 2.0, TARGET.z));
        let (id, add) = ctx.add_cloth_object(
            &model(&self.model_url_base, "cloth_square"),
            above,
            None,
            cloth,
            None,
        )?;
        commands.extend(add);
        self.cloth = Some(id);
        Ok(commands)
    }

    fn per_frame_commands(
        &mut self,
        _ctx: &mut TrialContext<'_>,
        _frame: &Frame,
    ) -> Result<Vec<Command>, TrialError> {
        Ok(self
            .cloth
            .map(|id| raw(json!({"$type": "focus_on_object", "object_id": id})))
            .into_iter()
            .collect())
    }

    fn is_done(&mut self, frame: &Frame) -> Option<bool> {
        Some(frame.index > LAST_FRAME)
    }
}
