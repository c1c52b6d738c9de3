//! Scenario hooks and add-object helpers
//!
//! A [`Scenario`] supplies the commands that make one kind of trial: scene
//! setup, per-trial setup, optional per-frame commands and an optional stop
//! predicate. Objects are added through [`TrialContext`], which registers them
//! and returns the engine commands that create them.

use trialgen_math::Vec3;
use trialgen_physics::{
    ClothActor, FlexActor, FlexContainer, FluidActor, ObjectCategory, PhysicsInfoCache,
    PhysicsProperties, SoftActor, SolidActor,
};

use crate::command::{Command, EngineCommand};
use crate::error::TrialError;
use crate::flavor::DatasetFlavor;
use crate::frame::Frame;
use crate::object::{ModelRecord, ObjectId, Placement};
use crate::registry::ObjectRegistry;

/// Capabilities a scenario provides to the trial controller
pub trait Scenario {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Kind of dataset this scenario produces
    fn flavor(&self) -> DatasetFlavor;

    /// Camera field of view in degrees
    fn field_of_view(&self) -> f32 {
        55.0
    }

    /// Scenario-specific scene commands, sent once per run
    fn scene_commands(&mut self) -> Vec<Command>;

    /// Commands that set up one trial
    fn trial_commands(&mut self, ctx: &mut TrialContext<'_>) -> Result<Vec<Command>, TrialError>;

    /// Commands sent with the request for the next frame
    ///
    /// `frame` is the frame just recorded. Objects may be added here too.
    fn per_frame_commands(
        &mut self,
        _ctx: &mut TrialContext<'_>,
        _frame: &Frame,
    ) -> Result<Vec<Command>, TrialError> {
        Ok(Vec::new())
    }

    /// Custom stop predicate
    ///
    /// `None` keeps the flavor's default; `Some` replaces it.
    fn is_done(&mut self, _frame: &Frame) -> Option<bool> {
        None
    }
}

impl<S: Scenario + ?Sized> Scenario for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn flavor(&self) -> DatasetFlavor {
        (**self).flavor()
    }

    fn field_of_view(&self) -> f32 {
        (**self).field_of_view()
    }

    fn scene_commands(&mut self) -> Vec<Command> {
        (**self).scene_commands()
    }

    fn trial_commands(&mut self, ctx: &mut TrialContext<'_>) -> Result<Vec<Command>, TrialError> {
        (**self).trial_commands(ctx)
    }

    fn per_frame_commands(
        &mut self,
        ctx: &mut TrialContext<'_>,
        frame: &Frame,
    ) -> Result<Vec<Command>, TrialError> {
        (**self).per_frame_commands(ctx, frame)
    }

    fn is_done(&mut self, frame: &Frame) -> Option<bool> {
        (**self).is_done(frame)
    }
}

/// Per-trial state handed to scenario hooks
pub struct TrialContext<'a> {
    pub registry: &'a mut ObjectRegistry,
    pub physics: &'a PhysicsInfoCache,
    pub trial_index: u32,
}

impl<'a> TrialContext<'a> {
    pub fn new(
        registry: &'a mut ObjectRegistry,
        physics: &'a PhysicsInfoCache,
        trial_index: u32,
    ) -> Self {
        Self {
            registry,
            physics,
            trial_index,
        }
    }

    /// Fresh object id, unique for the engine session
    pub fn generate_id(&mut self) -> ObjectId {
        self.registry.generate_id()
    }

    fn resolve_id(&mut self, id: Option<ObjectId>) -> ObjectId {
        id.unwrap_or_else(|| self.registry.generate_id())
    }

    fn add_object_command(id: ObjectId, model: &ModelRecord, placement: Placement) -> Command {
        EngineCommand::AddObject {
            id,
            name: model.name.clone(),
            url: model.url.clone(),
            position: placement.position,
            rotation: placement.rotation,
            scale_factor: model.scale_factor,
            category: model.category.clone(),
        }
        .into()
    }

    /// Add an object recorded through its transform only
    ///
    /// Returns `[add_object]`.
    pub fn add_transforms_object(
        &mut self,
        model: &ModelRecord,
        placement: Placement,
        id: Option<ObjectId>,
    ) -> Result<(ObjectId, Vec<Command>), TrialError> {
        let id = self.resolve_id(id);
        self.registry.register(id, ObjectCategory::TransformOnly, None)?;
        Ok((id, vec![Self::add_object_command(id, model, placement)]))
    }

    /// Add a rigid body with explicit physics values
    ///
    /// Returns `[add_object, set_mass, set_physic_material,
    /// set_object_collision_detection_mode]`.
    pub fn add_physics_object(
        &mut self,
        model: &ModelRecord,
        placement: Placement,
        properties: PhysicsProperties,
        id: Option<ObjectId>,
    ) -> Result<(ObjectId, Vec<Command>), TrialError> {
        let id = self.resolve_id(id);
        self.registry.register(id, ObjectCategory::Rigid, Some(properties))?;
        let material = properties.material;
        let commands = vec![
            Self::add_object_command(id, model, placement),
            EngineCommand::SetMass { id, mass: properties.mass }.into(),
            EngineCommand::SetPhysicMaterial {
                id,
                dynamic_friction: material.dynamic_friction,
                static_friction: material.static_friction,
                bounciness: material.bounciness,
            }
            .into(),
            EngineCommand::SetObjectCollisionDetectionMode {
                id,
                mode: "continuous_dynamic".to_string(),
            }
            .into(),
        ];
        Ok((id, commands))
    }

    /// Add a rigid body using the default physics table
    ///
    /// Fails with [`TrialError::MissingPhysicsInfo`] if the model has no entry.
    pub fn add_physics_object_default(
        &mut self,
        model: &ModelRecord,
        placement: Placement,
        id: Option<ObjectId>,
    ) -> Result<(ObjectId, Vec<Command>), TrialError> {
        let properties = self
            .physics
            .lookup(&model.name)
            .map(|info| info.properties())
            .ok_or_else(|| TrialError::MissingPhysicsInfo {
                model: model.name.clone(),
            })?;
        self.add_physics_object(model, placement, properties, id)
    }

    fn add_flex_object(
        &mut self,
        model: &ModelRecord,
        placement: Placement,
        scale: Option<Vec3>,
        actor: FlexActor,
        id: Option<ObjectId>,
    ) -> Result<(ObjectId, Vec<Command>), TrialError> {
        let id = self.resolve_id(id);
        self.registry.register_flex(id, actor)?;
        let mut commands = vec![Self::add_object_command(id, model, placement)];
        if let Some(scale_factor) = scale {
            commands.push(EngineCommand::ScaleObject { id, scale_factor }.into());
        }
        let set_actor = match actor {
            FlexActor::Solid(actor) => EngineCommand::SetFlexSolidActor { id, actor },
            FlexActor::Soft(actor) => EngineCommand::SetFlexSoftActor { id, actor },
            FlexActor::Cloth(actor) => EngineCommand::SetFlexClothActor { id, actor },
            FlexActor::Fluid(actor) => EngineCommand::SetFlexFluidActor { id, actor },
        };
        commands.push(set_actor.into());
        commands.push(
            EngineCommand::AssignFlexContainer {
                id,
                container_id: 0,
                fluid_container: None,
                fluid_type: None,
            }
            .into(),
        );
        Ok((id, commands))
    }

    /// Returns `[add_object, (scale_object), set_flex_solid_actor, assign_flex_container]`
    pub fn add_solid_object(
        &mut self,
        model: &ModelRecord,
        placement: Placement,
        scale: Option<Vec3>,
        actor: SolidActor,
        id: Option<ObjectId>,
    ) -> Result<(ObjectId, Vec<Command>), TrialError> {
        self.add_flex_object(model, placement, scale, FlexActor::Solid(actor), id)
    }

    /// Returns `[add_object, (scale_object), set_flex_soft_actor, assign_flex_container]`
    pub fn add_soft_object(
        &mut self,
        model: &ModelRecord,
        placement: Placement,
        scale: Option<Vec3>,
        actor: SoftActor,
        id: Option<ObjectId>,
    ) -> Result<(ObjectId, Vec<Command>), TrialError> {
        self.add_flex_object(model, placement, scale, FlexActor::Soft(actor), id)
    }

    /// Returns `[add_object, (scale_object), set_flex_cloth_actor, assign_flex_container]`
    pub fn add_cloth_object(
        &mut self,
        model: &ModelRecord,
        placement: Placement,
        scale: Option<Vec3>,
        actor: ClothActor,
        id: Option<ObjectId>,
    ) -> Result<(ObjectId, Vec<Command>), TrialError> {
        self.add_flex_object(model, placement, scale, FlexActor::Cloth(actor), id)
    }

    /// Add a fluid loaded from the engine's resources
    ///
    /// Returns `[load_flex_fluid_from_resources, set_flex_fluid_actor,
    /// assign_flex_container, step_physics]`. The physics step lets the
    /// particles settle before the first recorded frame.
    pub fn add_fluid_object(
        &mut self,
        fluid_type: &str,
        placement: Placement,
        actor: FluidActor,
        id: Option<ObjectId>,
    ) -> Result<(ObjectId, Vec<Command>), TrialError> {
        let id = self.resolve_id(id);
        self.registry.register_flex(id, FlexActor::Fluid(actor))?;
        let commands = vec![
            EngineCommand::LoadFlexFluidFromResources {
                id,
                orientation: placement.rotation,
                position: placement.position,
            }
            .into(),
            EngineCommand::SetFlexFluidActor { id, actor }.into(),
            EngineCommand::AssignFlexContainer {
                id,
                container_id: 0,
                fluid_container: Some(true),
                fluid_type: Some(fluid_type.to_string()),
            }
            .into(),
            EngineCommand::StepPhysics { frames: 500 }.into(),
        ];
        Ok((id, commands))
    }

    /// Add an object that needs cleanup but is not recorded, e.g. a receptacle
    pub fn add_support_object(
        &mut self,
        model: &ModelRecord,
        placement: Placement,
        id: Option<ObjectId>,
    ) -> Result<(ObjectId, Vec<Command>), TrialError> {
        let id = self.resolve_id(id);
        self.registry.register_support(id)?;
        Ok((id, vec![Self::add_object_command(id, model, placement)]))
    }

    /// Create the trial's flex container and remember its settings for the static block
    pub fn create_flex_container(&mut self, container: FlexContainer) -> Command {
        self.registry.set_flex_container(container);
        EngineCommand::CreateFlexContainer { container }.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trialgen_physics::PhysicsMaterial;

    fn cache() -> PhysicsInfoCache {
        PhysicsInfoCache::from_ron_str(
            r#"{
                "cube": (library: "models_flex.json", mass: 2.0, dynamic_friction: 0.4, static_friction: 0.5, bounciness: 0.3),
            }"#,
        )
        .unwrap()
    }

    fn names(commands: &[Command]) -> Vec<String> {
        commands.iter().filter_map(Command::type_name).collect()
    }

    #[test]
    fn test_add_physics_object_commands() {
        let physics = cache();
        let mut registry = ObjectRegistry::new();
        let mut ctx = TrialContext::new(&mut registry, &physics, 0);
        let props = PhysicsProperties::new(1.5, PhysicsMaterial::new(0.1, 0.2, 0.3));
        let (id, commands) = ctx
            .add_physics_object(
                &ModelRecord::new("cube", "file:///cube"),
                Placement::default(),
                props,
                None,
            )
            .unwrap();
        assert_eq!(
            names(&commands),
            ["add_object", "set_mass", "set_physic_material", "set_object_collision_detection_mode"]
        );
        assert_eq!(registry.get(id).unwrap().properties, Some(props));
    }

    #[test]
    fn test_default_physics_lookup() {
        let physics = cache();
        let mut registry = ObjectRegistry::new();
        let mut ctx = TrialContext::new(&mut registry, &physics, 0);

        let (id, _) = ctx
            .add_physics_object_default(&ModelRecord::new("cube", "u"), Placement::default(), None)
            .unwrap();
        let err = ctx
            .add_physics_object_default(
                &ModelRecord::new("teapot", "u"),
                Placement::default(),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, TrialError::MissingPhysicsInfo { ref model } if model == "teapot"));
        assert_eq!(registry.get(id).unwrap().properties.unwrap().mass, 2.0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_caller_id_surfaces() {
        let physics = cache();
        let mut registry = ObjectRegistry::new();
        let mut ctx = TrialContext::new(&mut registry, &physics, 0);
        let model = ModelRecord::new("cube", "u");
        ctx.add_transforms_object(&model, Placement::default(), Some(ObjectId(4))).unwrap();
        let err = ctx
            .add_transforms_object(&model, Placement::default(), Some(ObjectId(4)))
            .unwrap_err();
        assert!(matches!(err, TrialError::Registry(_)));
    }

    #[test]
    fn test_cloth_object_with_scale() {
        let physics = cache();
        let mut registry = ObjectRegistry::new();
        let mut ctx = TrialContext::new(&mut registry, &physics, 0);
        let (id, commands) = ctx
            .add_cloth_object(
                &ModelRecord::new("cloth_square", "u"),
                Placement::default(),
                Some(Vec3::splat(2.0)),
                ClothActor::default(),
                None,
            )
            .unwrap();
        assert_eq!(
            names(&commands),
            ["add_object", "scale_object", "set_flex_cloth_actor", "assign_flex_container"]
        );
        assert_eq!(registry.get(id).unwrap().category, ObjectCategory::FlexCloth);
    }

    #[test]
    fn test_fluid_object_commands() {
        let physics = cache();
        let mut registry = ObjectRegistry::new();
        let mut ctx = TrialContext::new(&mut registry, &physics, 0);
        let (_, commands) = ctx
            .add_fluid_object("water", Placement::default(), FluidActor::default(), None)
            .unwrap();
        assert_eq!(
            names(&commands),
            [
                "load_flex_fluid_from_resources",
                "set_flex_fluid_actor",
                "assign_flex_container",
                "step_physics"
            ]
        );
        let assign = serde_json::to_value(&commands[2]).unwrap();
        assert_eq!(assign["fluid_type"], "water");
        assert_eq!(assign["fluid_container"], true);
    }

    #[test]
    fn test_support_object_not_in_canonical_order() {
        let physics = cache();
        let mut registry = ObjectRegistry::new();
        let mut ctx = TrialContext::new(&mut registry, &physics, 0);
        let (id, _) = ctx
            .add_support_object(&ModelRecord::new("bowl", "u"), Placement::default(), None)
            .unwrap();
        assert!(registry.canonical_order().is_empty());
        assert_eq!(registry.support_objects(), [id]);
    }
}
