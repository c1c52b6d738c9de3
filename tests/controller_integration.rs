//! Whole runs against a scripted engine
//!
//! The fake engine tracks the objects it was asked to add and destroy and
//! answers each frame request with transforms and rigidbody data for them.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;
use trialgen::scenarios::DrapeScenario;
use trialgen::{AppConfig, ControllerState, RunError, TrialController};
use trialgen_core::response::{encode_rigidbodies, encode_transforms, RigidbodyState};
use trialgen_core::{
    Command, DatasetFlavor, EngineCommand, EngineLink, Frame, LinkError, ModelRecord, ObjectId,
    ObjectObservation, PhysicsInfoCache, PhysicsMaterial, PhysicsProperties, Placement, Quat,
    RawBlock, Scenario, StepError, StopReason, TrialContext, TrialError, Vec3,
};
use trialgen_output::DatasetReader;

#[derive(Default)]
struct FakeEngine {
    live: Vec<ObjectId>,
    frame: u32,
    trials_started: u32,
    /// Frame index from which objects report sleeping
    sleep_at: u32,
    /// First live object sits below the floor and never sleeps
    sink_first: bool,
    /// (trial, frame) answered with a malformed block
    corrupt: Option<(u32, u32)>,
    batches: Vec<Vec<Command>>,
}

impl FakeEngine {
    fn sleeping_at(sleep_at: u32) -> Self {
        Self {
            sleep_at,
            ..Self::default()
        }
    }

    fn frame_response(&mut self) -> Vec<RawBlock> {
        let trial = self.trials_started.saturating_sub(1);
        if self.corrupt == Some((trial, self.frame)) {
            return vec![RawBlock::new(*b"tran", vec![1, 0, 0])];
        }
        let mut transforms = Vec::new();
        let mut states = Vec::new();
        for (i, &id) in self.live.iter().enumerate() {
            let sunk = self.sink_first && i == 0;
            let y = if sunk { -5.0 } else { 0.5 };
            transforms.push(ObjectObservation::transform(
                id,
                Vec3::new(0.0, y, 0.0),
                Quat::IDENTITY,
                Vec3::Z,
            ));
            states.push(RigidbodyState {
                id,
                velocity: Vec3::ZERO,
                angular_velocity: Vec3::ZERO,
                sleeping: !sunk && self.frame >= self.sleep_at,
            });
        }
        self.frame += 1;
        vec![encode_transforms(&transforms), encode_rigidbodies(&states)]
    }
}

impl EngineLink for FakeEngine {
    fn communicate(&mut self, commands: &[Command]) -> Result<Vec<RawBlock>, LinkError> {
        self.batches.push(commands.to_vec());
        let mut is_frame = true;
        for command in commands {
            match command {
                Command::Engine(EngineCommand::AddObject { id, .. }) => self.live.push(*id),
                Command::Engine(EngineCommand::DestroyObject { id })
                | Command::Engine(EngineCommand::DestroyFlexObject { id }) => {
                    self.live.retain(|live| live != id);
                    is_frame = false;
                }
                Command::Engine(EngineCommand::SendTransforms { .. }) => {
                    self.frame = 0;
                    self.trials_started += 1;
                }
                Command::Engine(EngineCommand::CreateAvatar { .. })
                | Command::Engine(EngineCommand::Terminate) => is_frame = false,
                _ => {}
            }
        }
        if is_frame {
            Ok(self.frame_response())
        } else {
            Ok(Vec::new())
        }
    }
}

/// Stacks `objects` rigid bodies, optionally adding one more mid-trial
struct StackScenario {
    objects: usize,
    add_after: Option<u32>,
}

impl StackScenario {
    fn new(objects: usize) -> Self {
        Self {
            objects,
            add_after: None,
        }
    }

    fn add(ctx: &mut TrialContext<'_>, y: f32) -> Result<Vec<Command>, TrialError> {
        let properties = PhysicsProperties::new(1.0, PhysicsMaterial::new(0.4, 0.5, 0.2));
        let (_, commands) = ctx.add_physics_object(
            &ModelRecord::new("cube", "models/cube"),
            Placement::at(Vec3::new(0.0, y, 0.0)),
            properties,
            None,
        )?;
        Ok(commands)
    }
}

impl Scenario for StackScenario {
    fn name(&self) -> &str {
        "stack"
    }

    fn flavor(&self) -> DatasetFlavor {
        DatasetFlavor::Rigidbodies
    }

    fn scene_commands(&mut self) -> Vec<Command> {
        Vec::new()
    }

    fn trial_commands(&mut self, ctx: &mut TrialContext<'_>) -> Result<Vec<Command>, TrialError> {
        let mut commands = Vec::new();
        for i in 0..self.objects {
            commands.extend(Self::add(ctx, i as f32)?);
        }
        Ok(commands)
    }

    fn per_frame_commands(
        &mut self,
        ctx: &mut TrialContext<'_>,
        frame: &Frame,
    ) -> Result<Vec<Command>, TrialError> {
        if Some(frame.index) == self.add_after {
            return Self::add(ctx, 3.0);
        }
        Ok(Vec::new())
    }
}

fn config(dir: &Path, trials: u32) -> AppConfig {
    let mut config = AppConfig::default();
    config.output.root_dir = dir.join("out");
    config.output.temp_path = dir.join("out").join("temp.part");
    config.output.trial_count = trials;
    config
}

fn new_controller<S: Scenario>(
    engine: FakeEngine,
    scenario: S,
    config: AppConfig,
) -> TrialController<FakeEngine, S> {
    let physics = Arc::new(PhysicsInfoCache::bundled().unwrap());
    TrialController::new(engine, scenario, config, physics)
}

fn trial_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir.join("out"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_trial_stops_when_all_sleeping() {
    let dir = TempDir::new().unwrap();
    let engine = FakeEngine::sleeping_at(42);
    let mut controller = new_controller(engine, StackScenario::new(2), config(dir.path(), 1));

    let summary = controller.run().unwrap();
    assert_eq!(summary.trials.len(), 1);
    assert_eq!(summary.trials[0].frames, 43);
    assert_eq!(summary.trials[0].stop_reason, StopReason::AllSleeping);
    assert_eq!(controller.state(), ControllerState::Done);

    let mut reader = DatasetReader::open(dir.path().join("out/0000.zip")).unwrap();
    let frames = reader.frame_names();
    assert_eq!(frames.len(), 43);
    assert_eq!(frames.last().map(String::as_str), Some("0042"));
    assert_eq!(reader.read_array("static/object_ids").unwrap().to_i32().unwrap(), [1, 2]);
    assert_eq!(reader.read_array("static/mass").unwrap().to_f32().unwrap(), [1.0, 1.0]);
    assert_eq!(reader.read_array("frames/0010/objects/velocities").unwrap().shape, [2, 3]);
}

#[test]
fn test_objects_below_floor_do_not_block_stopping() {
    let dir = TempDir::new().unwrap();
    let engine = FakeEngine {
        sink_first: true,
        ..FakeEngine::sleeping_at(5)
    };
    let mut controller = new_controller(engine, StackScenario::new(2), config(dir.path(), 1));

    let summary = controller.run().unwrap();
    assert_eq!(summary.trials[0].frames, 6);
    assert_eq!(summary.trials[0].stop_reason, StopReason::AllSleeping);

    // the sunk object is still recorded in every frame
    let mut reader = DatasetReader::open(dir.path().join("out/0000.zip")).unwrap();
    let positions = reader.read_array("frames/0005/objects/positions").unwrap();
    assert_eq!(positions.shape, [2, 3]);
    assert_eq!(positions.to_f32().unwrap()[1], -5.0);
}

#[test]
fn test_frame_cap_ends_restless_trial() {
    let dir = TempDir::new().unwrap();
    let mut config = config(dir.path(), 1);
    config.trial.frame_cap = 10;
    let engine = FakeEngine::sleeping_at(u32::MAX);
    let mut controller = new_controller(engine, StackScenario::new(1), config);

    let summary = controller.run().unwrap();
    assert_eq!(summary.trials[0].stop_reason, StopReason::FrameCap);
    assert_eq!(summary.trials[0].frames, 11);
}

#[test]
fn test_run_publishes_sequential_files() {
    let dir = TempDir::new().unwrap();
    let engine = FakeEngine::sleeping_at(3);
    let mut controller = new_controller(engine, StackScenario::new(2), config(dir.path(), 5));

    let summary = controller.run().unwrap();
    let indices: Vec<u32> = summary.trials.iter().map(|t| t.index).collect();
    assert_eq!(indices, [0, 1, 2, 3, 4]);
    assert_eq!(
        trial_files(dir.path()),
        ["0000.zip", "0001.zip", "0002.zip", "0003.zip", "0004.zip"]
    );

    // ids are never reused across trials of one engine session
    let mut seen = BTreeSet::new();
    for name in trial_files(dir.path()) {
        let mut reader = DatasetReader::open(dir.path().join("out").join(name)).unwrap();
        for id in reader.read_array("static/object_ids").unwrap().to_i32().unwrap() {
            assert!(seen.insert(id), "id {} reused", id);
        }
    }
    assert_eq!(seen.len(), 10);

    // every trial cleaned up after itself
    let engine = controller.into_link();
    assert!(engine.live.is_empty());
    let last = engine.batches.last().unwrap();
    assert!(matches!(last.as_slice(), [Command::Engine(EngineCommand::Terminate)]));
}

#[test]
fn test_stale_temp_file_is_discarded() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path(), 2);
    fs::create_dir_all(&config.output.root_dir).unwrap();
    fs::write(&config.output.temp_path, b"half-written trial").unwrap();
    let temp_path = config.output.temp_path.clone();

    let mut controller = new_controller(FakeEngine::sleeping_at(2), StackScenario::new(1), config);
    controller.run().unwrap();

    assert!(!temp_path.exists());
    assert_eq!(trial_files(dir.path()), ["0000.zip", "0001.zip"]);
    assert!(DatasetReader::open(dir.path().join("out/0000.zip")).is_ok());
}

#[test]
fn test_resume_skips_existing_trials() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path(), 4);
    fs::create_dir_all(&config.output.root_dir).unwrap();
    fs::write(config.output.root_dir.join("0000.zip"), b"kept").unwrap();
    fs::write(config.output.root_dir.join("0002.zip"), b"kept").unwrap();

    let mut controller = new_controller(FakeEngine::sleeping_at(2), StackScenario::new(1), config);
    let summary = controller.run().unwrap();

    assert_eq!(summary.skipped, [0, 2]);
    let written: Vec<u32> = summary.trials.iter().map(|t| t.index).collect();
    assert_eq!(written, [1, 3]);
    assert_eq!(fs::read(dir.path().join("out/0000.zip")).unwrap(), b"kept");
    assert_eq!(trial_files(dir.path()), ["0000.zip", "0001.zip", "0002.zip", "0003.zip"]);
}

#[test]
fn test_over_padded_file_does_not_fill_index() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path(), 5);
    fs::create_dir_all(&config.output.root_dir).unwrap();
    fs::write(config.output.root_dir.join("00003.zip"), b"stray").unwrap();

    let engine = FakeEngine::sleeping_at(1);
    let mut controller = new_controller(engine, StackScenario::new(1), config);
    let summary = controller.run().unwrap();

    assert!(summary.skipped.is_empty());
    assert_eq!(summary.trials.len(), 5);
    assert!(dir.path().join("out/0003.zip").exists());
}

#[test]
fn test_mid_trial_addition_grows_frames() {
    let dir = TempDir::new().unwrap();
    let scenario = StackScenario {
        objects: 2,
        add_after: Some(4),
    };
    let engine = FakeEngine::sleeping_at(8);
    let mut controller = new_controller(engine, scenario, config(dir.path(), 1));
    controller.run().unwrap();

    let mut reader = DatasetReader::open(dir.path().join("out/0000.zip")).unwrap();
    assert_eq!(reader.read_array("frames/0004/objects/positions").unwrap().shape, [2, 3]);
    assert_eq!(reader.read_array("frames/0005/objects/positions").unwrap().shape, [3, 3]);
    assert_eq!(reader.read_array("static/object_ids").unwrap().to_i32().unwrap(), [1, 2, 3]);
}

#[test]
fn test_malformed_response_aborts_trial() {
    let dir = TempDir::new().unwrap();
    let engine = FakeEngine {
        corrupt: Some((1, 3)),
        ..FakeEngine::sleeping_at(5)
    };
    let config = config(dir.path(), 3);
    let temp_path = config.output.temp_path.clone();
    let mut controller = new_controller(engine, StackScenario::new(2), config);

    let err = controller.run().unwrap_err();
    assert!(matches!(
        err,
        RunError::Step {
            trial: 1,
            frame: 3,
            source: StepError::Decode(_)
        }
    ));
    assert!(!err.is_run_fatal());
    assert_eq!(controller.state(), ControllerState::SceneReady);
    assert!(!temp_path.exists());
    assert_eq!(trial_files(dir.path()), ["0000.zip"]);

    // the aborted trial's objects were still destroyed
    assert!(controller.link().live.is_empty());
    controller.terminate().unwrap();
}

#[test]
fn test_run_trial_requires_scene() {
    let dir = TempDir::new().unwrap();
    let engine = FakeEngine::default();
    let mut controller = new_controller(engine, StackScenario::new(1), config(dir.path(), 1));
    let err = controller.run_trial(0).unwrap_err();
    assert!(matches!(err, RunError::State { .. }));
}

#[test]
fn test_drape_trial_stops_after_frame_150() {
    let dir = TempDir::new().unwrap();
    let scenario = DrapeScenario::new(StdRng::seed_from_u64(9), "models");
    let engine = FakeEngine::sleeping_at(0);
    let mut controller = new_controller(engine, scenario, config(dir.path(), 1));

    let summary = controller.run().unwrap();
    assert_eq!(summary.trials[0].stop_reason, StopReason::Scenario);
    assert_eq!(summary.trials[0].frames, 152);

    let mut reader = DatasetReader::open(dir.path().join("out/0000.zip")).unwrap();
    assert_eq!(reader.frame_count(), 152);
    let mass_scale = reader.read_array("static/solid_actors/mass_scale").unwrap();
    assert_eq!(mass_scale.to_f32().unwrap(), [500.0]);
    assert_eq!(reader.read_array("static/cloth_actors/object_id").unwrap().shape, [1]);
    assert!(reader.read_array("frames/0000/objects/velocities").is_err());
    assert!(controller.into_link().live.is_empty());
}
