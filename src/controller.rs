//! Trial controller
//!
//! Drives a whole dataset run:
//! - Scene setup, once per run
//! - Per trial: registry reset, staging file, trial commands, frame loop
//! - Cleanup commands and publication under the next sequential name
//!
//! ```text
//! Uninitialized -> SceneReady -> TrialRunning -> TrialFinalizing -> SceneReady ... -> Done
//! ```

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use trialgen_core::{
    Command, EngineCommand, EngineLink, FrameStepper, Frequency, LinkError, ObjectRegistry,
    PhysicsInfoCache, Scenario, StopReason, TrialContext,
};
use trialgen_output::{
    existing_trials, first_missing, remove_stale_temp, trial_file_name, DatasetWriter,
};

use crate::config::AppConfig;
use crate::error::RunError;

/// Id of the single image-capturing avatar
pub const AVATAR_ID: &str = "a";

/// Avatar type used for image capture
pub const AVATAR_TYPE: &str = "A_Img_Caps_Kinematic";

/// Lifecycle state of a [`TrialController`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    SceneReady,
    TrialRunning,
    TrialFinalizing,
    Done,
}

/// What one published trial looked like
#[derive(Clone, Debug, PartialEq)]
pub struct TrialSummary {
    pub index: u32,
    /// Number of frame groups written
    pub frames: u32,
    pub stop_reason: StopReason,
    pub path: PathBuf,
}

/// What a whole run did
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    pub trials: Vec<TrialSummary>,
    /// Indices whose files already existed
    pub skipped: Vec<u32>,
}

/// Orchestrates trials against one engine connection
pub struct TrialController<L: EngineLink, S: Scenario> {
    link: L,
    scenario: S,
    config: AppConfig,
    physics: Arc<PhysicsInfoCache>,
    registry: ObjectRegistry,
    stepper: FrameStepper,
    state: ControllerState,
}

impl<L: EngineLink, S: Scenario> TrialController<L, S> {
    pub fn new(link: L, scenario: S, config: AppConfig, physics: Arc<PhysicsInfoCache>) -> Self {
        let stepper = FrameStepper::new(scenario.flavor(), config.trial.policy());
        Self {
            link,
            scenario,
            config,
            physics,
            registry: ObjectRegistry::new(),
            stepper,
            state: ControllerState::Uninitialized,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn scenario(&self) -> &S {
        &self.scenario
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// Hand back the engine link, e.g. to inspect a scripted engine
    pub fn into_link(self) -> L {
        self.link
    }

    /// Final path of trial `index`
    pub fn trial_path(&self, index: u32) -> PathBuf {
        let output = &self.config.output;
        output
            .root_dir
            .join(trial_file_name(index, output.index_width, &output.file_extension))
    }

    fn expect_state(&self, expected: ControllerState) -> Result<(), RunError> {
        if self.state != expected {
            return Err(RunError::State {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }

    /// Commands sent once per run, before the first trial
    pub fn scene_commands(&mut self) -> Vec<Command> {
        let engine = &self.config.engine;
        let image = &self.config.image;
        let mut commands: Vec<Command> = vec![
            EngineCommand::SetScreenSize {
                width: image.width,
                height: image.height,
            }
            .into(),
            EngineCommand::SetRenderQuality {
                render_quality: engine.render_quality,
            }
            .into(),
            EngineCommand::SetPhysicsSolverIterations {
                iterations: engine.solver_iterations,
            }
            .into(),
            EngineCommand::SetVignette { enabled: false }.into(),
            EngineCommand::SetShadowStrength {
                strength: engine.shadow_strength,
            }
            .into(),
            EngineCommand::SetSleepThreshold {
                sleep_threshold: engine.sleep_threshold,
            }
            .into(),
        ];
        let pass_masks = image.pass_masks.clone();

        commands.extend(self.scenario.scene_commands());
        commands.extend([
            EngineCommand::CreateAvatar {
                avatar_type: AVATAR_TYPE.to_string(),
                id: AVATAR_ID.to_string(),
            }
            .into(),
            EngineCommand::SetPassMasks {
                avatar_id: AVATAR_ID.to_string(),
                pass_masks,
            }
            .into(),
            EngineCommand::SetFieldOfView {
                avatar_id: AVATAR_ID.to_string(),
                field_of_view: self.scenario.field_of_view(),
            }
            .into(),
            EngineCommand::SendImages {
                frequency: Frequency::Always,
            }
            .into(),
        ]);
        commands
    }

    /// Prepare the output directory and send the scene commands
    pub fn initialize_scene(&mut self) -> Result<(), RunError> {
        self.expect_state(ControllerState::Uninitialized)?;
        let output = &self.config.output;
        fs::create_dir_all(&output.root_dir)?;
        if let Some(parent) = output.temp_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        remove_stale_temp(&output.temp_path)?;

        let commands = self.scene_commands();
        self.link.communicate(&commands)?;
        self.state = ControllerState::SceneReady;
        log::info!("Scene ready for scenario '{}'", self.scenario.name());
        Ok(())
    }

    /// Run every missing trial, then terminate the engine
    pub fn run(&mut self) -> Result<RunSummary, RunError> {
        if self.state == ControllerState::Uninitialized {
            self.initialize_scene()?;
        }
        let output = &self.config.output;
        let existing =
            existing_trials(&output.root_dir, output.index_width, &output.file_extension)?;
        let count = output.trial_count;
        match first_missing(&existing, count) {
            Some(0) => {}
            Some(first) => log::info!("Resuming run at trial {}", first),
            None => log::info!("All {} trials already present", count),
        }

        let mut summary = RunSummary::default();
        for index in 0..count {
            if existing.contains(&index) {
                log::debug!("Trial {} already exists, skipping", index);
                summary.skipped.push(index);
                continue;
            }
            summary.trials.push(self.run_trial(index)?);
        }
        if !summary.skipped.is_empty() {
            log::info!("Resumed run: {} trials already present", summary.skipped.len());
        }
        self.terminate()?;
        Ok(summary)
    }

    /// Record, clean up and publish one trial
    pub fn run_trial(&mut self, index: u32) -> Result<TrialSummary, RunError> {
        self.expect_state(ControllerState::SceneReady)?;
        self.state = ControllerState::TrialRunning;
        self.registry.clear();
        log::info!("Trial {} started", index);

        let writer = DatasetWriter::open(&self.config.output.temp_path, self.stepper.flavor())
            .map_err(|source| RunError::Writer { trial: index, source });
        let mut writer = match writer {
            Ok(writer) => writer,
            Err(e) => {
                self.state = ControllerState::SceneReady;
                return Err(e);
            }
        };

        match self.record_frames(index, &mut writer) {
            Ok((stop_reason, frames)) => {
                self.state = ControllerState::TrialFinalizing;
                let result = self.publish(index, writer);
                self.state = ControllerState::SceneReady;
                let path = result?;
                log::info!("Trial {} published: {} frames ({:?})", index, frames, stop_reason);
                Ok(TrialSummary {
                    index,
                    frames,
                    stop_reason,
                    path,
                })
            }
            Err(e) => {
                log::error!("Trial {} aborted: {}", index, e);
                if let Err(abandon) = writer.abandon() {
                    log::warn!("Could not remove staging file: {}", abandon);
                }
                if !e.is_run_fatal() {
                    // leave the engine clean for whatever runs next
                    let cleanup = self.registry.cleanup_commands();
                    if let Err(link) = self.link.communicate(&cleanup) {
                        log::warn!("Cleanup after aborted trial {} failed: {}", index, link);
                    }
                }
                self.state = ControllerState::SceneReady;
                Err(e)
            }
        }
    }

    /// Trial setup plus the frame loop; returns why it stopped and the frame count
    fn record_frames(
        &mut self,
        index: u32,
        writer: &mut DatasetWriter,
    ) -> Result<(StopReason, u32), RunError> {
        // 1. Trial-level commands
        let mut commands: Vec<Command> = Vec::new();
        if index % self.config.engine.unload_bundles_every == 0 {
            commands.push(EngineCommand::UnloadAssetBundles.into());
        }
        let mut ctx = TrialContext::new(&mut self.registry, &self.physics, index);
        let trial_commands = self
            .scenario
            .trial_commands(&mut ctx)
            .map_err(|source| RunError::Trial {
                trial: index,
                frame: None,
                source,
            })?;
        commands.extend(trial_commands);
        commands.extend(self.stepper.flavor().send_data_commands());

        let mut frame_index = 0;
        loop {
            // 2. One round trip
            let frame = self
                .stepper
                .step(&mut self.link, &commands, frame_index, &self.registry)
                .map_err(|source| RunError::Step {
                    trial: index,
                    frame: frame_index,
                    source,
                })?;

            // 3. Record it
            writer
                .append_frame(&frame)
                .map_err(|source| RunError::Writer { trial: index, source })?;

            // 4. Stop?
            let verdict = self.scenario.is_done(&frame);
            if let Some(reason) = self.stepper.should_stop(&frame, verdict) {
                if reason == StopReason::FrameCap {
                    log::warn!("Trial {} hit the frame cap at frame {}", index, frame_index);
                }
                return Ok((reason, frame_index + 1));
            }

            // 5. Commands for the next frame
            let mut ctx = TrialContext::new(&mut self.registry, &self.physics, index);
            commands = self
                .scenario
                .per_frame_commands(&mut ctx, &frame)
                .map_err(|source| RunError::Trial {
                    trial: index,
                    frame: Some(frame_index),
                    source,
                })?;
            frame_index += 1;
        }
    }

    /// Destroy the trial's objects, write the static section and rename
    fn publish(&mut self, index: u32, mut writer: DatasetWriter) -> Result<PathBuf, RunError> {
        let cleanup = self.registry.cleanup_commands();
        if let Err(e) = self.link.communicate(&cleanup) {
            discard(writer);
            return Err(e.into());
        }

        let record = self.registry.static_record(self.stepper.flavor());
        if let Err(source) = writer.write_static(&record) {
            discard(writer);
            return Err(RunError::Writer { trial: index, source });
        }
        let final_path = self.trial_path(index);
        writer
            .finalize(&final_path)
            .map_err(|source| RunError::Writer { trial: index, source })
    }

    /// Tell the engine to quit
    ///
    /// An engine that closes the connection in response is fine.
    pub fn terminate(&mut self) -> Result<(), RunError> {
        let result = self.link.communicate(&[EngineCommand::Terminate.into()]);
        self.state = ControllerState::Done;
        match result {
            Ok(_) | Err(LinkError::Disconnected) => {
                log::info!("Engine terminated");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn discard(writer: DatasetWriter) {
    if let Err(e) = writer.abandon() {
        log::warn!("Could not remove staging file: {}", e);
    }
}
