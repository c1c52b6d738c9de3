//! Frame stepping and trial termination
//!
//! [`FrameStepper::step`] performs one round trip with the engine and turns the
//! response into a [`Frame`] aligned to the registry's canonical order.
//! [`FrameStepper::should_stop`] evaluates the termination predicate.

use std::collections::HashMap;

use crate::command::Command;
use crate::error::StepError;
use crate::flavor::DatasetFlavor;
use crate::frame::{Frame, ObjectObservation};
use crate::link::EngineLink;
use crate::object::ObjectId;
use crate::registry::ObjectRegistry;
use crate::response::{decode_response, DecodedResponse};

/// Highest frame index of a trial unless configured otherwise
pub const DEFAULT_FRAME_CAP: u32 = 1000;

/// Objects below this height are ignored by the sleeping check
pub const DEFAULT_FLOOR_Y: f32 = -1.0;

/// Limits applied to every trial
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerminationPolicy {
    /// A trial always stops once this frame index has been recorded
    pub frame_cap: u32,
    /// Objects with `y < floor_y` do not take part in the sleeping check
    pub floor_y: f32,
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self {
            frame_cap: DEFAULT_FRAME_CAP,
            floor_y: DEFAULT_FLOOR_Y,
        }
    }
}

/// Why a trial stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The frame cap was reached
    FrameCap,
    /// Every tracked rigid object was sleeping
    AllSleeping,
    /// The scenario's own predicate said so
    Scenario,
}

/// Drives one frame at a time and decides when the trial is over
#[derive(Clone, Copy, Debug)]
pub struct FrameStepper {
    policy: TerminationPolicy,
    flavor: DatasetFlavor,
}

impl FrameStepper {
    pub fn new(flavor: DatasetFlavor, policy: TerminationPolicy) -> Self {
        Self { policy, flavor }
    }

    pub fn policy(&self) -> &TerminationPolicy {
        &self.policy
    }

    pub fn flavor(&self) -> DatasetFlavor {
        self.flavor
    }

    /// Send `commands`, wait for the response and decode it into frame `index`
    pub fn step<L: EngineLink + ?Sized>(
        &self,
        link: &mut L,
        commands: &[Command],
        index: u32,
        registry: &ObjectRegistry,
    ) -> Result<Frame, StepError> {
        let blocks = link.communicate(commands)?;
        let response = decode_response(&blocks)?;
        let frame = assemble_frame(index, response, registry);
        log::debug!(
            "Frame {}: {} objects, {} collisions, {} env collisions",
            index,
            frame.objects.len(),
            frame.collisions.len(),
            frame.env_collisions.len()
        );
        Ok(frame)
    }

    /// Evaluate the termination predicate after `frame` was recorded
    ///
    /// `scenario_verdict` is the scenario's own predicate, if it has one; it
    /// replaces the flavor's default check. The frame cap applies regardless.
    pub fn should_stop(&self, frame: &Frame, scenario_verdict: Option<bool>) -> Option<StopReason> {
        if frame.index >= self.policy.frame_cap {
            return Some(StopReason::FrameCap);
        }
        match scenario_verdict {
            Some(true) => Some(StopReason::Scenario),
            Some(false) => None,
            None if self.flavor.stops_when_sleeping() && self.all_sleeping(frame) => {
                Some(StopReason::AllSleeping)
            }
            None => None,
        }
    }

    /// Whether every rigid object above the floor reports sleeping
    ///
    /// Objects without rigidbody data are not tracked. An empty population
    /// counts as sleeping.
    pub fn all_sleeping(&self, frame: &Frame) -> bool {
        frame
            .objects
            .iter()
            .filter(|o| o.position.y >= self.policy.floor_y)
            .filter_map(|o| o.sleeping)
            .all(|sleeping| sleeping)
    }
}

/// Align a decoded response to canonical order
///
/// Observations of ids the registry does not know are dropped with a warning.
fn assemble_frame(index: u32, response: DecodedResponse, registry: &ObjectRegistry) -> Frame {
    let DecodedResponse {
        transforms,
        rigidbodies,
        collisions,
        env_collisions,
        camera,
        images,
        particles,
    } = response;

    let mut by_id: HashMap<ObjectId, ObjectObservation> = HashMap::with_capacity(transforms.len());
    for observation in transforms {
        if registry.position(observation.id).is_none() {
            log::warn!("Frame {}: transform for unregistered object {}", index, observation.id);
            continue;
        }
        by_id.insert(observation.id, observation);
    }
    for state in rigidbodies {
        match by_id.get_mut(&state.id) {
            Some(observation) => {
                observation.velocity = Some(state.velocity);
                observation.angular_velocity = Some(state.angular_velocity);
                observation.sleeping = Some(state.sleeping);
            }
            None => log::warn!(
                "Frame {}: rigidbody state for object {} without a transform",
                index,
                state.id
            ),
        }
    }

    let mut particles_by_id: HashMap<_, _> = particles.into_iter().map(|p| (p.id, p)).collect();

    let mut frame = Frame::new(index);
    for id in registry.canonical_order() {
        if let Some(observation) = by_id.remove(&id) {
            frame.objects.push(observation);
        }
        if let Some(p) = particles_by_id.remove(&id) {
            frame.particles.push(p);
        }
    }
    for id in particles_by_id.keys() {
        log::warn!("Frame {}: particles for unregistered object {}", index, id);
    }
    frame.collisions = collisions;
    frame.env_collisions = env_collisions;
    frame.camera = camera;
    frame.images = images;
    frame
}
