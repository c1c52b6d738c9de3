//! Bundled scenarios
//!
//! - [`DropScenario`] - rigid bodies: one primitive dropped onto another
//! - [`DrapeScenario`] - flex: a cloth dropped over a solid object

mod drape;
mod drop;

pub use drape::DrapeScenario;
pub use drop::DropScenario;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use trialgen_core::{Command, ModelRecord, Scenario, Vec3};

use crate::config::{ConfigError, ScenarioConfig};

/// Build the scenario named in the configuration
pub fn from_config(config: &ScenarioConfig) -> Result<Box<dyn Scenario>, ConfigError> {
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    match config.name.as_str() {
        "drop" => Ok(Box::new(DropScenario::new(rng, &config.model_url_base))),
        "drape" => Ok(Box::new(DrapeScenario::new(rng, &config.model_url_base))),
        other => Err(ConfigError::Invalid(format!("unknown scenario '{other}'"))),
    }
}

/// Random camera position around `center`
///
/// The horizontal distance is drawn from `radius`, the angle (degrees) from
/// `angle` and the height from `height`.
pub fn random_avatar_position<R: Rng + ?Sized>(
    rng: &mut R,
    radius: (f32, f32),
    height: (f32, f32),
    center: Vec3,
    angle: (f32, f32),
) -> Vec3 {
    let r = uniform(rng, radius);
    let theta = uniform(rng, angle).to_radians();
    Vec3::new(
        center.x + r * theta.cos(),
        uniform(rng, height),
        center.z + r * theta.sin(),
    )
}

/// Uniform draw from `[lo, hi)`, or `lo` for an empty range
pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

pub(crate) fn model(base: &str, name: &str) -> ModelRecord {
    ModelRecord::new(name, format!("{}/{}", base.trim_end_matches('/'), name))
}

/// Engine command outside the typed set
pub(crate) fn raw(value: serde_json::Value) -> Command {
    Command::custom(value)
}

pub(crate) fn load_scene(name: &str) -> Command {
    raw(json!({"$type": "load_scene", "scene_name": name}))
}
