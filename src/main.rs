//! trialgen - physics-trial dataset generator

use std::process::ExitCode;
use std::sync::Arc;

use trialgen::{scenarios, AppConfig, RunError, TrialController};
use trialgen_core::PhysicsInfoCache;
use trialgen_link::TcpEngineLink;

fn run(config: AppConfig) -> Result<(), RunError> {
    let physics = Arc::new(PhysicsInfoCache::bundled()?);
    let scenario = scenarios::from_config(&config.scenario)?;

    log::info!("Connecting to engine at {}", config.engine.address);
    let link = TcpEngineLink::connect(&config.engine.address, config.engine.connect_timeout())?;

    let mut controller = TrialController::new(link, scenario, config, physics);
    match controller.run() {
        Ok(summary) => {
            log::info!(
                "Run complete: {} trials written, {} already present",
                summary.trials.len(),
                summary.skipped.len()
            );
            Ok(())
        }
        Err(e) => {
            if !e.is_run_fatal() {
                if let Err(terminate) = controller.terminate() {
                    log::warn!("Could not terminate engine: {}", terminate);
                }
            }
            Err(e)
        }
    }
}

fn main() -> ExitCode {
    let config = AppConfig::load().and_then(|config| {
        config.validate()?;
        Ok(config)
    });
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            env_logger::init();
            log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let env = env_logger::Env::default().default_filter_or(config.debug.log_level.as_str());
    env_logger::Builder::from_env(env).init();
    log::info!("Starting trialgen, scenario '{}'", config.scenario.name);

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
