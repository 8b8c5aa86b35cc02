use std::process::ExitCode;

use linreg_entrypoint::{Config, ConfigError, FailureReport, Trainer};
use log::{error, info};

const USAGE_EXIT_CODE: u8 = 2;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::resolve(std::env::args_os(), |key| std::env::var(key).ok()) {
        Ok(config) => config,
        Err(ConfigError::Usage(e)) => e.exit(),
        Err(e) => {
            error!("{e}");
            return ExitCode::from(USAGE_EXIT_CODE);
        }
    };

    match Trainer::new(&config).train() {
        Ok(_) => {
            info!("Training complete");
            ExitCode::SUCCESS
        }
        Err(e) => FailureReport::new(&e).emit(&config.output_dir),
    }
}
