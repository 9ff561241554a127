use std::process::ExitCode;

use tracing::{error, info};

mod app;

fn main() -> ExitCode {
    app::bootstrap::init_tracing();
    info!("=== Finite Lives Harness ===");

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let config = match app::bootstrap::build_config(&args, app::bootstrap::root_from_env()) {
        Ok(config) => config,
        Err(message) => {
            error!(error = %message, usage = app::bootstrap::USAGE, "invalid_arguments");
            return ExitCode::FAILURE;
        }
    };

    app::replay::run(&config)
}
