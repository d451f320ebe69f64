//! code-tunnel binary entry point.

use std::process::ExitCode;

use code_tunnel::api::{serve_with_state, AppState};
use code_tunnel::config::Config;
use code_tunnel::{cli, logging};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("code-tunnel: {e}");
            eprintln!("Try 'code-tunnel --help' for more information.");
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("code-tunnel: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init_with_filter(config.log_filter());

    info!("code-tunnel v{}", env!("CARGO_PKG_VERSION"));

    let server_config = match config.to_server_config() {
        Ok(server_config) => server_config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let state = AppState::new();
    if let Err(e) = serve_with_state(server_config, state).await {
        error!("server error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
