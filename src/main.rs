//! VoiceGuard CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use voiceguard::cli::{
    app::{load_merged_config, run_health, run_interactive, run_session, EXIT_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use voiceguard::domain::config::AppConfig;
use voiceguard::domain::session::SessionMode;
use voiceguard::infrastructure::XdgConfigStore;

fn init_tracing(verbose: bool) {
    let default = if verbose { "voiceguard=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Layer file and env config under the CLI flags
async fn resolve_config(cli_config: AppConfig) -> AppConfig {
    let config = load_merged_config(cli_config).await;
    tracing::debug!(
        server = %config.server_url_or_default(),
        mode = %config.mode_or_default(),
        "configuration loaded"
    );
    config
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let presenter = Presenter::new();

    // Build CLI config from args (clap has already folded in VOICEGUARD_* env)
    let cli_config = AppConfig {
        server_url: cli.server,
        user_id: cli.user,
        visualizer: if cli.no_visualizer { Some(false) } else { None },
        ..AppConfig::empty()
    };

    match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        Some(Commands::Auth) => {
            run_session(resolve_config(cli_config).await, SessionMode::Authenticate).await
        }
        Some(Commands::Enroll) => {
            run_session(resolve_config(cli_config).await, SessionMode::Enroll).await
        }
        Some(Commands::Health) => run_health(resolve_config(cli_config).await).await,
        Some(Commands::Interactive) => run_interactive(resolve_config(cli_config).await).await,
        None => {
            let config = resolve_config(cli_config).await;
            let mode = config.mode_or_default();
            run_session(config, mode).await
        }
    }
}
