mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bravia_api::RequestExecutor;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(mut cli: Cli) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    if cli.global.output.is_none() {
        cli.global.output = Some(config::default_output(&cfg));
    }

    match cli.command {
        // Config commands don't need a display
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "bravia", &mut std::io::stdout());
            Ok(())
        }

        // All other commands talk to a display
        cmd => {
            let target = config::resolve_target(&cli.global, &cfg)?;
            let headers = config::parse_headers(&cli.global.headers)?;
            let executor = RequestExecutor::new(&target.transport)?;

            tracing::debug!(command = ?cmd, url = %target.base_url, "dispatching command");
            commands::dispatch(cmd, &executor, &target, &headers, &cli.global).await
        }
    }
}
