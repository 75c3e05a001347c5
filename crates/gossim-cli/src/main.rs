//! gossim binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use gossim_topology::TopologyStore;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gossim_cli::cli::{Cli, Commands, LogFormat};
use gossim_cli::CliError;
use gossim_cli::commands::{
    GenerateCommand, InitiateCommand, InspectCommand, ServeCommand, SimulateCommand,
};

fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("gossim=info".parse()?);
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(fmt::layer().with_writer(io::stderr)).try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init()?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_format) {
        eprintln!("Failed to initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("Error: {e:#}");
            exit_code(&e)
        }
    }
}

fn exit_code(error: &anyhow::Error) -> ExitCode {
    if error.downcast_ref::<CliError>().is_some_and(CliError::is_usage) {
        ExitCode::from(CliError::USAGE_EXIT_CODE)
    } else {
        ExitCode::FAILURE
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let store = TopologyStore::new(cli.topology_dir);
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Generate(args) => {
            GenerateCommand::new(store).execute(&mut stdout, &args)?;
        }
        Commands::Serve(args) => {
            ServeCommand::new(store).execute(&args).await?;
        }
        Commands::Initiate(args) => {
            InitiateCommand::new().execute(&mut stdout, &args).await?;
        }
        Commands::Simulate(args) => {
            SimulateCommand::new(store).execute(&mut stdout, &args).await?;
        }
        Commands::Inspect(args) => {
            InspectCommand::new(store).execute(&mut stdout, &args)?;
        }
    }

    Ok(())
}
