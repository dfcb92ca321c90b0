use clap::Parser;
use color_eyre::eyre::eyre;
use log::*;

use depmend::{
    cli::{self, Args, Command, MavenCommand, NpmCommand, PipCommand},
    command,
    config::Config,
    result::Result,
};

fn initialize_logger(filter: LevelFilter) -> Result<()> {
    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("depmend")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

async fn execute(config: &Config, args: Args) -> Result<()> {
    match args.command {
        Command::Pip(PipCommand::Remediate(args)) => {
            command::pip::execute(config, &args).await
        }
        Command::Npm(NpmCommand::Remediate(args)) => {
            command::npm::execute(config, &args).await
        }
        Command::Maven(MavenCommand::Remediate(args)) => {
            command::maven::execute(config, &args).await
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Parse first so --help and --version work without environment setup
    let args = cli::Args::parse();

    let config = Config::load()?;

    initialize_logger(config.log_level)?;

    // Dropping the command future on interrupt cancels the in-flight HTTP
    // call; kill_on_drop on pip subprocesses reaps those as well
    tokio::select! {
        result = execute(&config, args) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted");
            Err(eyre!("interrupted"))
        }
    }
}
