mod args;
mod command;
mod config;
mod env_vars;
mod init;

use crate::args::{Args, Subcommand};
use crate::config::config_holder::ConfigHolder;
use crate::env_vars::{SupportedEnvVar, is_env_set};
use anyhow::{Context as _, bail};
use clap::Parser;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        return Err(err).context("cannot load `.env`");
    }
    let command = match Args::parse().command {
        Some(command) => command,
        None if is_env_set(SupportedEnvVar::AWS_LAMBDA_RUNTIME_API) => {
            Subcommand::Lambda { config: None }
        }
        None => bail!("no subcommand given, see `snapcheck --help`"),
    };
    match command {
        Subcommand::Run {
            config,
            instance_id,
            dry_run,
        } => {
            let (check_config, _guard) = prepare(config, instance_id).await?;
            command::run::run(&check_config, dry_run).await
        }
        Subcommand::Lambda { config } => {
            let (check_config, _guard) = prepare(config, None).await?;
            command::lambda::serve(check_config).await
        }
        Subcommand::Generate(generate) => command::generate::generate(generate).await,
    }
}

/// Load and check the configuration, then install the tracing subscriber.
async fn prepare(
    config: Option<PathBuf>,
    instance_id: Option<String>,
) -> Result<(crate::config::CheckConfig, init::Guard), anyhow::Error> {
    let project_dirs = ProjectDirs::from("", "", "snapcheck");
    let config_holder = ConfigHolder::new(project_dirs.as_ref(), config)?;
    let mut config_toml = config_holder.load_config().await?;
    if let Some(instance_id) = instance_id {
        config_toml.target.instance_id = Some(instance_id);
    }
    let check_config = config_toml.verify()?;
    let guard = init::init(&mut config_toml.log);
    match config_holder.path() {
        Some(path) => info!("Using configuration file {path:?}"),
        None => info!("No configuration file found, using environment variables"),
    }
    debug!("{check_config:?}");
    Ok((check_config, guard))
}
