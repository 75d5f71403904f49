use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(name = "snapcheck")]
#[command(
    version,
    about = "snapcheck: verify that today's EBS snapshots completed and report to SNS",
    disable_help_subcommand = true
)]
pub(crate) struct Args {
    /// Defaults to `lambda` when started by the Lambda runtime.
    #[command(subcommand)]
    pub(crate) command: Option<Subcommand>,
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum Subcommand {
    /// Check every volume attached to the instance once and exit.
    Run {
        /// Path to the TOML configuration
        #[arg(long, short)]
        config: Option<PathBuf>,
        /// Check this instance instead of `target.instance_id`
        #[arg(long)]
        instance_id: Option<String>,
        /// Log the notifications instead of publishing them
        #[arg(long)]
        dry_run: bool,
    },
    /// Serve invocations from the AWS Lambda runtime API.
    Lambda {
        /// Path to the TOML configuration
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
    #[command(subcommand)]
    Generate(Generate),
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum Generate {
    /// Write a commented sample configuration.
    Config {
        /// Defaults to `snapcheck.toml` in the current directory.
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Replace an existing file
        #[arg(long)]
        overwrite: bool,
    },
    /// Generate the configuration schema in JSON schema format.
    ConfigSchema {
        /// Filename to write the schema to, defaults to `<stdout>`.
        output: Option<PathBuf>,
    },
}
