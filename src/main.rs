//! Binary entry point: parse the command line, bring up logging, and hand off
//! to either the terminal UI or one of the headless subcommands.
use std::fs::{self, OpenOptions};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env, Target};
use log::error;

use jornada_manager::cli::{self, Cli};
use jornada_manager::config::{log_path, Config};

/// The UI owns the terminal, so interactive sessions log to a file in the
/// app directory. Subcommands log to stderr. `RUST_LOG` wins over the config.
fn init_logger(interactive: bool, default_level: &str) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));
    builder.format_timestamp_millis();

    if interactive {
        let path = log_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create app directory")?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // A broken config is reported by `cli::run`; logging still starts.
    let level = Config::load(cli.config.as_deref())
        .map(|config| config.log_level)
        .unwrap_or_else(|_| "info".to_string());
    init_logger(cli.is_interactive(), &level)?;

    cli::run(cli).inspect_err(|err| error!("{err:?}"))
}
