mod cli;
mod display;
mod error;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use cli::{normalize_args, Cli};
use covidplot::config::Config;
use log::debug;

use crate::error::CovidPlotCliResult;

const DEFAULT_LOGGING_LEVEL: &str = "warn";

#[tokio::main]
async fn main() -> Result<()> {
    // Set RUST_LOG to `DEFAULT_LOGGING_LEVEL` if not set
    let _ =
        std::env::var("RUST_LOG").map_err(|_| std::env::set_var("RUST_LOG", DEFAULT_LOGGING_LEVEL));
    pretty_env_logger::init_timed();
    let args = Cli::parse_from(normalize_args(std::env::args()));
    debug!("args: {args:?}");
    let config = read_config_from_toml()?;
    debug!("config: {config:?}");

    args.run(config).await?;
    Ok(())
}

/// Reads `covidplot/config.toml` from the user config directory, falling back to defaults
fn read_config_from_toml() -> CovidPlotCliResult<Config> {
    // macOS: ~/Library/Application Support/covidplot/config.toml
    match dirs::config_dir() {
        Some(dir) => read_config_from_path(&dir.join("covidplot").join("config.toml")),
        None => Ok(Config::default()),
    }
}

fn read_config_from_path(file_path: &Path) -> CovidPlotCliResult<Config> {
    match std::fs::read_to_string(file_path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(e.into()),
    }
}
