use covidplot::error::CovidPlotError;

#[derive(thiserror::Error, Debug)]
pub enum CovidPlotCliError {
    #[error("Anyhow error")]
    Anyhow(#[from] anyhow::Error),
    #[error("covidplot error")]
    CovidPlotError(#[from] CovidPlotError),
    #[error("std IO error")]
    IOError(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    ConfigError(#[from] toml::de::Error),
}

pub type CovidPlotCliResult<T> = Result<T, CovidPlotCliError>;
