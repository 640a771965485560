//! Error types.

#[derive(thiserror::Error, Debug)]
pub enum CovidPlotError {
    #[error("Wrapped anyhow error: {0}")]
    AnyhowError(#[from] anyhow::Error),
    #[error("Country not found in data: {0}")]
    CountryNotFound(String),
    #[error("Missing column in source data: {0}")]
    MissingColumn(String),
    #[error("Spreadsheet contains no data")]
    EmptyWorkbook,
    #[error("Invalid value in row {row}, column '{column}': {value}")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },
    #[error("Report date column has unsupported type: {0}")]
    InvalidDateColumn(String),
    #[error("No country series to chart")]
    NoSeries,
    #[error("Wrapped polars error: {0}")]
    PolarsError(#[from] polars::error::PolarsError),
    #[error("Wrapped spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::Error),
}

pub type CovidPlotResult<T> = Result<T, CovidPlotError>;
