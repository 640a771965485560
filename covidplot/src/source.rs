//! Resolving where the ECDC table comes from and loading it into a canonical `DataFrame`.

use std::{
    fmt::Display,
    io::Cursor,
    path::{Path, PathBuf},
};

use anyhow::Context;
use calamine::{open_workbook_auto_from_rs, Data, DataType as _, Range, Reader};
use chrono::NaiveDate;
use itertools::Itertools;
use log::{debug, info};
use polars::io::SerReader;
use polars::prelude::*;

use crate::{
    config::Config,
    error::{CovidPlotError, CovidPlotResult},
    COL,
};

/// Date formats tried, in order, for report dates stored as text inside a spreadsheet.
const SPREADSHEET_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Where the table is read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataSource {
    Local(PathBuf),
    Remote(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl DataSource {
    /// Uses the explicit path or URL if one was given, otherwise today's ECDC download.
    pub fn resolve(token: Option<&str>, config: &Config, today: NaiveDate) -> Self {
        match token {
            Some(token) => Self::from(token),
            None => Self::Remote(default_url(config, today)),
        }
    }

    fn format(&self) -> SourceFormat {
        let name = match self {
            DataSource::Local(path) => path.to_string_lossy().to_lowercase(),
            // Ignore any query string when looking at the extension
            DataSource::Remote(url) => url
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_lowercase(),
        };
        if name.ends_with(".csv") {
            SourceFormat::Csv
        } else {
            SourceFormat::Spreadsheet
        }
    }
}

impl From<&str> for DataSource {
    fn from(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            DataSource::Remote(value.to_string())
        } else {
            DataSource::Local(PathBuf::from(value))
        }
    }
}

impl Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Local(path) => write!(f, "{}", path.display()),
            DataSource::Remote(url) => write!(f, "{url}"),
        }
    }
}

/// The URL ECDC published the dataset under on a given day.
pub fn default_url(config: &Config, date: NaiveDate) -> String {
    format!(
        "{}{}{}",
        config.base_url,
        date.format("%Y-%m-%d"),
        config.file_extension
    )
}

async fn fetch_bytes(source: &DataSource) -> anyhow::Result<Vec<u8>> {
    match source {
        DataSource::Remote(url) => {
            let response = reqwest::get(url)
                .await?
                .error_for_status()
                .with_context(|| format!("Failed to download '{url}'"))?;
            Ok(response.bytes().await?.to_vec())
        }
        DataSource::Local(path) => read_local(path).await,
    }
}

async fn read_local(path: &Path) -> anyhow::Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read '{}'", path.display()))
}

/// Loads the table behind `source` and returns it with canonical column names and types.
pub async fn load(source: &DataSource, config: &Config) -> anyhow::Result<DataFrame> {
    info!("Attempting to load dataframe from {source}");
    let bytes = fetch_bytes(source).await?;
    debug!("Fetched {} bytes", bytes.len());

    let format = source.format();
    let date_format = config.csv_date_format.clone();
    // Parsing is blocking
    let df = tokio::task::spawn_blocking(move || -> CovidPlotResult<DataFrame> {
        let raw = match format {
            SourceFormat::Csv => read_csv(bytes)?,
            SourceFormat::Spreadsheet => read_spreadsheet(bytes)?,
        };
        normalize(raw, &date_format)
    })
    .await??;
    info!("Loaded table with shape: {:?}", df.shape());
    Ok(df)
}

fn read_csv(bytes: Vec<u8>) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
}

fn read_spreadsheet(bytes: Vec<u8>) -> CovidPlotResult<DataFrame> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(CovidPlotError::EmptyWorkbook)??;
    frame_from_range(&range)
}

/// Builds a frame from the first sheet of a workbook. The first row is the header; only the
/// columns we know about are kept, already under their canonical names.
pub fn frame_from_range(range: &Range<Data>) -> CovidPlotResult<DataFrame> {
    let mut rows = range.rows();
    let header = rows.next().ok_or(CovidPlotError::EmptyWorkbook)?;
    let rows = rows.collect_vec();

    let known = header
        .iter()
        .enumerate()
        .filter_map(|(idx, cell)| COL::canonical(&cell.to_string()).map(|name| (idx, name)))
        .unique_by(|(_, name)| *name)
        .collect_vec();
    debug!("Spreadsheet columns used: {known:?}");

    let mut columns = Vec::with_capacity(known.len());
    for (idx, name) in known {
        let cells = rows.iter().map(|row| row.get(idx).unwrap_or(&Data::Empty));
        let series = match name {
            COL::DATE_REP => {
                let dates = cells
                    .enumerate()
                    .map(|(row, cell)| date_from_cell(cell, row, name))
                    .collect::<CovidPlotResult<Vec<Option<NaiveDate>>>>()?;
                Series::new(name, dates)
            }
            COL::CASES | COL::DEATHS => {
                let counts = cells
                    .enumerate()
                    .map(|(row, cell)| count_from_cell(cell, row, name))
                    .collect::<CovidPlotResult<Vec<Option<i64>>>>()?;
                Series::new(name, counts)
            }
            _ => {
                let text = cells
                    .map(|cell| match cell {
                        Data::Empty => None,
                        other => Some(other.to_string()),
                    })
                    .collect_vec();
                Series::new(name, text)
            }
        };
        columns.push(series);
    }
    Ok(DataFrame::new(columns)?)
}

fn invalid_cell(cell: &Data, row: usize, column: &str) -> CovidPlotError {
    CovidPlotError::InvalidCell {
        // 1-based sheet row, after the header
        row: row + 2,
        column: column.to_string(),
        value: cell.to_string(),
    }
}

fn count_from_cell(cell: &Data, row: usize, column: &str) -> CovidPlotResult<Option<i64>> {
    match cell {
        Data::Empty => Ok(None),
        Data::Int(value) => Ok(Some(*value)),
        Data::Float(value) => Ok(Some(value.round() as i64)),
        Data::String(value) if value.trim().is_empty() => Ok(None),
        Data::String(value) => value
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid_cell(cell, row, column)),
        _ => Err(invalid_cell(cell, row, column)),
    }
}

fn date_from_cell(cell: &Data, row: usize, column: &str) -> CovidPlotResult<Option<NaiveDate>> {
    match cell {
        Data::Empty => Ok(None),
        Data::String(value) => SPREADSHEET_DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(value.trim(), format).ok())
            .map(Some)
            .ok_or_else(|| invalid_cell(cell, row, column)),
        other => other
            .as_date()
            .map(Some)
            .ok_or_else(|| invalid_cell(cell, row, column)),
    }
}

/// Renames source columns to their canonical names and coerces their types: text ids, date
/// report dates, i64 counts. Fails if a required column is missing.
pub fn normalize(df: DataFrame, date_format: &str) -> CovidPlotResult<DataFrame> {
    let source_names = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect_vec();
    let find_source = |canonical: &str| {
        source_names
            .iter()
            .find(|name| COL::canonical(name) == Some(canonical))
            .cloned()
    };

    let mut exprs = Vec::with_capacity(COL::REQUIRED.len() + 1);
    for canonical in COL::REQUIRED {
        let source = find_source(canonical)
            .ok_or_else(|| CovidPlotError::MissingColumn(canonical.to_string()))?;
        let expr = match canonical {
            COL::DATE_REP => date_expr(&df, &source, date_format)?,
            COL::CASES | COL::DEATHS => col(&source).strict_cast(DataType::Int64),
            _ => col(&source).cast(DataType::String),
        };
        exprs.push(expr.alias(canonical));
    }
    if let Some(source) = find_source(COL::COUNTRY_NAME) {
        exprs.push(col(&source).cast(DataType::String).alias(COL::COUNTRY_NAME));
    }

    Ok(df.lazy().select(exprs).collect()?)
}

fn date_expr(df: &DataFrame, source: &str, date_format: &str) -> CovidPlotResult<Expr> {
    match df.column(source)?.dtype() {
        DataType::Date => Ok(col(source)),
        DataType::Datetime(_, _) => Ok(col(source).cast(DataType::Date)),
        DataType::String => Ok(col(source).str().to_date(StrptimeOptions {
            format: Some(date_format.into()),
            ..Default::default()
        })),
        other => Err(CovidPlotError::InvalidDateColumn(other.to_string())),
    }
}
