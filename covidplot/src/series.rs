//! Per-country cumulative series, aligned to the day each country crossed the metric threshold.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use itertools::izip;
use log::{debug, warn};
use polars::prelude::*;

use crate::{
    error::{CovidPlotError, CovidPlotResult},
    metric::Metric,
    COL,
};

/// Countries compared on the chart, in legend order.
pub const SELECTED_COUNTRIES: [&str; 8] = ["US", "DE", "IT", "FR", "ES", "CN", "KR", "JP"];

#[derive(Clone, Debug, PartialEq)]
pub struct CountrySeries {
    pub geo_id: String,
    pub name: Option<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Running totals, oldest first, starting at the threshold-crossing day.
    pub cumulative: Vec<i64>,
}

pub type CountrySeriesMap = BTreeMap<String, CountrySeries>;

impl CountrySeries {
    fn new(geo_id: &str) -> Self {
        Self {
            geo_id: geo_id.to_string(),
            name: None,
            first_date: None,
            last_date: None,
            cumulative: vec![],
        }
    }

    fn push(&mut self, date: Option<NaiveDate>, value: i64) {
        if self.first_date.is_none() {
            self.first_date = date;
        }
        if date.is_some() {
            self.last_date = date;
        }
        self.cumulative.push(value);
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Most recent cumulative value.
    pub fn last(&self) -> i64 {
        self.cumulative.last().copied().unwrap_or_default()
    }

    /// The first `max_len` values, or all of them if the series is shorter.
    pub fn truncated(&self, max_len: usize) -> &[i64] {
        &self.cumulative[..max_len.min(self.len())]
    }
}

/// Adds the running total of `metric` per country and keeps the rows at or above its threshold.
///
/// ECDC publishes newest-first, so the frame is reversed before summing. Countries are keyed on
/// `GeoId` because country names are not consistently capitalised. Rows without a count are
/// dropped; the running total carries on over the remaining rows.
pub fn cumulative_frame(df: &DataFrame, metric: Metric) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .reverse()
        .with_column(
            col(metric.column())
                .cum_sum(false)
                .over([col(COL::GEO_ID)])
                .alias(COL::CUMULATIVE),
        )
        .filter(
            col(metric.column())
                .is_not_null()
                .and(col(COL::CUMULATIVE).gt_eq(lit(metric.threshold()))),
        )
        .collect()
}

/// Builds the series of every country with at least two rows past the threshold.
pub fn build_country_series(df: &DataFrame, metric: Metric) -> CovidPlotResult<CountrySeriesMap> {
    let cumulative = cumulative_frame(df, metric)?;
    debug!("cumulative: {cumulative:#?}");

    let names = match cumulative.column(COL::COUNTRY_NAME) {
        Ok(names) => Some(names.str()?),
        Err(_) => None,
    };

    let mut map = CountrySeriesMap::new();
    let mut skipped = 0;
    for (idx, (geo_id, date, value)) in izip!(
        cumulative.column(COL::GEO_ID)?.str()?,
        cumulative.column(COL::DATE_REP)?.date()?.as_date_iter(),
        cumulative.column(COL::CUMULATIVE)?.i64()?,
    )
    .enumerate()
    {
        let (Some(geo_id), Some(value)) = (geo_id, value) else {
            skipped += 1;
            continue;
        };
        let series = map
            .entry(geo_id.to_string())
            .or_insert_with(|| CountrySeries::new(geo_id));
        if series.name.is_none() {
            series.name = names.and_then(|names| names.get(idx)).map(str::to_string);
        }
        series.push(date, value);
    }
    if skipped > 0 {
        warn!("Skipped {skipped} rows without a country code");
    }

    map.retain(|_, series| series.len() > 1);
    debug!("Built series for {} countries", map.len());
    Ok(map)
}

/// Looks up `codes` in order. Every code must be present.
pub fn select_countries(
    map: &CountrySeriesMap,
    codes: &[&str],
) -> CovidPlotResult<Vec<CountrySeries>> {
    codes
        .iter()
        .map(|code| {
            map.get(*code)
                .cloned()
                .ok_or_else(|| CovidPlotError::CountryNotFound(code.to_string()))
        })
        .collect()
}
