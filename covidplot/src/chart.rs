//! Everything about the growth chart that is not drawing: axis bounds, doubling-time guides,
//! tick positions and label formatting.

use log::debug;
use polars::frame::DataFrame;

use crate::{
    error::{CovidPlotError, CovidPlotResult},
    metric::Metric,
    series::{build_country_series, select_countries, CountrySeries, SELECTED_COUNTRIES},
};

/// Days shown past the second-longest series.
pub const EXTRA_DAYS: usize = 5;

/// Doubling periods, in days, that get a reference line.
pub const DOUBLING_DAYS: std::ops::RangeInclusive<u32> = 1..=7;

/// Multiples of each power of ten used as major ticks on the log axis.
const LOG_TICK_MULTIPLES: [f64; 3] = [1.0, 2.0, 5.0];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartBounds {
    pub min_y: f64,
    pub max_y: f64,
    /// Number of days plotted per country.
    pub max_x: usize,
}

impl ChartBounds {
    /// Limits the x-axis to `EXTRA_DAYS` past the second-longest series (the longest, China,
    /// would otherwise squash everything else) but never beyond the longest.
    pub fn from_series(series: &[CountrySeries], min_y: i64) -> CovidPlotResult<Self> {
        let mut lengths: Vec<usize> = series.iter().map(CountrySeries::len).collect();
        lengths.sort_unstable();
        let largest = *lengths.last().ok_or(CovidPlotError::NoSeries)?;
        let second = lengths
            .len()
            .checked_sub(2)
            .map(|idx| lengths[idx])
            .unwrap_or(largest);
        let max_x = (second + EXTRA_DAYS).min(largest);
        let max_y = series
            .iter()
            .map(CountrySeries::last)
            .max()
            .ok_or(CovidPlotError::NoSeries)?;
        Ok(Self {
            min_y: min_y as f64,
            max_y: max_y as f64,
            max_x,
        })
    }

    /// Last x position drawn.
    pub fn last_x(&self) -> f64 {
        self.max_x.saturating_sub(1) as f64
    }
}

/// A dotted guide from `(0, min_y)` along a curve that doubles every `days` days.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceLine {
    pub days: u32,
    pub start: (f64, f64),
    pub end: (f64, f64),
}

impl ReferenceLine {
    /// Ends where the curve reaches `max_y`, or at the last plotted day if that comes first.
    pub fn new(days: u32, bounds: &ChartBounds) -> Self {
        let daily_growth = 2f64.powf(1.0 / f64::from(days));
        let x = (bounds.max_y / bounds.min_y).ln() / daily_growth.ln();
        let end = if x > bounds.last_x() {
            let x = bounds.last_x();
            (x, daily_growth.powf(x) * bounds.min_y)
        } else {
            (x, bounds.max_y)
        };
        Self {
            days,
            start: (0.0, bounds.min_y),
            end,
        }
    }
}

pub fn reference_lines(bounds: &ChartBounds) -> Vec<ReferenceLine> {
    DOUBLING_DAYS
        .map(|days| ReferenceLine::new(days, bounds))
        .collect()
}

/// Major ticks at 1, 2 and 5 times each power of ten within `[min, max]`.
pub fn log_ticks(min: f64, max: f64) -> Vec<f64> {
    if min <= 0.0 || max < min {
        return vec![];
    }
    let first_exp = min.log10().floor() as i32;
    let last_exp = max.log10().ceil() as i32;
    (first_exp..=last_exp)
        .flat_map(|exp| {
            LOG_TICK_MULTIPLES
                .iter()
                .map(move |multiple| multiple * 10f64.powi(exp))
        })
        .filter(|tick| *tick >= min && *tick <= max)
        .collect()
}

/// The smallest 1/2/5 tick at or above `max`, used as the top of the y-axis.
pub fn axis_upper(max: f64) -> f64 {
    if max <= 0.0 {
        return 1.0;
    }
    let exp = max.log10().floor() as i32;
    (exp..=exp + 1)
        .flat_map(|exp| {
            LOG_TICK_MULTIPLES
                .iter()
                .map(move |multiple| multiple * 10f64.powi(exp))
        })
        .find(|tick| *tick >= max)
        .unwrap_or(max)
}

/// Plain integer with thousands separators, e.g. `1234567.0` as `1,234,567`.
pub fn format_thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (idx, digit) in rounded.chars().enumerate() {
        if idx > 0 && (rounded.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if value < 0.0 && rounded != "0" {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// The selected countries, the chart bounds and the guides, ready to be reported and drawn.
#[derive(Clone, Debug)]
pub struct GrowthChart {
    pub metric: Metric,
    /// Path or URL the data came from, shown in the caption.
    pub source: String,
    pub series: Vec<CountrySeries>,
    pub bounds: ChartBounds,
    pub reference_lines: Vec<ReferenceLine>,
}

impl GrowthChart {
    /// Fails if any of `SELECTED_COUNTRIES` has no series.
    pub fn new(df: &DataFrame, metric: Metric, source: &str) -> CovidPlotResult<Self> {
        Self::with_countries(df, metric, source, &SELECTED_COUNTRIES)
    }

    fn with_countries(
        df: &DataFrame,
        metric: Metric,
        source: &str,
        countries: &[&str],
    ) -> CovidPlotResult<Self> {
        let map = build_country_series(df, metric)?;
        let series = select_countries(&map, countries)?;
        let bounds = ChartBounds::from_series(&series, metric.threshold())?;
        debug!("bounds: {bounds:?}");
        let reference_lines = reference_lines(&bounds);
        Ok(Self {
            metric,
            source: source.to_string(),
            series,
            bounds,
            reference_lines,
        })
    }

    pub fn title(&self) -> String {
        format!("Coronavirus Total {}", self.metric.label())
    }

    pub fn caption(&self) -> String {
        format!("Source: {}", self.source)
    }

    /// Values drawn for one country: at most `max_x` points.
    pub fn plotted<'a>(&self, series: &'a CountrySeries) -> &'a [i64] {
        series.truncated(self.bounds.max_x)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use polars::df;

    use super::*;
    use crate::COL;

    fn series_of_len(geo_id: &str, len: usize, last: i64) -> CountrySeries {
        let mut cumulative: Vec<i64> = (0..len as i64).map(|day| 100 + day).collect();
        if let Some(value) = cumulative.last_mut() {
            *value = last;
        }
        CountrySeries {
            geo_id: geo_id.into(),
            name: None,
            first_date: None,
            last_date: None,
            cumulative,
        }
    }

    fn bounds(min_y: f64, max_y: f64, max_x: usize) -> ChartBounds {
        ChartBounds {
            min_y,
            max_y,
            max_x,
        }
    }

    #[test]
    fn max_x_should_stop_five_days_past_second_longest() -> anyhow::Result<()> {
        let series = vec![
            series_of_len("CN", 60, 80_000),
            series_of_len("IT", 30, 50_000),
            series_of_len("KR", 28, 9_000),
        ];
        let bounds = ChartBounds::from_series(&series, 100)?;
        assert_eq!(bounds.max_x, 35);
        assert_eq!(bounds.max_y, 80_000.0);
        assert_eq!(bounds.min_y, 100.0);
        Ok(())
    }

    #[test]
    fn max_x_should_not_exceed_longest() -> anyhow::Result<()> {
        let series = vec![series_of_len("US", 12, 900), series_of_len("JP", 10, 400)];
        let bounds = ChartBounds::from_series(&series, 100)?;
        assert_eq!(bounds.max_x, 12);
        Ok(())
    }

    #[test]
    fn max_x_should_respect_both_limits() -> anyhow::Result<()> {
        for lengths in [[2, 2, 2], [40, 3, 2], [9, 8, 7], [50, 49, 3]] {
            let series = lengths
                .iter()
                .enumerate()
                .map(|(idx, len)| series_of_len(&idx.to_string(), *len, 1000))
                .collect::<Vec<_>>();
            let mut sorted = lengths;
            sorted.sort_unstable();
            let bounds = ChartBounds::from_series(&series, 100)?;
            assert!(bounds.max_x <= sorted[2], "{lengths:?}");
            assert!(bounds.max_x <= sorted[1] + EXTRA_DAYS, "{lengths:?}");
        }
        Ok(())
    }

    #[test]
    fn empty_series_should_error() {
        let result = ChartBounds::from_series(&[], 100);
        assert!(matches!(result, Err(CovidPlotError::NoSeries)));
    }

    #[test]
    fn fast_doubling_should_reach_max_y() {
        let line = ReferenceLine::new(1, &bounds(100.0, 10_000.0, 20));
        assert!((line.end.0 - 100f64.log2()).abs() < 1e-9);
        assert!((line.end.0 - 6.64).abs() < 0.01);
        assert_eq!(line.end.1, 10_000.0);
    }

    #[test]
    fn slow_doubling_should_clamp_to_last_day() {
        let line = ReferenceLine::new(7, &bounds(100.0, 10_000.0, 20));
        assert_eq!(line.end.0, 19.0);
        assert!((line.end.1 - 100.0 * 2f64.powf(19.0 / 7.0)).abs() < 1e-9);
        assert!((line.end.1 - 656.27).abs() < 0.01, "{:?}", line.end);
    }

    #[test]
    fn reference_lines_should_follow_doubling_curve() {
        let bounds = bounds(10.0, 25_000.0, 31);
        let lines = reference_lines(&bounds);
        assert_eq!(lines.len(), 7);
        for line in lines {
            let (x, y) = line.end;
            let expected = bounds.min_y * 2f64.powf(x / f64::from(line.days));
            assert!((y - expected).abs() / expected < 1e-9, "{line:?}");
            assert!(x <= bounds.last_x());
            assert_eq!(line.start, (0.0, 10.0));
        }
    }

    #[test]
    fn log_ticks_should_use_one_two_five() {
        assert_eq!(
            log_ticks(100.0, 10_000.0),
            vec![100.0, 200.0, 500.0, 1_000.0, 2_000.0, 5_000.0, 10_000.0]
        );
        assert_eq!(log_ticks(10.0, 60.0), vec![10.0, 20.0, 50.0]);
        assert!(log_ticks(0.0, 10.0).is_empty());
    }

    #[test]
    fn axis_upper_should_round_up_to_tick() {
        assert_eq!(axis_upper(10_000.0), 10_000.0);
        assert_eq!(axis_upper(10_001.0), 20_000.0);
        assert_eq!(axis_upper(53_000.0), 100_000.0);
        assert_eq!(axis_upper(150.0), 200.0);
    }

    #[test]
    fn thousands_should_be_separated() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(100.0), "100");
        assert_eq!(format_thousands(1_000.0), "1,000");
        assert_eq!(format_thousands(20_000.0), "20,000");
        assert_eq!(format_thousands(1_234_567.4), "1,234,567");
        assert_eq!(format_thousands(-1_500.0), "-1,500");
    }

    fn country_rows(
        geo_ids: &mut Vec<String>,
        dates: &mut Vec<NaiveDate>,
        cases: &mut Vec<i64>,
        geo_id: &str,
        daily: &[i64],
    ) {
        let start = NaiveDate::from_ymd_opt(2020, 2, 1).unwrap();
        for (day, count) in daily.iter().enumerate().rev() {
            geo_ids.push(geo_id.to_string());
            dates.push(start + chrono::Duration::days(day as i64));
            cases.push(*count);
        }
    }

    /// Every country gets a constant daily count, so every row is past the threshold and a
    /// series' length is its number of days.
    fn chart_df(countries: &[(&str, usize)]) -> DataFrame {
        let (mut geo_ids, mut dates, mut cases) = (vec![], vec![], vec![]);
        for (idx, (geo_id, days)) in countries.iter().enumerate() {
            let daily = vec![100 * (idx as i64 + 1); *days];
            country_rows(&mut geo_ids, &mut dates, &mut cases, geo_id, &daily);
        }
        let deaths = vec![0i64; cases.len()];
        df!(
            COL::GEO_ID => geo_ids,
            COL::DATE_REP => dates,
            COL::CASES => cases,
            COL::DEATHS => deaths
        )
        .unwrap()
    }

    fn selected_with_lengths() -> Vec<(&'static str, usize)> {
        SELECTED_COUNTRIES
            .iter()
            .enumerate()
            .map(|(idx, geo_id)| (*geo_id, 10 + idx))
            .collect()
    }

    #[test]
    fn growth_chart_should_cover_selected_countries() -> anyhow::Result<()> {
        let df = chart_df(&selected_with_lengths());
        let chart = GrowthChart::new(&df, Metric::Cases, "ecdc.xlsx")?;
        let ids: Vec<&str> = chart.series.iter().map(|s| s.geo_id.as_str()).collect();
        assert_eq!(ids, SELECTED_COUNTRIES.to_vec());
        // Lengths run 10..=17, so the cap is min(16 + 5, 17)
        assert_eq!(chart.bounds.max_x, 17);
        assert_eq!(chart.bounds.max_y, (800 * 17) as f64);
        assert_eq!(chart.reference_lines.len(), 7);
        assert_eq!(chart.title(), "Coronavirus Total Cases");
        assert_eq!(chart.caption(), "Source: ecdc.xlsx");
        assert_eq!(chart.plotted(&chart.series[0]).len(), 10);
        Ok(())
    }

    #[test]
    fn growth_chart_should_fail_on_missing_country() {
        let countries = selected_with_lengths()
            .into_iter()
            .filter(|(geo_id, _)| *geo_id != "KR")
            .collect::<Vec<_>>();
        let df = chart_df(&countries);
        let err = GrowthChart::new(&df, Metric::Cases, "ecdc.xlsx").unwrap_err();
        assert!(matches!(err, CovidPlotError::CountryNotFound(ref code) if code == "KR"));
    }

    #[test]
    fn growth_chart_should_cap_plotted_points() -> anyhow::Result<()> {
        let df = chart_df(&[("CN", 60), ("IT", 20), ("KR", 12)]);
        let chart = GrowthChart::with_countries(&df, Metric::Cases, "x", &["CN", "IT", "KR"])?;
        assert_eq!(chart.bounds.max_x, 25);
        assert_eq!(chart.plotted(&chart.series[0]).len(), 25);
        assert_eq!(chart.series[0].len(), 60);
        assert_eq!(chart.plotted(&chart.series[2]).len(), 12);
        Ok(())
    }
}
