use std::path::Path;

use anyhow::Result;
use log::debug;
use polars::frame::DataFrame;

use crate::{
    chart::GrowthChart, config::Config, error::CovidPlotResult, metric::Metric,
    source::DataSource,
};

// Re-exports
pub use column_names as COL;

// Modules
pub mod chart;
pub mod column_names;
pub mod config;
pub mod error;
pub mod metric;
pub mod render;
pub mod series;
pub mod source;

/// Type for loading ECDC data and building growth charts from it
pub struct CovidPlot {
    pub config: Config,
}

impl Default for CovidPlot {
    fn default() -> Self {
        Self::new_with_config(Config::default())
    }
}

impl CovidPlot {
    /// Setup the CovidPlot object with custom configuration
    pub fn new_with_config(config: Config) -> Self {
        debug!("config: {config:?}");
        Self { config }
    }

    /// Reads the daily-counts table from a local file or URL
    pub async fn load(&self, source: &DataSource) -> Result<DataFrame> {
        source::load(source, &self.config).await
    }

    /// Selects the compared countries and lays out the chart for `metric`
    pub fn growth_chart(
        &self,
        df: &DataFrame,
        metric: Metric,
        source: &DataSource,
    ) -> CovidPlotResult<GrowthChart> {
        GrowthChart::new(df, metric, &source.to_string())
    }

    /// Draws `chart` to `path` at the configured size
    pub fn render(&self, chart: &GrowthChart, path: &Path) -> Result<()> {
        render::render(
            chart,
            path,
            (self.config.chart.width, self.config.chart.height),
        )
    }
}
