use strum_macros::{Display, EnumString};

use crate::COL;

/// The quantity being charted. Each metric has its own threshold: a country enters the chart on
/// the day its running total first reaches it.
#[derive(Clone, Copy, Debug, Default, Display, EnumString, PartialEq, Eq)]
#[strum(ascii_case_insensitive)]
pub enum Metric {
    #[default]
    Cases,
    Deaths,
}

impl Metric {
    pub fn from_deaths_flag(deaths: bool) -> Self {
        if deaths {
            Metric::Deaths
        } else {
            Metric::Cases
        }
    }

    /// Column of the source table holding daily counts for this metric.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Cases => COL::CASES,
            Metric::Deaths => COL::DEATHS,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Cases => "Cases",
            Metric::Deaths => "Deaths",
        }
    }

    /// Minimum cumulative count shown on the chart, also the bottom of the y-axis.
    pub fn threshold(&self) -> i64 {
        match self {
            Metric::Cases => 100,
            Metric::Deaths => 10,
        }
    }

    pub fn window_title(&self) -> String {
        format!("covid-19-{}-ecdc", self.label().to_lowercase())
    }
}
