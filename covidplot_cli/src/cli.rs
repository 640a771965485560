use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use covidplot::{
    config::Config, metric::Metric, render::default_output_path, source::DataSource, CovidPlot,
};
use log::{debug, info, warn};
use spinners::{Spinner, Spinners, Stream};

use crate::display::{display_final_values, display_summary};
use crate::error::CovidPlotCliResult;

const DEFAULT_PROGRESS_SPINNER: Spinners = Spinners::Dots;
const COMPLETE_PROGRESS_STRING: &str = "✔";
const RUNNING_TAIL_STRING: &str = "...";
const LOADING_STRING: &str = "Loading ECDC data";

/// Spellings of the deaths flag. Only the first argument is checked for them.
const DEATHS_FLAGS: [&str; 3] = ["-d", "-deaths", "--deaths"];

/// Plots cumulative COVID-19 cases or deaths for a fixed set of countries, aligned on the day
/// each crossed the threshold, against doubling-time guides.
#[derive(Parser, Debug)]
#[command(version, about, name = "covidplot")]
pub struct Cli {
    #[arg(
        short = 'd',
        long,
        help = "Plot deaths instead of cases (threshold 10 instead of 100)"
    )]
    pub deaths: bool,
    #[arg(
        value_name = "PATH_OR_URL",
        allow_hyphen_values = true,
        help = "Local file or http(s) URL of the ECDC table (defaults to today's download)"
    )]
    pub source: Option<String>,
    #[arg(
        short = 'o',
        long,
        help = "Image file to write the chart to (.svg for vector output)"
    )]
    pub output: Option<PathBuf>,
    #[arg(long, help = "Print a table of the plotted series")]
    pub summary: bool,
    #[arg(short = 'q', long, help = "Do not show the progress spinner")]
    pub quiet: bool,
}

/// Rewrites a deaths flag in first position to `--deaths` and drops deaths flags anywhere else,
/// so `covidplot data.xlsx -d` plots cases.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .enumerate()
        .filter_map(|(idx, arg)| {
            if idx == 0 || !DEATHS_FLAGS.contains(&arg.as_str()) {
                Some(arg)
            } else if idx == 1 {
                Some("--deaths".to_string())
            } else {
                warn!("Ignoring '{arg}': the deaths flag must be the first argument");
                None
            }
        })
        .collect()
}

impl Cli {
    pub fn metric(&self) -> Metric {
        Metric::from_deaths_flag(self.deaths)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(self.metric()))
    }

    pub async fn run(&self, config: Config) -> CovidPlotCliResult<()> {
        let metric = self.metric();
        info!("Plotting {metric}");
        let source = DataSource::resolve(self.source.as_deref(), &config, Local::now().date_naive());
        debug!("source: {source}");

        let covidplot = CovidPlot::new_with_config(config);
        let sp = (!self.quiet).then(|| {
            Spinner::with_timer_and_stream(
                DEFAULT_PROGRESS_SPINNER,
                LOADING_STRING.to_string() + RUNNING_TAIL_STRING,
                Stream::Stderr,
            )
        });
        let loaded = covidplot.load(&source).await;
        if let Some(mut s) = sp {
            s.stop_with_symbol(COMPLETE_PROGRESS_STRING);
        }
        let df = loaded?;
        debug!("{df:#?}");

        let chart = covidplot.growth_chart(&df, metric, &source)?;
        display_final_values(&chart.series);
        if self.summary {
            display_summary(&chart)?;
        }

        let output = self.output_path();
        covidplot.render(&chart, &output)?;
        eprintln!("Chart written to {}", output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(normalize_args(
            std::iter::once("covidplot")
                .chain(args.iter().copied())
                .map(str::to_string),
        ))
    }

    #[test]
    fn cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn first_deaths_flag_should_be_rewritten() {
        let args = normalize_args(["covidplot", "-deaths", "data.xlsx"].map(str::to_string));
        assert_eq!(args, vec!["covidplot", "--deaths", "data.xlsx"]);
    }

    #[test]
    fn later_deaths_flag_should_be_dropped() {
        let args = normalize_args(["covidplot", "data.xlsx", "-d"].map(str::to_string));
        assert_eq!(args, vec!["covidplot", "data.xlsx"]);
    }

    #[test]
    fn every_deaths_spelling_should_select_deaths() {
        for flag in ["-d", "--deaths", "-deaths"] {
            let cli = parse(&[flag]);
            assert_eq!(cli.metric(), Metric::Deaths, "{flag} should select deaths");
        }
    }

    #[test]
    fn no_flag_should_select_cases() {
        let cli = parse(&["data.xlsx"]);
        assert_eq!(cli.metric(), Metric::Cases);
        assert_eq!(cli.source.as_deref(), Some("data.xlsx"));
        assert!(!cli.summary);
    }

    #[test]
    fn deaths_flag_after_source_should_select_cases() {
        for flag in ["-d", "--deaths", "-deaths"] {
            let cli = parse(&["data.xlsx", flag]);
            assert_eq!(cli.metric(), Metric::Cases, "{flag} after the source should be ignored");
            assert_eq!(cli.source.as_deref(), Some("data.xlsx"));
        }
    }

    #[test]
    fn source_may_start_with_a_dash() {
        let cli = parse(&["-data.xlsx"]);
        assert_eq!(cli.metric(), Metric::Cases);
        assert_eq!(cli.source.as_deref(), Some("-data.xlsx"));
    }

    #[test]
    fn options_should_still_parse_around_source() {
        let cli = parse(&["-d", "data.xlsx", "-q", "--summary", "-o", "chart.svg"]);
        assert_eq!(cli.metric(), Metric::Deaths);
        assert_eq!(cli.source.as_deref(), Some("data.xlsx"));
        assert!(cli.quiet);
        assert!(cli.summary);
        assert_eq!(cli.output, Some(PathBuf::from("chart.svg")));
    }

    #[test]
    fn output_should_default_to_window_title() {
        assert_eq!(parse(&[]).output_path(), PathBuf::from("covid-19-cases-ecdc.png"));
        assert_eq!(
            parse(&["-d"]).output_path(),
            PathBuf::from("covid-19-deaths-ecdc.png")
        );
        assert_eq!(
            parse(&["-o", "chart.svg"]).output_path(),
            PathBuf::from("chart.svg")
        );
    }
}
