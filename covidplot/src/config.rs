use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Prefix of the daily ECDC download; the date and `file_extension` are appended.
    pub base_url: String,
    pub file_extension: String,
    /// `strptime` format of the report date column when it arrives as text (CSV sources).
    pub csv_date_format: String,
    pub chart: ChartConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: "https://www.ecdc.europa.eu/sites/default/files/documents/COVID-19-geographic-disbtribution-worldwide-".into(),
            file_extension: ".xlsx".into(),
            csv_date_format: "%d/%m/%Y".into(),
            chart: ChartConfig::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            width: 1280,
            height: 800,
        }
    }
}
