//! Application settings.
//!
//! Read from an optional `settings.toml` in the working directory, then
//! overridden by `SHARESPLIT__<SECTION>__<KEY>` environment variables.
use config::{Config, ConfigError, Environment, File};
use engine::{EngineError, MoneyCents, SplitTolerances};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

/// How far submitted shares may drift from the expense total.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Split {
    /// Currency units, e.g. `10.00`.
    pub exact_tolerance: Decimal,
    /// Percentage points, e.g. `2`.
    pub percentage_tolerance: Decimal,
}

impl Default for Split {
    fn default() -> Self {
        Self {
            exact_tolerance: Decimal::TEN,
            percentage_tolerance: Decimal::TWO,
        }
    }
}

impl Split {
    pub fn tolerances(&self) -> Result<SplitTolerances, EngineError> {
        SplitTolerances::new(
            MoneyCents::try_from(self.exact_tolerance)?,
            self.percentage_tolerance,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub split: Split,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("SHARESPLIT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
