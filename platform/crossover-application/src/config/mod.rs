use chrono::NaiveDate;
use crossover_domain::entities::metrics::{MetricsConfig as DomainMetricsConfig, TRADING_DAYS_PER_YEAR};
use crossover_domain::entities::strategy_params::{
    StrategyParams, DEFAULT_INITIAL_CAPITAL, DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW,
};
use crossover_domain::errors::PipelineError;
use crossover_domain::repositories::price_data::PriceQuery;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_INSTRUMENTS: [&str; 2] = ["SPY", "NVDA"];
pub const DEFAULT_PRICES_DIR: &str = "data";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub run: RunConfig,
    pub strategy: StrategyConfig,
    pub data: DataConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct RunConfig {
    pub instruments: Vec<String>,
    pub initial_capital: f64,
    /// Worker threads for the batch; 1 runs instruments sequentially.
    pub parallelism: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            instruments: DEFAULT_INSTRUMENTS.iter().map(|s| s.to_string()).collect(),
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct StrategyConfig {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct DataConfig {
    pub prices_dir: String,
    /// Inclusive, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Inclusive, `YYYY-MM-DD`.
    pub end_date: Option<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            prices_dir: DEFAULT_PRICES_DIR.to_string(),
            start_date: None,
            end_date: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct MetricsConfig {
    pub annualization_factor: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            annualization_factor: TRADING_DAYS_PER_YEAR,
        }
    }
}

impl Config {
    pub fn strategy_params(&self) -> Result<StrategyParams, PipelineError> {
        StrategyParams::new(
            self.strategy.short_window,
            self.strategy.long_window,
            self.run.initial_capital,
        )
    }

    pub fn metrics_config(&self) -> Result<DomainMetricsConfig, PipelineError> {
        DomainMetricsConfig::new(self.metrics.annualization_factor)
    }

    pub fn date_range(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>), PipelineError> {
        let start = parse_date("data.start_date", self.data.start_date.as_deref())?;
        let end = parse_date("data.end_date", self.data.end_date.as_deref())?;
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(PipelineError::invalid_config(format!(
                    "data.start_date ({start}) is after data.end_date ({end})"
                )));
            }
        }
        Ok((start, end))
    }

    /// Every check that must pass before any instrument is loaded.
    pub fn validate(&self) -> Result<RunPlan, PipelineError> {
        let params = self.strategy_params()?;
        let metrics = self.metrics_config()?;
        let (start, end) = self.date_range()?;

        if self.run.instruments.is_empty() {
            return Err(PipelineError::invalid_config("run.instruments is empty"));
        }
        if let Some(blank) = self.run.instruments.iter().position(|s| s.trim().is_empty()) {
            return Err(PipelineError::invalid_config(format!(
                "run.instruments[{blank}] is blank"
            )));
        }

        Ok(RunPlan {
            instruments: self
                .run
                .instruments
                .iter()
                .map(|s| s.trim().to_string())
                .collect(),
            params,
            metrics,
            start,
            end,
            parallelism: self.run.parallelism.max(1),
        })
    }
}

/// A validated configuration, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub instruments: Vec<String>,
    pub params: StrategyParams,
    pub metrics: DomainMetricsConfig,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub parallelism: usize,
}

impl RunPlan {
    pub fn query(&self, symbol: &str) -> PriceQuery {
        PriceQuery {
            symbol: symbol.to_string(),
            start: self.start,
            end: self.end,
        }
    }
}

fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, PipelineError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|err| {
            PipelineError::invalid_config(format!("{field} `{raw}` is not YYYY-MM-DD: {err}"))
        })
}

pub fn load_config(path: &Path) -> Result<Config, String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read config {}: {}", path.display(), err))?;
    toml::from_str(&contents)
        .map_err(|err| format!("failed to parse TOML {}: {}", path.display(), err))
}

pub fn to_toml_pretty(config: &Config) -> Result<String, String> {
    toml::to_string_pretty(config)
        .map_err(|err| format!("failed to serialize config as TOML: {err}"))
}

#[cfg(test)]
mod tests {
    use super::Config;
    use crossover_domain::errors::PipelineError;

    fn parse_config(toml_str: &str) -> Config {
        toml::from_str(toml_str).expect("config should parse")
    }

    #[test]
    fn parse_config_rejects_malformed_toml() {
        let err = toml::from_str::<Config>("[run\ninitial_capital = 1").expect_err("malformed");
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse_config("");
        assert_eq!(config, Config::default());
        assert_eq!(config.run.instruments, vec!["SPY", "NVDA"]);
        assert_eq!(config.run.initial_capital, 10_000.0);
        assert_eq!(config.strategy.short_window, 20);
        assert_eq!(config.strategy.long_window, 50);
        assert_eq!(config.metrics.annualization_factor, 252.0);
        assert_eq!(config.data.prices_dir, "data");

        let plan = config.validate().expect("defaults are valid");
        assert_eq!(plan.parallelism, 1);
        assert_eq!(plan.instruments.len(), 2);
    }

    #[test]
    fn parse_full_config() {
        let config = parse_config(
            r#"
[run]
instruments = ["AAPL"]
initial_capital = 2500.0
parallelism = 4

[strategy]
short_window = 5
long_window = 15

[data]
prices_dir = "fixtures/prices"
start_date = "2015-01-01"
end_date = "2016-12-31"

[metrics]
annualization_factor = 52.0
"#,
        );
        let plan = config.validate().expect("valid");
        assert_eq!(plan.instruments, vec!["AAPL"]);
        assert_eq!(plan.params.short_window(), 5);
        assert_eq!(plan.params.long_window(), 15);
        assert_eq!(plan.params.initial_capital(), 2500.0);
        assert_eq!(plan.metrics.annualization_factor, 52.0);
        assert_eq!(plan.parallelism, 4);

        let query = plan.query("AAPL");
        assert_eq!(query.start.map(|d| d.to_string()).as_deref(), Some("2015-01-01"));
        assert_eq!(query.end.map(|d| d.to_string()).as_deref(), Some("2016-12-31"));
    }

    #[test]
    fn parse_config_rejects_unknown_fields() {
        let err = toml::from_str::<Config>("[strategy]\nshort_window = 3\nfast = true\n")
            .expect_err("unknown field should fail");
        assert!(err.to_string().to_lowercase().contains("unknown field"));
    }

    #[test]
    fn invalid_windows_fail_before_running() {
        let config = parse_config("[strategy]\nshort_window = 50\nlong_window = 20\n");
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfiguration(_))
        ));

        let config = parse_config("[run]\ninitial_capital = 0.0\n");
        assert!(config.validate().is_err());

        let config = parse_config("[run]\ninstruments = []\n");
        assert!(config.validate().is_err());

        let config = parse_config("[metrics]\nannualization_factor = -1.0\n");
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_dates_are_configuration_errors() {
        let config = parse_config("[data]\nstart_date = \"2020/01/01\"\n");
        assert!(matches!(
            config.date_range(),
            Err(PipelineError::InvalidConfiguration(_))
        ));

        let config = parse_config("[data]\nstart_date = \"2021-01-01\"\nend_date = \"2020-01-01\"\n");
        assert!(config.validate().is_err());
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let rendered = super::to_toml_pretty(&Config::default()).expect("render");
        assert_eq!(parse_config(&rendered), Config::default());
    }
}
