use crossover_application::config::{load_config, Config};
use crossover_application::meta::engine_name;
use std::path::PathBuf;

/// `--config`, then env CROSSOVER_CONFIG, then built-in defaults.
pub(super) fn resolve_config(
    config_path: Option<PathBuf>,
    prices_dir: Option<PathBuf>,
) -> Result<Config, String> {
    let config_path = config_path.or_else(|| {
        std::env::var("CROSSOVER_CONFIG")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    });
    let mut config = match &config_path {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    if let Some(dir) = prices_dir {
        config.data.prices_dir = dir.display().to_string();
    }

    tracing::info!(
        engine = engine_name(),
        config = %config_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults".to_string()),
        instruments = ?config.run.instruments,
        short_window = config.strategy.short_window,
        long_window = config.strategy.long_window,
        initial_capital = config.run.initial_capital,
        prices_dir = %config.data.prices_dir,
        "configuration resolved"
    );
    Ok(config)
}
