use clap::ValueEnum;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Installs the global subscriber on stderr; stdout is reserved for reports.
/// A non-empty `CROSSOVER_LOG` takes precedence over `log_level`.
pub fn init_tracing(log_level: &str, format: LogFormat) -> Result<(), String> {
    let filter = resolve_filter(std::env::var("CROSSOVER_LOG").ok(), log_level);
    let env_filter = EnvFilter::try_new(&filter)
        .map_err(|err| format!("invalid log filter `{filter}`: {err}"))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| format!("failed to install tracing subscriber: {err}"))
}

fn resolve_filter(env_value: Option<String>, log_level: &str) -> String {
    env_value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| log_level.to_string())
}

/// Names and units of everything the backtest records. A no-op until a
/// recorder is installed.
pub fn describe_metrics() {
    use metrics::{describe_counter, describe_histogram, Unit};

    describe_histogram!(
        "crossover.csv.load_ms",
        Unit::Milliseconds,
        "Time to read and parse one price CSV"
    );
    describe_histogram!(
        "crossover.backtest.load_prices_ms",
        Unit::Milliseconds,
        "Price loading time per instrument"
    );
    describe_histogram!(
        "crossover.backtest.pipeline_ms",
        Unit::Milliseconds,
        "Signal, simulation and analysis time per instrument"
    );
    describe_histogram!(
        "crossover.validate.instrument_ms",
        Unit::Milliseconds,
        "Validation time per instrument"
    );
    describe_counter!(
        "crossover.backtest.instruments_ok",
        "Instruments that produced a report"
    );
    describe_counter!(
        "crossover.backtest.instruments_failed",
        "Instruments that failed to load or were rejected"
    );
}

#[cfg(feature = "prometheus")]
pub fn init_metrics(metrics_addr: Option<SocketAddr>) -> Result<(), String> {
    let Some(addr) = metrics_addr else {
        return Ok(());
    };
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|err| format!("failed to serve metrics on {addr}: {err}"))?;
    tracing::info!(metrics_addr = %addr, "serving prometheus metrics");
    Ok(())
}

#[cfg(not(feature = "prometheus"))]
pub fn init_metrics(metrics_addr: Option<SocketAddr>) -> Result<(), String> {
    match metrics_addr {
        Some(addr) => Err(format!(
            "--metrics-addr {addr} needs a build with the `prometheus` feature"
        )),
        None => Ok(()),
    }
}
