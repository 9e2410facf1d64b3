use crate::config::{Config, RunPlan};
use crossover_domain::entities::metrics::{MetricsConfig, PerformanceReport};
use crossover_domain::entities::strategy_params::StrategyParams;
use crossover_domain::errors::PipelineError;
use crossover_domain::repositories::price_data::{PriceQuery, PriceRepository};
use crossover_domain::services::pipeline::run_pipeline;
use crossover_domain::services::quality::DataQualityReport;
use crossover_domain::value_objects::price_series::PriceSeries;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, info_span, warn};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    #[error("{symbol}: failed to load prices: {message}")]
    Load { symbol: String, message: String },
    #[error("{symbol}: {source}")]
    Pipeline {
        symbol: String,
        #[source]
        source: PipelineError,
    },
}

impl RunError {
    pub fn symbol(&self) -> &str {
        match self {
            RunError::Load { symbol, .. } | RunError::Pipeline { symbol, .. } => symbol,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentReport {
    pub symbol: String,
    pub rows: usize,
    pub defined_signals: usize,
    pub insufficient_data: bool,
    pub data_quality: DataQualityReport,
    pub report: PerformanceReport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentRun {
    pub symbol: String,
    pub outcome: Result<InstrumentReport, RunError>,
}

impl InstrumentRun {
    pub fn to_json(&self) -> serde_json::Value {
        match &self.outcome {
            Ok(report) => serde_json::json!({
                "symbol": self.symbol,
                "report": report.report.to_json(),
                "rows": report.rows,
                "insufficient_data": report.insufficient_data,
            }),
            Err(err) => serde_json::json!({
                "symbol": self.symbol,
                "error": err.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// One entry per configured instrument, in configuration order.
    pub runs: Vec<InstrumentRun>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &InstrumentReport> {
        self.runs.iter().filter_map(|run| run.outcome.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &RunError> {
        self.runs.iter().filter_map(|run| run.outcome.as_ref().err())
    }

    pub fn all_failed(&self) -> bool {
        !self.runs.is_empty() && self.runs.iter().all(|run| run.outcome.is_err())
    }
}

/// Validates the configuration, then runs every instrument independently.
/// Only configuration errors are returned as `Err`; per-instrument failures
/// are recorded in the batch.
pub fn run_backtest(
    config: &Config,
    prices: &(dyn PriceRepository + Sync),
) -> Result<BatchReport, PipelineError> {
    let plan = config.validate()?;
    Ok(run_plan(&plan, prices))
}

pub fn run_plan(plan: &RunPlan, prices: &(dyn PriceRepository + Sync)) -> BatchReport {
    let _span = info_span!(
        "run_backtest",
        instruments = plan.instruments.len(),
        short_window = plan.params.short_window(),
        long_window = plan.params.long_window(),
        initial_capital = plan.params.initial_capital(),
        parallelism = plan.parallelism
    )
    .entered();

    let overall_start = Instant::now();
    let runs = if plan.parallelism > 1 && plan.instruments.len() > 1 {
        execute_parallel(plan, prices)
    } else {
        plan.instruments
            .iter()
            .map(|symbol| execute_one(plan, symbol, prices))
            .collect()
    };

    let batch = BatchReport { runs };
    info!(
        ok = batch.succeeded().count(),
        failed = batch.failed().count(),
        total_ms = overall_start.elapsed().as_millis() as u64,
        "backtest batch finished"
    );
    batch
}

/// Load, validate and run the pipeline for a single instrument.
pub fn run_instrument(
    query: &PriceQuery,
    params: &StrategyParams,
    metrics: &MetricsConfig,
    prices: &dyn PriceRepository,
) -> Result<InstrumentReport, RunError> {
    let symbol = query.symbol.clone();
    let _span = info_span!("run_instrument", symbol = %symbol).entered();

    let stage_start = Instant::now();
    let (points, data_quality) = prices.load_prices(query).map_err(|message| RunError::Load {
        symbol: symbol.clone(),
        message,
    })?;
    metrics::histogram!("crossover.backtest.load_prices_ms")
        .record(stage_start.elapsed().as_millis() as f64);

    if data_quality.missing_price > 0 {
        warn!(
            dropped = data_quality.missing_price,
            "rows with missing price were dropped"
        );
    }

    let stage_start = Instant::now();
    let series = PriceSeries::new(symbol.clone(), points).map_err(|source| RunError::Pipeline {
        symbol: symbol.clone(),
        source,
    })?;
    let output = run_pipeline(&series, params, metrics).map_err(|source| RunError::Pipeline {
        symbol: symbol.clone(),
        source,
    })?;
    metrics::histogram!("crossover.backtest.pipeline_ms")
        .record(stage_start.elapsed().as_millis() as f64);

    if output.insufficient_data {
        warn!(
            rows = series.len(),
            long_window = params.long_window(),
            "insufficient history for a defined signal; reporting a flat run"
        );
    }

    Ok(InstrumentReport {
        rows: output.rows.len(),
        defined_signals: output.defined_signals(),
        insufficient_data: output.insufficient_data,
        data_quality,
        report: output.report,
        symbol,
    })
}

fn execute_one(plan: &RunPlan, symbol: &str, prices: &dyn PriceRepository) -> InstrumentRun {
    let outcome = run_instrument(&plan.query(symbol), &plan.params, &plan.metrics, prices);
    match &outcome {
        Ok(report) => {
            metrics::counter!("crossover.backtest.instruments_ok").increment(1);
            info!(
                symbol = %symbol,
                total_return_pct = report.report.total_return_pct,
                sharpe_ratio = report.report.sharpe_ratio,
                max_drawdown_pct = report.report.max_drawdown_pct,
                win_rate_pct = report.report.win_rate_pct,
                "instrument finished"
            );
        }
        Err(err) => {
            metrics::counter!("crossover.backtest.instruments_failed").increment(1);
            warn!(symbol = %symbol, error = %err, "instrument failed");
        }
    }
    InstrumentRun {
        symbol: symbol.to_string(),
        outcome,
    }
}

fn execute_parallel(plan: &RunPlan, prices: &(dyn PriceRepository + Sync)) -> Vec<InstrumentRun> {
    let worker_count = plan.parallelism.max(1).min(plan.instruments.len());
    let next_index = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, InstrumentRun)>();

    std::thread::scope(|scope| {
        for _ in 0..worker_count {
            let tx = tx.clone();
            let next_index_ref = &next_index;
            scope.spawn(move || loop {
                let idx = next_index_ref.fetch_add(1, Ordering::Relaxed);
                let Some(symbol) = plan.instruments.get(idx) else {
                    break;
                };
                let run = execute_one(plan, symbol, prices);
                if tx.send((idx, run)).is_err() {
                    break;
                }
            });
        }

        drop(tx);

        let mut entries: Vec<(usize, InstrumentRun)> = rx.iter().collect();
        entries.sort_by_key(|(idx, _)| *idx);
        entries.into_iter().map(|(_, run)| run).collect()
    })
}
