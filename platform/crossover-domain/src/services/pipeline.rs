use crate::entities::metrics::{MetricsConfig, PerformanceAnalyzer, PerformanceReport};
use crate::entities::strategy_params::StrategyParams;
use crate::errors::PipelineError;
use crate::services::signal::SignalGenerator;
use crate::services::simulator::PositionSimulator;
use crate::value_objects::price_series::PriceSeries;
use crate::value_objects::return_row::ReturnRow;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub rows: Vec<ReturnRow>,
    pub report: PerformanceReport,
    /// Fewer prices than `long_window`: no signal is ever defined and the
    /// equity curve stays at the initial capital.
    pub insufficient_data: bool,
}

impl PipelineOutput {
    pub fn defined_signals(&self) -> usize {
        self.rows.iter().filter(|r| r.row.signal.is_some()).count()
    }
}

/// Signal generation, lagged simulation and performance analysis for one
/// instrument.
pub fn run_pipeline(
    prices: &PriceSeries,
    params: &StrategyParams,
    metrics: &MetricsConfig,
) -> Result<PipelineOutput, PipelineError> {
    let generator = SignalGenerator::new(params.short_window(), params.long_window())?;
    let simulator = PositionSimulator::new(params.initial_capital())?;
    let analyzer = PerformanceAnalyzer::new(*metrics);

    let signal_rows = generator.generate(prices);
    let rows = simulator.simulate(&signal_rows);
    let report = analyzer.analyze(&rows, params.initial_capital());

    Ok(PipelineOutput {
        insufficient_data: prices.len() < params.long_window(),
        rows,
        report,
    })
}
