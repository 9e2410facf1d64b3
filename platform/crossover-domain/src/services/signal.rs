use crate::entities::strategy_params::validate_windows;
use crate::errors::PipelineError;
use crate::services::features::rolling_mean;
use crate::services::simulator::lag_positions;
use crate::value_objects::price_series::PriceSeries;
use crate::value_objects::signal::Signal;
use crate::value_objects::signal_row::SignalRow;

/// Short/long simple moving average crossover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalGenerator {
    short_window: usize,
    long_window: usize,
}

impl SignalGenerator {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, PipelineError> {
        validate_windows(short_window, long_window)?;
        Ok(Self {
            short_window,
            long_window,
        })
    }

    /// One row per price point. Rows whose averages are not yet defined keep
    /// `signal: None` and are not dropped.
    pub fn generate(&self, prices: &PriceSeries) -> Vec<SignalRow> {
        let values = prices.prices();
        let ma_short = rolling_mean(&values, self.short_window);
        let ma_long = rolling_mean(&values, self.long_window);

        let signals: Vec<Option<Signal>> = ma_short
            .iter()
            .zip(&ma_long)
            .map(|(short, long)| match (short, long) {
                (Some(short), Some(long)) => Some(Signal::from_crossover(*short, *long)),
                _ => None,
            })
            .collect();
        let positions = lag_positions(&signals);

        prices
            .points()
            .iter()
            .enumerate()
            .map(|(idx, point)| SignalRow {
                timestamp: point.timestamp,
                price: point.price,
                ma_short: ma_short[idx],
                ma_long: ma_long[idx],
                signal: signals[idx],
                position: positions[idx],
            })
            .collect()
    }
}
