use crate::entities::strategy_params::validate_capital;
use crate::errors::PipelineError;
use crate::value_objects::return_row::ReturnRow;
use crate::value_objects::signal::Signal;
use crate::value_objects::signal_row::SignalRow;

/// Executable positions from raw signals: each period trades on the previous
/// period's signal. The first period, and any period whose previous signal is
/// undefined, is flat.
pub fn lag_positions(signals: &[Option<Signal>]) -> Vec<Signal> {
    let mut positions = Vec::with_capacity(signals.len());
    let mut previous: Option<Option<Signal>> = None;
    for signal in signals {
        let position = match previous {
            None => Signal::Flat,
            // No confirmed trend yet: stay out of the market.
            Some(None) => Signal::Flat,
            Some(Some(prev)) => prev,
        };
        positions.push(position);
        previous = Some(*signal);
    }
    positions
}

/// Turns lagged positions into per-period returns and a compounding equity
/// curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSimulator {
    initial_capital: f64,
}

impl PositionSimulator {
    pub fn new(initial_capital: f64) -> Result<Self, PipelineError> {
        validate_capital(initial_capital)?;
        Ok(Self { initial_capital })
    }

    /// Single left-to-right pass; `equity_curve[t]` only depends on rows
    /// `0..=t`.
    pub fn simulate(&self, rows: &[SignalRow]) -> Vec<ReturnRow> {
        let mut out = Vec::with_capacity(rows.len());
        let mut growth = 1.0f64;
        let mut prev_price: Option<f64> = None;

        for row in rows {
            let returns = match prev_price {
                Some(prev) => row.price / prev - 1.0,
                None => 0.0,
            };
            let strategy_returns = row.position.as_factor() * returns;
            growth *= 1.0 + strategy_returns;

            out.push(ReturnRow {
                row: row.clone(),
                returns,
                strategy_returns,
                equity_curve: self.initial_capital * growth,
            });
            prev_price = Some(row.price);
        }

        out
    }
}
