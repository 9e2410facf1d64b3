use crate::errors::PipelineError;
use crate::services::features::cumulative_max;
use crate::value_objects::return_row::ReturnRow;
use serde::{Deserialize, Serialize};

/// Annualisation constant for daily bars.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Report keys in presentation order.
pub const REPORT_KEYS: [&str; 4] = [
    "total_return_pct",
    "sharpe_ratio",
    "max_drawdown_pct",
    "win_rate_pct",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub total_return_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown_pct: f64,
    pub win_rate_pct: f64,
}

impl PerformanceReport {
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            (REPORT_KEYS[0], self.total_return_pct),
            (REPORT_KEYS[1], self.sharpe_ratio),
            (REPORT_KEYS[2], self.max_drawdown_pct),
            (REPORT_KEYS[3], self.win_rate_pct),
        ]
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "total_return_pct": self.total_return_pct,
            "sharpe_ratio": self.sharpe_ratio,
            "max_drawdown_pct": self.max_drawdown_pct,
            "win_rate_pct": self.win_rate_pct,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsConfig {
    /// Periods per year used to annualise the Sharpe ratio.
    pub annualization_factor: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            annualization_factor: TRADING_DAYS_PER_YEAR,
        }
    }
}

impl MetricsConfig {
    pub fn new(annualization_factor: f64) -> Result<Self, PipelineError> {
        if !annualization_factor.is_finite() || annualization_factor <= 0.0 {
            return Err(PipelineError::invalid_config(format!(
                "annualization_factor must be a positive number (got {annualization_factor})"
            )));
        }
        Ok(Self {
            annualization_factor,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceAnalyzer {
    config: MetricsConfig,
}

impl PerformanceAnalyzer {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, rows: &[ReturnRow], initial_capital: f64) -> PerformanceReport {
        let strategy_returns: Vec<f64> = rows.iter().map(|r| r.strategy_returns).collect();
        let equity: Vec<f64> = rows.iter().map(|r| r.equity_curve).collect();

        PerformanceReport {
            total_return_pct: total_return(&equity, initial_capital) * 100.0,
            sharpe_ratio: sharpe_ratio(&strategy_returns, self.config.annualization_factor),
            max_drawdown_pct: max_drawdown(&equity) * 100.0,
            win_rate_pct: win_rate(&strategy_returns) * 100.0,
        }
    }
}

/// Fractional return of the last equity value over the starting capital.
pub fn total_return(equity_curve: &[f64], initial_capital: f64) -> f64 {
    match equity_curve.last() {
        Some(last) if initial_capital > 0.0 => last / initial_capital - 1.0,
        _ => 0.0,
    }
}

/// `mean / sample_std * sqrt(periods_per_year)`; zero for constant or
/// single-element returns.
pub fn sharpe_ratio(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let first = returns[0];
    if returns.iter().all(|r| *r == first) {
        return 0.0;
    }

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let var = returns
        .iter()
        .map(|ret| {
            let diff = ret - mean;
            diff * diff
        })
        .sum::<f64>()
        / (returns.len() as f64 - 1.0);

    let std = var.sqrt();
    if std == 0.0 || !std.is_finite() {
        0.0
    } else {
        mean / std * periods_per_year.sqrt()
    }
}

/// Worst peak-to-trough decline as a fraction, `<= 0`. The peak at `t` is the
/// maximum of the curve up to and including `t`.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let peaks = cumulative_max(equity_curve);
    equity_curve
        .iter()
        .zip(&peaks)
        .filter(|(_, peak)| **peak > 0.0)
        .map(|(equity, peak)| equity / peak - 1.0)
        .fold(0.0f64, f64::min)
}

/// Share of strictly positive periods among all non-zero periods.
pub fn win_rate(returns: &[f64]) -> f64 {
    let wins = returns.iter().filter(|r| **r > 0.0).count();
    let losses = returns.iter().filter(|r| **r < 0.0).count();
    if wins + losses == 0 {
        0.0
    } else {
        wins as f64 / (wins + losses) as f64
    }
}
