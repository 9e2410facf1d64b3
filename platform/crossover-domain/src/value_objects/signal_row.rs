use super::signal::Signal;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRow {
    pub timestamp: NaiveDate,
    pub price: f64,
    pub ma_short: Option<f64>,
    pub ma_long: Option<f64>,
    pub signal: Option<Signal>,
    /// Yesterday's signal, `Flat` when none was defined.
    pub position: Signal,
}
