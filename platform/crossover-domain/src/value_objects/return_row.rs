use super::signal_row::SignalRow;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnRow {
    #[serde(flatten)]
    pub row: SignalRow,
    pub returns: f64,
    pub strategy_returns: f64,
    pub equity_curve: f64,
}
