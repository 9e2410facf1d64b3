use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: NaiveDate, price: f64) -> Self {
        Self { timestamp, price }
    }
}
