use crate::services::quality::DataQualityReport;
use crate::value_objects::price_point::PricePoint;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuery {
    pub symbol: String,
    /// Inclusive lower bound.
    pub start: Option<NaiveDate>,
    /// Inclusive upper bound.
    pub end: Option<NaiveDate>,
}

impl PriceQuery {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            start: None,
            end: None,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

/// Source of cleaned daily prices for one instrument. Rows with a missing
/// price are dropped by the implementation, never imputed.
pub trait PriceRepository {
    fn load_prices(
        &self,
        query: &PriceQuery,
    ) -> Result<(Vec<PricePoint>, DataQualityReport), String>;
}
