use super::price_point::PricePoint;
use crate::errors::PipelineError;

/// Ordered daily prices for exactly one instrument.
///
/// Only constructible through [`PriceSeries::new`], which rejects inputs the
/// return math cannot handle: empty series, non-increasing dates and missing
/// (non-finite) or non-positive prices.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, PipelineError> {
        let symbol = symbol.into();
        if points.is_empty() {
            return Err(PipelineError::malformed(
                &symbol,
                "price series is empty (no rows in the requested date range)",
            ));
        }

        let mut prev: Option<&PricePoint> = None;
        for (idx, point) in points.iter().enumerate() {
            if !point.price.is_finite() {
                return Err(PipelineError::malformed(
                    &symbol,
                    format!("non-finite price at row {idx} ({})", point.timestamp),
                ));
            }
            if point.price <= 0.0 {
                return Err(PipelineError::malformed(
                    &symbol,
                    format!(
                        "non-positive price {} at row {idx} ({})",
                        point.price, point.timestamp
                    ),
                ));
            }
            if let Some(prev) = prev {
                if point.timestamp <= prev.timestamp {
                    return Err(PipelineError::malformed(
                        &symbol,
                        format!(
                            "timestamps not strictly increasing at row {idx}: {} follows {}",
                            point.timestamp, prev.timestamp
                        ),
                    ));
                }
            }
            prev = Some(point);
        }

        Ok(Self { symbol, points })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
