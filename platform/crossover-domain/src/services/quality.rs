use crate::value_objects::price_point::PricePoint;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataQualityReport {
    pub rows_read: usize,
    /// Rows dropped because the price was empty or not a number.
    pub missing_price: usize,
    pub invalid_price: usize,
    pub duplicates: usize,
    pub out_of_order: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub first_invalid_price: Option<NaiveDate>,
    pub first_out_of_order: Option<NaiveDate>,
}

impl DataQualityReport {
    /// Issues that will make the core reject the series.
    pub fn has_blocking_issues(&self) -> bool {
        self.invalid_price > 0 || self.duplicates > 0 || self.out_of_order > 0
    }

    pub fn is_clean(&self) -> bool {
        self.missing_price == 0 && !self.has_blocking_issues()
    }
}

/// Quality summary of already-parsed points, in the order given.
pub fn data_quality_from_points(points: &[PricePoint]) -> DataQualityReport {
    let mut report = DataQualityReport {
        rows_read: points.len(),
        ..DataQualityReport::default()
    };

    let mut last_date: Option<NaiveDate> = None;
    for point in points {
        if report.first_date.is_none() {
            report.first_date = Some(point.timestamp);
        }
        report.last_date = Some(point.timestamp);

        if !point.price.is_finite() || point.price <= 0.0 {
            report.invalid_price += 1;
            if report.first_invalid_price.is_none() {
                report.first_invalid_price = Some(point.timestamp);
            }
        }

        if let Some(prev) = last_date {
            if point.timestamp == prev {
                report.duplicates += 1;
            } else if point.timestamp < prev {
                report.out_of_order += 1;
                if report.first_out_of_order.is_none() {
                    report.first_out_of_order = Some(point.timestamp);
                }
            }
        }
        last_date = Some(point.timestamp);
    }

    report
}
