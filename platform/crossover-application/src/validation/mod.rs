use crate::config::Config;
use crossover_domain::errors::PipelineError;
use crossover_domain::repositories::price_data::PriceRepository;
use crossover_domain::services::quality::DataQualityReport;
use crossover_domain::value_objects::price_series::PriceSeries;
use serde::Serialize;
use std::time::Instant;
use tracing::info_span;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentValidation {
    pub symbol: String,
    pub ok: bool,
    pub rows: usize,
    /// Fewer rows than `long_window`; still runnable.
    pub insufficient_data: bool,
    pub data_quality: Option<DataQualityReport>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub strict: bool,
    pub instruments: Vec<InstrumentValidation>,
}

impl ValidationReport {
    pub fn ok(&self) -> bool {
        self.instruments.iter().all(|i| i.ok)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|err| {
            serde_json::json!({ "error": format!("failed to serialize validation report: {err}") })
        })
    }
}

/// Checks the configuration, then loads every instrument and checks that its
/// prices would be accepted by the pipeline. With `strict`, any dropped or
/// suspicious row fails the instrument.
pub fn validate(
    config: &Config,
    strict: bool,
    prices: &dyn PriceRepository,
) -> Result<ValidationReport, PipelineError> {
    let _span = info_span!("validate", strict = strict).entered();
    let plan = config.validate()?;

    let mut instruments = Vec::with_capacity(plan.instruments.len());
    for symbol in &plan.instruments {
        let stage_start = Instant::now();
        let entry = match prices.load_prices(&plan.query(symbol)) {
            Err(err) => InstrumentValidation {
                symbol: symbol.clone(),
                ok: false,
                rows: 0,
                insufficient_data: false,
                data_quality: None,
                error: Some(format!("failed to load prices: {err}")),
            },
            Ok((points, report)) => {
                let rows = points.len();
                let series = PriceSeries::new(symbol.clone(), points);
                let strict_error = if strict && !report.is_clean() {
                    Some(format!(
                        "strict mode: missing_price={} invalid_price={} duplicates={} out_of_order={}",
                        report.missing_price,
                        report.invalid_price,
                        report.duplicates,
                        report.out_of_order
                    ))
                } else {
                    None
                };
                let error = match series {
                    Err(err) => Some(err.to_string()),
                    Ok(_) => strict_error,
                };
                InstrumentValidation {
                    symbol: symbol.clone(),
                    ok: error.is_none(),
                    rows,
                    insufficient_data: rows < plan.params.long_window(),
                    data_quality: Some(report),
                    error,
                }
            }
        };
        metrics::histogram!("crossover.validate.instrument_ms")
            .record(stage_start.elapsed().as_millis() as f64);
        instruments.push(entry);
    }

    Ok(ValidationReport {
        strict,
        instruments,
    })
}
