use chrono::{DateTime, NaiveDate, NaiveDateTime};
use crossover_domain::repositories::price_data::{PriceQuery, PriceRepository};
use crossover_domain::services::quality::{data_quality_from_points, DataQualityReport};
use crossover_domain::value_objects::price_point::PricePoint;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Deserialize)]
pub struct PriceRecord {
    #[serde(alias = "timestamp", alias = "timestamp_utc", alias = "Date")]
    pub date: String,
    #[serde(alias = "adj_close", alias = "close", alias = "Adj Close")]
    pub price: String,
}

/// Reads `<dir>/<SYMBOL>.csv` files with a `date,price` header.
#[derive(Debug, Clone)]
pub struct CsvPriceRepository {
    dir: PathBuf,
}

impl CsvPriceRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> Result<PathBuf, String> {
        let symbol = symbol.trim();
        if symbol.is_empty()
            || symbol.starts_with('.')
            || symbol.contains(|c: char| c == '/' || c == '\\')
        {
            return Err(format!("invalid instrument symbol `{symbol}`"));
        }
        Ok(self.dir.join(format!("{symbol}.csv")))
    }
}

impl PriceRepository for CsvPriceRepository {
    fn load_prices(
        &self,
        query: &PriceQuery,
    ) -> Result<(Vec<PricePoint>, DataQualityReport), String> {
        let path = self.path_for(&query.symbol)?;
        let stage_start = Instant::now();
        let result = load_csv(&path, query);
        metrics::histogram!("crossover.csv.load_ms")
            .record(stage_start.elapsed().as_millis() as f64);
        if let Ok((points, report)) = &result {
            tracing::debug!(
                symbol = %query.symbol,
                path = %path.display(),
                rows = points.len(),
                missing_price = report.missing_price,
                "loaded price csv"
            );
        }
        result
    }
}

/// Parses a price CSV. Rows with an empty, NaN or null-token price are
/// dropped and counted; everything else is passed through in file order so
/// the pipeline can reject malformed series itself.
pub fn load_csv(
    path: &Path,
    query: &PriceQuery,
) -> Result<(Vec<PricePoint>, DataQualityReport), String> {
    let file = File::open(path)
        .map_err(|err| format!("failed to open price CSV {}: {}", path.display(), err))?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let mut points: Vec<PricePoint> = Vec::new();
    let mut rows_read = 0usize;
    let mut missing_price = 0usize;

    for (idx, result) in reader.deserialize::<PriceRecord>().enumerate() {
        let record = result.map_err(|err| {
            format!("failed to parse CSV row {} in {}: {}", idx + 1, path.display(), err)
        })?;
        let date = parse_date(&record.date)
            .map_err(|err| format!("{} row {}: {}", path.display(), idx + 1, err))?;
        if !query.contains(date) {
            continue;
        }
        rows_read += 1;

        match parse_price(&record.price)
            .map_err(|err| format!("{} row {}: {}", path.display(), idx + 1, err))?
        {
            Some(price) => points.push(PricePoint::new(date, price)),
            None => missing_price += 1,
        }
    }

    let mut report = data_quality_from_points(&points);
    report.rows_read = rows_read;
    report.missing_price = missing_price;
    Ok((points, report))
}

fn parse_price(value: &str) -> Result<Option<f64>, String> {
    let trimmed = value.trim();
    if trimmed.is_empty()
        || ["nan", "null", "na", "n/a", "none"]
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
    {
        return Ok(None);
    }
    let price: f64 = trimmed
        .parse()
        .map_err(|err| format!("invalid price `{trimmed}`: {err}"))?;
    // Infinite or overflowing values are kept so the series check rejects them.
    if price.is_nan() {
        Ok(None)
    } else {
        Ok(Some(price))
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.date_naive());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.date());
    }

    Err(format!("unsupported date format: {value}"))
}
