use crossover_application::backtesting::InstrumentRun;
use crossover_application::validation::InstrumentValidation;
use crossover_domain::entities::metrics::PerformanceReport;
use std::io::Write;

fn io_err(err: std::io::Error) -> String {
    format!("failed to write output: {err}")
}

pub fn write_stats(out: &mut dyn Write, symbol: &str, report: &PerformanceReport) -> Result<(), String> {
    writeln!(out, "Stats for {symbol}:").map_err(io_err)?;
    for (key, value) in report.entries() {
        writeln!(out, "{key} {value}").map_err(io_err)?;
    }
    Ok(())
}

/// Human rendering: stats to `out`, failures to `err`.
pub fn write_run(out: &mut dyn Write, err: &mut dyn Write, run: &InstrumentRun) -> Result<(), String> {
    match &run.outcome {
        Ok(report) => write_stats(out, &run.symbol, &report.report),
        Err(failure) => writeln!(err, "Error for {}: {}", run.symbol, failure).map_err(io_err),
    }
}

pub fn write_json_line(out: &mut dyn Write, value: &serde_json::Value) -> Result<(), String> {
    writeln!(out, "{value}").map_err(io_err)
}

pub fn write_validation(out: &mut dyn Write, entry: &InstrumentValidation) -> Result<(), String> {
    let status = if entry.ok { "ok" } else { "FAIL" };
    write!(out, "{} {status} rows={}", entry.symbol, entry.rows).map_err(io_err)?;
    if let Some(quality) = &entry.data_quality {
        write!(
            out,
            " missing_price={} invalid_price={} duplicates={} out_of_order={}",
            quality.missing_price, quality.invalid_price, quality.duplicates, quality.out_of_order
        )
        .map_err(io_err)?;
    }
    if entry.insufficient_data {
        write!(out, " insufficient_data").map_err(io_err)?;
    }
    if let Some(error) = &entry.error {
        write!(out, " error=\"{error}\"").map_err(io_err)?;
    }
    writeln!(out).map_err(io_err)
}
