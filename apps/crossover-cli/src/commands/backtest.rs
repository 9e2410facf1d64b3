use crate::output;
use crossover_application::backtesting::run_backtest as run_batch;
use crossover_application::config::Config;
use crossover_infrastructure::market_data::CsvPriceRepository;
use std::io::Write;
use std::path::PathBuf;

pub(super) fn run_backtest(
    config_path: Option<PathBuf>,
    prices_dir: Option<PathBuf>,
    json: bool,
) -> Result<(), String> {
    let config = super::common::resolve_config(config_path, prices_dir)?;
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    execute(&config, json, &mut stdout.lock(), &mut stderr.lock())
}

pub(super) fn execute(
    config: &Config,
    json: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), String> {
    let prices = CsvPriceRepository::new(&config.data.prices_dir);
    let batch = run_batch(config, &prices).map_err(|err| err.to_string())?;

    for run in &batch.runs {
        if json {
            output::write_json_line(out, &run.to_json())?;
        } else {
            output::write_run(out, err, run)?;
        }
    }

    if batch.all_failed() {
        return Err(format!("all {} instrument(s) failed", batch.runs.len()));
    }
    Ok(())
}
