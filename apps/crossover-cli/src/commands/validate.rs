use crate::output;
use crossover_application::config::Config;
use crossover_application::validation::validate;
use crossover_infrastructure::market_data::CsvPriceRepository;
use std::io::Write;
use std::path::PathBuf;

pub(super) fn run_validate(
    config_path: Option<PathBuf>,
    prices_dir: Option<PathBuf>,
    strict: bool,
) -> Result<(), String> {
    let config = super::common::resolve_config(config_path, prices_dir)?;
    let stdout = std::io::stdout();
    execute(&config, strict, &mut stdout.lock())
}

pub(super) fn execute(config: &Config, strict: bool, out: &mut dyn Write) -> Result<(), String> {
    let prices = CsvPriceRepository::new(&config.data.prices_dir);
    let report = validate(config, strict, &prices).map_err(|err| err.to_string())?;

    for entry in &report.instruments {
        output::write_validation(out, entry)?;
    }

    if !report.ok() {
        let failed = report.instruments.iter().filter(|i| !i.ok).count();
        return Err(format!(
            "validation failed for {failed} of {} instrument(s)",
            report.instruments.len()
        ));
    }
    Ok(())
}
