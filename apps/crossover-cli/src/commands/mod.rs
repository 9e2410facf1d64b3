mod backtest;
mod common;
mod validate;

use std::path::PathBuf;

pub enum Command {
    Backtest {
        config: Option<PathBuf>,
        prices_dir: Option<PathBuf>,
        json: bool,
    },
    Validate {
        config: Option<PathBuf>,
        prices_dir: Option<PathBuf>,
        strict: bool,
    },
}

pub fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Backtest {
            config,
            prices_dir,
            json,
        } => backtest::run_backtest(config, prices_dir, json),
        Command::Validate {
            config,
            prices_dir,
            strict,
        } => validate::run_validate(config, prices_dir, strict),
    }
}

#[cfg(test)]
mod tests;
