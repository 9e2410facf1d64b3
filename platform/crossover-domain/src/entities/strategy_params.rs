use crate::errors::PipelineError;
use serde::Serialize;

pub const DEFAULT_SHORT_WINDOW: usize = 20;
pub const DEFAULT_LONG_WINDOW: usize = 50;
pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;

/// One strategy parameterisation. Validated on construction so a run never
/// starts with windows or capital that would be silently clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrategyParams {
    short_window: usize,
    long_window: usize,
    initial_capital: f64,
}

impl StrategyParams {
    pub fn new(
        short_window: usize,
        long_window: usize,
        initial_capital: f64,
    ) -> Result<Self, PipelineError> {
        validate_windows(short_window, long_window)?;
        validate_capital(initial_capital)?;
        Ok(Self {
            short_window,
            long_window,
            initial_capital,
        })
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            initial_capital: DEFAULT_INITIAL_CAPITAL,
        }
    }
}

pub(crate) fn validate_windows(short_window: usize, long_window: usize) -> Result<(), PipelineError> {
    if short_window == 0 || long_window == 0 {
        return Err(PipelineError::invalid_config(format!(
            "windows must be > 0 (short_window={short_window}, long_window={long_window})"
        )));
    }
    if long_window <= short_window {
        return Err(PipelineError::invalid_config(format!(
            "long_window ({long_window}) must exceed short_window ({short_window})"
        )));
    }
    Ok(())
}

pub(crate) fn validate_capital(initial_capital: f64) -> Result<(), PipelineError> {
    if !initial_capital.is_finite() || initial_capital <= 0.0 {
        return Err(PipelineError::invalid_config(format!(
            "initial_capital must be a positive number (got {initial_capital})"
        )));
    }
    Ok(())
}
