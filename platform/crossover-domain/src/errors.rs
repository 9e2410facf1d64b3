use thiserror::Error;

/// Failures that end a single instrument run before or during the pipeline.
///
/// Insufficient history and zero-variance returns are not represented here:
/// both still produce a report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("malformed input for {symbol}: {reason}")]
    MalformedInput { symbol: String, reason: String },
}

impl PipelineError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }

    pub fn malformed(symbol: &str, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}
