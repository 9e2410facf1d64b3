use serde::{Deserialize, Serialize};

/// Crossover state for one period. An undefined signal is `Option::None`,
/// never `Flat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Flat,
    Long,
}

impl Signal {
    pub fn from_crossover(ma_short: f64, ma_long: f64) -> Self {
        if ma_short > ma_long {
            Signal::Long
        } else {
            Signal::Flat
        }
    }

    pub fn as_factor(self) -> f64 {
        match self {
            Signal::Flat => 0.0,
            Signal::Long => 1.0,
        }
    }
}
