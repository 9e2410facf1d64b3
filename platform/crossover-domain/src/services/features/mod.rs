pub mod rolling;

pub use rolling::{cumulative_max, pct_change, rolling_mean};
