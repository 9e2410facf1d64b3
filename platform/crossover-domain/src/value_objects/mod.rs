pub mod price_point;
pub mod price_series;
pub mod return_row;
pub mod signal;
pub mod signal_row;
