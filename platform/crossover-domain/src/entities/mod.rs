pub mod metrics;
pub mod strategy_params;
