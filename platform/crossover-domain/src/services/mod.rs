pub mod features;
pub mod pipeline;
pub mod quality;
pub mod signal;
pub mod simulator;
