pub mod confidence;
pub mod config;
pub mod engine;

pub use config::StatusConfig;
pub use engine::{compute_status, BucketTally};
