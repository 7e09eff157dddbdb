pub mod staleness;
pub mod thresholds;
