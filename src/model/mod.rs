pub mod cohort;
pub mod thresholds;
