pub mod advisor;
pub mod metrics;
