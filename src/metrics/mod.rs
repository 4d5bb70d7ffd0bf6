// Metrics module
// Running counters describing how analyses were produced

mod types;

pub use types::ModelMetrics;
