// ABOUTME: Analytics operations for trendlens: describe, forecast, abtest, dashboard.
// ABOUTME: Each operation is a pure function from a JSON record set to a typed report.

pub mod abtest;
pub mod dashboard;
pub mod describe;
pub mod forecast;
pub mod forest;
pub mod regression;
pub mod report;

pub use abtest::analyze_ab_test;
pub use dashboard::build_dashboard;
pub use describe::analyze_metrics;
pub use forecast::{DEFAULT_PERIODS, generate_forecast};
