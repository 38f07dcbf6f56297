// ABOUTME: Core library for trendlens, containing the tabular frame and statistics primitives.
// ABOUTME: This crate defines the ingestion boundary and error taxonomy shared by all operations.

pub mod error;
pub mod frame;
pub mod stats;

pub use error::AnalyticsError;
pub use frame::{ColumnData, Frame};
