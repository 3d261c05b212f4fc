//! Statistic extraction from sick-count series.

pub mod extractor;

pub use extractor::extract;
