//! Report construction and output formatting

pub mod formatter;
pub mod report;
