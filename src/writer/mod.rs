//! Component 4: everything that lands in the output directory.
pub mod listing;
pub mod report;
