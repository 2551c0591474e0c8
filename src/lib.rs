pub mod annotator;
pub mod config;
pub mod constants;
pub mod document;
pub mod error_report;
pub mod runner;
pub mod types;
pub mod utils;
