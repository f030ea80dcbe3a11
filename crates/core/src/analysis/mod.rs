//! Clip analysis module wrapping the external clip analyzer.
//!
//! This module provides the [`ClipAnalyzer`] trait, the [`AfclipAnalyzer`]
//! implementation that shells out to `afclip`, and [`parse_report`], which
//! turns the analyzer's free-text report into a structured [`ClipReport`]
//! with per-channel on-sample and inter-sample clip counts plus an optional
//! per-event detail table.
//!
//! Parsing is a total function: malformed input degrades to defaults, never
//! errors. The only analysis error is failing to launch the analyzer at all.

mod afclip;
mod config;
mod error;
mod parser;
mod traits;
mod types;

pub use afclip::AfclipAnalyzer;
pub use config::AnalyzerConfig;
pub use error::AnalysisError;
pub use parser::parse_report;
pub use traits::ClipAnalyzer;
pub use types::{ClipEvent, ClipReport, ClipVerdict};
