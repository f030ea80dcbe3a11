//! Trait definitions for the analysis module.

use async_trait::async_trait;
use std::path::Path;

use super::error::AnalysisError;
use super::types::ClipReport;

/// An analyzer that inspects an encoded file for digital clipping.
#[async_trait]
pub trait ClipAnalyzer: Send + Sync {
    /// Returns the name of this analyzer implementation.
    fn name(&self) -> &str;

    /// Analyzes one file and returns its clip report.
    ///
    /// Errors only when the analyzer could not be run at all; a file that
    /// clips heavily still produces `Ok` with nonzero counters.
    async fn analyze(&self, path: &Path) -> Result<ClipReport, AnalysisError>;
}
