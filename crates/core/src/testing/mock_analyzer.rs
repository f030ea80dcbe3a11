//! Mock clip analyzer for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::analysis::{AnalysisError, ClipAnalyzer, ClipReport};

/// Mock implementation of the [`ClipAnalyzer`] trait.
///
/// Returns a verified-clean report by default; individual paths can be
/// given canned reports, and the whole analyzer can be made unavailable to
/// exercise the launch-failure path.
#[derive(Debug, Clone)]
pub struct MockAnalyzer {
    /// Canned reports by path.
    reports: Arc<RwLock<HashMap<PathBuf, ClipReport>>>,
    /// Paths analyzed, in call order.
    calls: Arc<RwLock<Vec<PathBuf>>>,
    /// When set, every analyze call fails as if the binary were missing.
    unavailable: Arc<RwLock<bool>>,
}

impl Default for MockAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAnalyzer {
    /// Creates a new mock analyzer.
    pub fn new() -> Self {
        Self {
            reports: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            unavailable: Arc::new(RwLock::new(false)),
        }
    }

    /// Sets the report returned for a specific path.
    pub async fn set_report(&self, path: impl AsRef<Path>, report: ClipReport) {
        self.reports
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), report);
    }

    /// Makes every analyze call fail as a launch failure.
    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }

    /// Paths analyzed so far, in call order.
    pub async fn analyzed_paths(&self) -> Vec<PathBuf> {
        self.calls.read().await.clone()
    }

    /// A verified-clean report for a path.
    pub fn clean_report(path: &Path) -> ClipReport {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut report = ClipReport::empty(filename, path);
        report.has_no_clipping = true;
        report
    }
}

#[async_trait]
impl ClipAnalyzer for MockAnalyzer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze(&self, path: &Path) -> Result<ClipReport, AnalysisError> {
        self.calls.write().await.push(path.to_path_buf());

        if *self.unavailable.read().await {
            return Err(AnalysisError::AnalyzerNotFound {
                path: PathBuf::from("afclip"),
            });
        }

        if let Some(report) = self.reports.read().await.get(path) {
            return Ok(report.clone());
        }

        Ok(Self::clean_report(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ClipVerdict;

    #[tokio::test]
    async fn test_default_report_is_clean() {
        let analyzer = MockAnalyzer::new();
        let report = analyzer.analyze(Path::new("/music/a.m4a")).await.unwrap();
        assert_eq!(report.verdict(), ClipVerdict::Clean);
        assert_eq!(analyzer.analyzed_paths().await.len(), 1);
    }

    #[tokio::test]
    async fn test_canned_report() {
        let analyzer = MockAnalyzer::new();
        let mut canned = ClipReport::empty("a.m4a", "/music/a.m4a");
        canned.left_on_sample = 3;
        analyzer.set_report("/music/a.m4a", canned).await;

        let report = analyzer.analyze(Path::new("/music/a.m4a")).await.unwrap();
        assert_eq!(report.total_clips(), 3);
        assert_eq!(report.verdict(), ClipVerdict::Clipped);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let analyzer = MockAnalyzer::new();
        analyzer.set_unavailable(true).await;
        let result = analyzer.analyze(Path::new("/music/a.m4a")).await;
        assert!(matches!(result, Err(AnalysisError::AnalyzerNotFound { .. })));
    }
}
