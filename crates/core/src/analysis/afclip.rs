//! afclip-based analyzer implementation.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::config::AnalyzerConfig;
use super::error::AnalysisError;
use super::parser::parse_report;
use super::traits::ClipAnalyzer;
use super::types::ClipReport;

/// afclip-based analyzer implementation.
pub struct AfclipAnalyzer {
    config: AnalyzerConfig,
}

impl AfclipAnalyzer {
    /// Creates a new analyzer with the given configuration.
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Creates an analyzer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

#[async_trait]
impl ClipAnalyzer for AfclipAnalyzer {
    fn name(&self) -> &str {
        "afclip"
    }

    async fn analyze(&self, path: &Path) -> Result<ClipReport, AnalysisError> {
        debug!(path = %path.display(), "running afclip");

        // -x suppresses writing an annotated output file; the report goes to
        // stdout/stderr and both streams carry parseable lines.
        let mut cmd = Command::new(&self.config.afclip_path);
        cmd.arg("-x")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let timeout_secs = self.config.timeout_secs;
        let output = match timeout(Duration::from_secs(timeout_secs), cmd.output()).await {
            Ok(result) => result.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AnalysisError::AnalyzerNotFound {
                        path: self.config.afclip_path.clone(),
                    }
                } else {
                    AnalysisError::Io(e)
                }
            })?,
            Err(_) => return Err(AnalysisError::Timeout { timeout_secs }),
        };

        // Nonzero exit means clipping was found, not failure; parse whatever
        // the analyzer printed either way.
        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(parse_report(&text, &filename, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_analyze_missing_binary() {
        let analyzer =
            AfclipAnalyzer::new(AnalyzerConfig::with_path(PathBuf::from("/nonexistent/afclip")));
        let result = analyzer.analyze(Path::new("/music/track.m4a")).await;
        assert!(matches!(
            result,
            Err(AnalysisError::AnalyzerNotFound { .. })
        ));
    }
}
