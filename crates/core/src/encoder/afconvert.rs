//! afconvert-based encoder implementation.

use async_trait::async_trait;
use regex_lite::Regex;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::fs;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};
use uuid::Uuid;

use super::config::EncoderConfig;
use super::error::EncodeError;
use super::traits::Encoder;
use super::types::{EncodeJob, EncodeOutcome, EncodePass, EncodeProgress};

/// Fallback rate when the probe cannot determine one.
const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Resampler filter quality for the high-rate path, 0-127.
const RESAMPLE_FILTER_QUALITY: &str = "127";

/// afconvert-based encoder implementation.
pub struct AfconvertEncoder {
    config: EncoderConfig,
}

impl AfconvertEncoder {
    /// Creates a new encoder with the given configuration.
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Creates an encoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EncoderConfig::default())
    }

    /// Builds the pass-1 (generate) argument list.
    ///
    /// With `needs_resample` the intermediate is float32 at the target rate
    /// using the high-quality resampler; otherwise the sample format is left
    /// untouched (`-d 0`). Both variants request normalization-metadata
    /// generation.
    fn pass1_args(&self, input: &Path, intermediate: &Path, needs_resample: bool) -> Vec<String> {
        let mut args = vec![input.to_string_lossy().to_string()];

        if needs_resample {
            args.extend([
                "-d".to_string(),
                format!("LEF32@{}", self.config.target_sample_rate),
                "-f".to_string(),
                "caff".to_string(),
                "--soundcheck-generate".to_string(),
                "--src-complexity".to_string(),
                "bats".to_string(),
                "-r".to_string(),
                RESAMPLE_FILTER_QUALITY.to_string(),
            ]);
        } else {
            args.extend([
                "-d".to_string(),
                "0".to_string(),
                "-f".to_string(),
                "caff".to_string(),
                "--soundcheck-generate".to_string(),
            ]);
        }

        args.push(intermediate.to_string_lossy().to_string());
        args
    }

    /// Builds the pass-2 (embed) argument list: stereo AAC in an M4A
    /// container, consuming the metadata pass 1 generated.
    fn pass2_args(&self, intermediate: &Path, output: &Path) -> Vec<String> {
        vec![
            intermediate.to_string_lossy().to_string(),
            "-d".to_string(),
            "aac".to_string(),
            "-f".to_string(),
            "m4af".to_string(),
            "-u".to_string(),
            "pgcm".to_string(),
            "2".to_string(),
            "--soundcheck-read".to_string(),
            "-b".to_string(),
            self.config.bitrate.to_string(),
            "-q".to_string(),
            self.config.quality.to_string(),
            "-s".to_string(),
            self.config.strategy.to_string(),
            output.to_string_lossy().to_string(),
        ]
    }

    /// Runs one encode pass, capturing stderr for diagnostics.
    ///
    /// The child is killed if the pass exceeds the configured timeout, so a
    /// failed pass never leaves an encoder process running.
    async fn run_pass(&self, pass: EncodePass, args: &[String]) -> Result<(), EncodeError> {
        debug!(%pass, ?args, "running afconvert");

        let mut cmd = Command::new(&self.config.afconvert_path);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let timeout_secs = self.config.timeout_secs;
        let output = match timeout(Duration::from_secs(timeout_secs), cmd.output()).await {
            Ok(result) => result.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EncodeError::EncoderNotFound {
                        path: self.config.afconvert_path.clone(),
                    }
                } else {
                    EncodeError::Io(e)
                }
            })?,
            Err(_) => return Err(EncodeError::Timeout { pass, timeout_secs }),
        };

        if !output.status.success() {
            return Err(EncodeError::pass_failed(
                pass,
                String::from_utf8_lossy(&output.stderr),
            ));
        }

        Ok(())
    }

    /// Extracts the sample rate from afinfo's human-readable output.
    fn parse_sample_rate(text: &str) -> Option<u32> {
        let re = Regex::new(r"sample rate:\s*([0-9]+(?:\.[0-9]+)?)").ok()?;
        for line in text.lines() {
            if let Some(caps) = re.captures(line) {
                if let Ok(rate) = caps[1].parse::<f64>() {
                    return Some(rate as u32);
                }
            }
        }
        None
    }

    fn send_progress(
        progress_tx: &Option<mpsc::Sender<EncodeProgress>>,
        job_id: &str,
        progress: f32,
        pass: EncodePass,
    ) {
        if let Some(tx) = progress_tx {
            // Non-blocking send; a slow or dropped receiver must not stall
            // the encode.
            let _ = tx.try_send(EncodeProgress {
                job_id: job_id.to_string(),
                progress,
                pass,
            });
        }
    }
}

#[async_trait]
impl Encoder for AfconvertEncoder {
    fn name(&self) -> &str {
        "afconvert"
    }

    async fn probe_sample_rate(&self, path: &Path) -> u32 {
        let result = Command::new(&self.config.afinfo_path)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "afinfo launch failed, assuming default rate");
                return DEFAULT_SAMPLE_RATE;
            }
        };

        if !output.status.success() {
            debug!(path = %path.display(), "afinfo exited nonzero, assuming default rate");
            return DEFAULT_SAMPLE_RATE;
        }

        Self::parse_sample_rate(&String::from_utf8_lossy(&output.stdout))
            .unwrap_or(DEFAULT_SAMPLE_RATE)
    }

    async fn encode(
        &self,
        job: EncodeJob,
        progress_tx: Option<mpsc::Sender<EncodeProgress>>,
    ) -> Result<EncodeOutcome, EncodeError> {
        let start = Instant::now();

        if !fs::try_exists(&job.input_path).await.unwrap_or(false) {
            return Err(EncodeError::InputNotFound {
                path: job.input_path.clone(),
            });
        }

        fs::create_dir_all(&self.config.temp_dir).await?;

        let source_sample_rate = self.probe_sample_rate(&job.input_path).await;
        let needs_resample = source_sample_rate > self.config.target_sample_rate;

        // Fresh token per invocation keeps concurrent workers' intermediates
        // from colliding in the shared temp directory.
        let intermediate = self.config.temp_dir.join(format!("{}.caf", Uuid::new_v4()));

        Self::send_progress(&progress_tx, &job.job_id, 0.25, EncodePass::Generate);
        let pass1 = self
            .run_pass(
                EncodePass::Generate,
                &self.pass1_args(&job.input_path, &intermediate, needs_resample),
            )
            .await;

        if let Err(e) = pass1 {
            let _ = fs::remove_file(&intermediate).await;
            return Err(e);
        }

        Self::send_progress(&progress_tx, &job.job_id, 0.75, EncodePass::Embed);
        let pass2 = self
            .run_pass(
                EncodePass::Embed,
                &self.pass2_args(&intermediate, &job.output_path),
            )
            .await;

        // Best-effort cleanup of the intermediate whether pass 2 succeeded
        // or not; a leftover temp file is not an error.
        if let Err(e) = fs::remove_file(&intermediate).await {
            debug!(path = %intermediate.display(), error = %e, "failed to remove intermediate");
        }

        pass2?;

        let output_meta = fs::metadata(&job.output_path).await.map_err(|_| {
            EncodeError::pass_failed(EncodePass::Embed, "output file not created")
        })?;

        debug!(
            job_id = %job.job_id,
            output = %job.output_path.display(),
            resampled = needs_resample,
            "encode complete"
        );

        Ok(EncodeOutcome {
            job_id: job.job_id,
            output_path: job.output_path,
            output_size_bytes: output_meta.len(),
            duration_ms: start.elapsed().as_millis() as u64,
            source_sample_rate,
            resampled: needs_resample,
        })
    }

    async fn validate(&self) -> Result<(), EncodeError> {
        // Only launchability matters here; afconvert exits nonzero on -h.
        let afconvert_result = Command::new(&self.config.afconvert_path)
            .arg("-h")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await;

        if let Err(e) = afconvert_result {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(EncodeError::EncoderNotFound {
                    path: self.config.afconvert_path.clone(),
                });
            }
            return Err(EncodeError::Io(e));
        }

        let afinfo_result = Command::new(&self.config.afinfo_path)
            .arg("-h")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await;

        if let Err(e) = afinfo_result {
            // The probe degrades to a default rate at runtime, so a missing
            // afinfo is only worth a warning.
            warn!(path = %self.config.afinfo_path.display(), error = %e, "afinfo not available");
        }

        fs::create_dir_all(&self.config.temp_dir).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn encoder() -> AfconvertEncoder {
        AfconvertEncoder::with_defaults()
    }

    #[test]
    fn test_pass1_args_no_resample() {
        let args = encoder().pass1_args(
            Path::new("/music/track.wav"),
            Path::new("/tmp/inter.caf"),
            false,
        );

        assert_eq!(
            args,
            vec![
                "/music/track.wav",
                "-d",
                "0",
                "-f",
                "caff",
                "--soundcheck-generate",
                "/tmp/inter.caf",
            ]
        );
    }

    #[test]
    fn test_pass1_args_resample_targets_48k() {
        let args = encoder().pass1_args(
            Path::new("/music/track.wav"),
            Path::new("/tmp/inter.caf"),
            true,
        );

        assert!(args.contains(&"LEF32@48000".to_string()));
        assert!(args.contains(&"--src-complexity".to_string()));
        assert!(args.contains(&"bats".to_string()));
        assert!(args.contains(&"-r".to_string()));
        assert!(args.contains(&"--soundcheck-generate".to_string()));
        // No-conversion marker must not appear on the resample path
        assert!(!args.contains(&"0".to_string()));
    }

    #[test]
    fn test_pass2_args() {
        let args = encoder().pass2_args(Path::new("/tmp/inter.caf"), Path::new("/music/track.m4a"));

        assert_eq!(
            args,
            vec![
                "/tmp/inter.caf",
                "-d",
                "aac",
                "-f",
                "m4af",
                "-u",
                "pgcm",
                "2",
                "--soundcheck-read",
                "-b",
                "256000",
                "-q",
                "127",
                "-s",
                "2",
                "/music/track.m4a",
            ]
        );
    }

    #[test]
    fn test_parse_sample_rate_integer() {
        let text = "File: track.wav\ndata format: 2 ch, 44100 Hz\nsample rate: 44100\n";
        assert_eq!(AfconvertEncoder::parse_sample_rate(text), Some(44_100));
    }

    #[test]
    fn test_parse_sample_rate_float() {
        let text = "sample rate: 96000.000000\n";
        assert_eq!(AfconvertEncoder::parse_sample_rate(text), Some(96_000));
    }

    #[test]
    fn test_parse_sample_rate_missing() {
        assert_eq!(AfconvertEncoder::parse_sample_rate("no rates here"), None);
        assert_eq!(AfconvertEncoder::parse_sample_rate(""), None);
    }

    #[test]
    fn test_pass_failed_trims_stderr() {
        let err = EncodeError::pass_failed(EncodePass::Generate, "  boom \n");
        match err {
            EncodeError::PassFailed { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_pass_failed_empty_stderr() {
        let err = EncodeError::pass_failed(EncodePass::Embed, "");
        match err {
            EncodeError::PassFailed { stderr, .. } => assert_eq!(stderr, "unknown error"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_encode_missing_input() {
        let result = encoder()
            .encode(
                EncodeJob {
                    job_id: "j-1".to_string(),
                    input_path: PathBuf::from("/nonexistent/track.wav"),
                    output_path: PathBuf::from("/nonexistent/track.m4a"),
                },
                None,
            )
            .await;

        assert!(matches!(result, Err(EncodeError::InputNotFound { .. })));
    }
}
