//! Mock encoder for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

use crate::encoder::{
    EncodeError, EncodeJob, EncodeOutcome, EncodePass, EncodeProgress, Encoder,
};

/// Mock implementation of the [`Encoder`] trait.
///
/// Provides controllable behavior for testing:
/// - Records encode jobs for assertions
/// - Configurable probe rates per path
/// - Per-input failure injection
/// - Simulated encode duration with pass-boundary progress
/// - Tracks the peak number of concurrent encodes observed
#[derive(Debug, Clone)]
pub struct MockEncoder {
    /// Recorded jobs in submission order.
    jobs: Arc<RwLock<Vec<EncodeJob>>>,
    /// Pre-configured probe rates by path.
    probe_rates: Arc<RwLock<HashMap<PathBuf, u32>>>,
    /// Rate returned for paths without a configured probe result.
    default_rate: Arc<RwLock<u32>>,
    /// Inputs whose encode fails.
    fail_inputs: Arc<RwLock<HashSet<PathBuf>>>,
    /// Simulated duration of the two passes combined, in milliseconds.
    encode_duration_ms: Arc<RwLock<u64>>,
    /// Encodes currently in flight.
    active: Arc<AtomicUsize>,
    /// Highest `active` value ever observed.
    peak_active: Arc<AtomicUsize>,
}

impl Default for MockEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEncoder {
    /// Creates a new mock encoder.
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(RwLock::new(Vec::new())),
            probe_rates: Arc::new(RwLock::new(HashMap::new())),
            default_rate: Arc::new(RwLock::new(44_100)),
            fail_inputs: Arc::new(RwLock::new(HashSet::new())),
            encode_duration_ms: Arc::new(RwLock::new(10)),
            active: Arc::new(AtomicUsize::new(0)),
            peak_active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns all recorded jobs.
    pub async fn recorded_jobs(&self) -> Vec<EncodeJob> {
        self.jobs.read().await.clone()
    }

    /// Returns how many encodes were run.
    pub async fn encode_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Sets the probe result for a specific path.
    pub async fn set_probe_rate(&self, path: impl AsRef<Path>, rate: u32) {
        self.probe_rates
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), rate);
    }

    /// Sets the rate returned for unconfigured paths.
    pub async fn set_default_rate(&self, rate: u32) {
        *self.default_rate.write().await = rate;
    }

    /// Makes encodes of the given input fail.
    pub async fn fail_on(&self, path: impl AsRef<Path>) {
        self.fail_inputs
            .write()
            .await
            .insert(path.as_ref().to_path_buf());
    }

    /// Sets the simulated encode duration.
    pub async fn set_encode_duration(&self, duration: Duration) {
        *self.encode_duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Highest number of simultaneously running encodes observed so far.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Encoder for MockEncoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe_sample_rate(&self, path: &Path) -> u32 {
        if let Some(rate) = self.probe_rates.read().await.get(path) {
            return *rate;
        }
        *self.default_rate.read().await
    }

    async fn encode(
        &self,
        job: EncodeJob,
        progress_tx: Option<mpsc::Sender<EncodeProgress>>,
    ) -> Result<EncodeOutcome, EncodeError> {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(active, Ordering::SeqCst);

        let result = self.run_encode(&job, progress_tx).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        self.jobs.write().await.push(job);
        result
    }

    async fn validate(&self) -> Result<(), EncodeError> {
        Ok(())
    }
}

impl MockEncoder {
    async fn run_encode(
        &self,
        job: &EncodeJob,
        progress_tx: Option<mpsc::Sender<EncodeProgress>>,
    ) -> Result<EncodeOutcome, EncodeError> {
        let duration_ms = *self.encode_duration_ms.read().await;
        let half = Duration::from_millis(duration_ms / 2);

        if let Some(tx) = &progress_tx {
            let _ = tx.try_send(EncodeProgress {
                job_id: job.job_id.clone(),
                progress: 0.25,
                pass: EncodePass::Generate,
            });
        }
        tokio::time::sleep(half).await;

        if self.fail_inputs.read().await.contains(&job.input_path) {
            return Err(EncodeError::pass_failed(
                EncodePass::Generate,
                "injected failure",
            ));
        }

        if let Some(tx) = &progress_tx {
            let _ = tx.try_send(EncodeProgress {
                job_id: job.job_id.clone(),
                progress: 0.75,
                pass: EncodePass::Embed,
            });
        }
        tokio::time::sleep(half).await;

        // Produce a real file so downstream analysis and cleanup have
        // something to work with.
        tokio::fs::write(&job.output_path, b"mock aac").await?;

        let source_sample_rate = self.probe_sample_rate(&job.input_path).await;

        Ok(EncodeOutcome {
            job_id: job.job_id.clone(),
            output_path: job.output_path.clone(),
            output_size_bytes: 8,
            duration_ms,
            source_sample_rate,
            resampled: source_sample_rate > 48_000,
        })
    }
}
