//! Trait definitions for the encoder module.

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::mpsc;

use super::error::EncodeError;
use super::types::{EncodeJob, EncodeOutcome, EncodeProgress};

/// An encoder that can convert lossless audio to loudness-normalized AAC.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Returns the name of this encoder implementation.
    fn name(&self) -> &str;

    /// Probes a source file's sample rate.
    ///
    /// The probe is advisory, not authoritative: on any failure (tool
    /// missing, nonzero exit, unparseable output) it returns 48000 rather
    /// than erroring. Callers must tolerate the default being wrong; at
    /// worst it causes an unnecessary but harmless resample decision.
    async fn probe_sample_rate(&self, path: &Path) -> u32;

    /// Runs the two-pass encode for one job.
    ///
    /// If a progress sender is given it receives updates at pass
    /// boundaries. If the receiver is dropped, encoding continues without
    /// progress reporting. On failure no encoder process is left running
    /// and the pass-1 intermediate is removed best-effort.
    async fn encode(
        &self,
        job: EncodeJob,
        progress_tx: Option<mpsc::Sender<EncodeProgress>>,
    ) -> Result<EncodeOutcome, EncodeError>;

    /// Validates that the encoder is properly configured and ready.
    async fn validate(&self) -> Result<(), EncodeError>;
}
