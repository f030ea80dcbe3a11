//! Conversion scheduler implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock, Semaphore};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::ClipAnalyzer;
use crate::encoder::{resolve_output_path, EncodeJob, EncodeProgress, Encoder};

use super::config::SchedulerConfig;
use super::types::{
    has_extension, ConversionItem, ConversionStatus, ProcessingMode, SchedulerEvent,
    SchedulerStatus, ACCEPTED_EXTENSIONS,
};

/// Error type for scheduler operations.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The batch cannot be modified while processing is active.
    #[error("Scheduler is busy processing the current batch")]
    Busy,
}

/// Runs batches of conversion items under a bounded worker pool.
///
/// Items are dispatched in insertion order; at most `max_concurrent` are in
/// flight at any instant. Items complete in nondeterministic order. One
/// item's failure never aborts the batch.
pub struct ConversionScheduler<E, A>
where
    E: Encoder + 'static,
    A: ClipAnalyzer + 'static,
{
    config: SchedulerConfig,
    encoder: Arc<E>,
    analyzer: Arc<A>,
    items: Arc<RwLock<Vec<ConversionItem>>>,
    running: Arc<RwLock<bool>>,
    semaphore: Arc<Semaphore>,
}

impl<E, A> ConversionScheduler<E, A>
where
    E: Encoder + 'static,
    A: ClipAnalyzer + 'static,
{
    /// Creates a new scheduler.
    pub fn new(config: SchedulerConfig, encoder: E, analyzer: A) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent));
        Self {
            config,
            encoder: Arc::new(encoder),
            analyzer: Arc::new(analyzer),
            items: Arc::new(RwLock::new(Vec::new())),
            running: Arc::new(RwLock::new(false)),
            semaphore,
        }
    }

    /// Expands the given paths into audio files and appends one pending
    /// item per file. Directories are walked recursively; files are kept
    /// iff their extension is accepted. Returns how many items were added.
    pub async fn submit(&self, paths: &[PathBuf]) -> usize {
        let files = collect_audio_files(paths);
        let added = files.len();

        let mut items = self.items.write().await;
        for file in files {
            debug!(path = %file.display(), "accepted into pending set");
            items.push(ConversionItem::new(file));
        }

        added
    }

    /// Starts processing all currently pending items.
    ///
    /// Returns false without dispatching anything if a batch is already
    /// running or there is nothing pending. Items submitted while a batch
    /// runs stay pending until the next `start`.
    pub async fn start(
        &self,
        mode: ProcessingMode,
        progress_tx: Option<mpsc::Sender<SchedulerEvent>>,
    ) -> bool {
        {
            let mut running = self.running.write().await;
            if *running {
                warn!("start ignored: batch already running");
                return false;
            }
            *running = true;
        }

        let pending_ids: Vec<Uuid> = self
            .items
            .read()
            .await
            .iter()
            .filter(|i| i.status == ConversionStatus::Pending)
            .map(|i| i.id)
            .collect();

        if pending_ids.is_empty() {
            *self.running.write().await = false;
            return false;
        }

        info!(
            items = pending_ids.len(),
            max_concurrent = self.config.max_concurrent,
            ?mode,
            "starting batch"
        );

        let items = Arc::clone(&self.items);
        let running = Arc::clone(&self.running);
        let semaphore = Arc::clone(&self.semaphore);
        let encoder = Arc::clone(&self.encoder);
        let analyzer = Arc::clone(&self.analyzer);
        let config = self.config.clone();

        tokio::spawn(async move {
            let mut handles = Vec::with_capacity(pending_ids.len());

            for id in pending_ids {
                // Blocking admission gate: no busy-wait, dispatch order is
                // insertion order.
                let permit = match Arc::clone(&semaphore).acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break, // semaphore closed, shutting down
                };

                let items = Arc::clone(&items);
                let encoder = Arc::clone(&encoder);
                let analyzer = Arc::clone(&analyzer);
                let config = config.clone();
                let progress_tx = progress_tx.clone();

                handles.push(tokio::spawn(async move {
                    // Held for the item's whole encode+analyze sequence and
                    // released by drop on completion, failure, or panic, so
                    // the pool can never starve.
                    let _permit = permit;
                    Self::process_item(id, mode, encoder, analyzer, items, config, progress_tx)
                        .await;
                }));
            }

            for handle in handles {
                let _ = handle.await;
            }

            let (completed, failed) = {
                let items = items.read().await;
                let completed = items
                    .iter()
                    .filter(|i| matches!(i.status, ConversionStatus::Completed { .. }))
                    .count();
                let failed = items
                    .iter()
                    .filter(|i| matches!(i.status, ConversionStatus::Error { .. }))
                    .count();
                (completed, failed)
            };

            // Flips off exactly once; the batch may be started again if new
            // items arrived meanwhile.
            *running.write().await = false;
            info!(completed, failed, "batch finished");

            if let Some(tx) = &progress_tx {
                let _ = tx.send(SchedulerEvent::BatchFinished { completed, failed }).await;
            }
        });

        true
    }

    /// Whether a batch is currently being processed.
    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Aggregate snapshot of the batch.
    pub async fn status(&self) -> SchedulerStatus {
        let items = self.items.read().await;
        let mut status = SchedulerStatus {
            running: *self.running.read().await,
            pending: 0,
            active: 0,
            completed: 0,
            failed: 0,
        };

        for item in items.iter() {
            match &item.status {
                ConversionStatus::Pending => status.pending += 1,
                ConversionStatus::Converting { .. } | ConversionStatus::Analyzing => {
                    status.active += 1
                }
                ConversionStatus::Completed { .. } => status.completed += 1,
                ConversionStatus::Error { .. } => status.failed += 1,
            }
        }

        status
    }

    /// Snapshot of every item in submission order.
    pub async fn items(&self) -> Vec<ConversionItem> {
        self.items.read().await.clone()
    }

    /// Clears the batch. Rejected while processing is active; items are
    /// never destroyed mid-flight.
    pub async fn clear(&self) -> Result<(), SchedulerError> {
        if *self.running.read().await {
            return Err(SchedulerError::Busy);
        }
        self.items.write().await.clear();
        Ok(())
    }

    /// Runs one item's full encode + analyze sequence.
    async fn process_item(
        id: Uuid,
        mode: ProcessingMode,
        encoder: Arc<E>,
        analyzer: Arc<A>,
        items: Arc<RwLock<Vec<ConversionItem>>>,
        config: SchedulerConfig,
        progress_tx: Option<mpsc::Sender<SchedulerEvent>>,
    ) {
        let Some((source, name, already_encoded)) = ({
            let items = items.read().await;
            items
                .iter()
                .find(|i| i.id == id)
                .map(|i| (i.source_path.clone(), i.display_name.clone(), i.already_encoded))
        }) else {
            return;
        };

        if let Some(tx) = &progress_tx {
            let _ = tx
                .send(SchedulerEvent::ItemStarted {
                    id,
                    name: name.clone(),
                })
                .await;
        }

        // A throwaway output in analyze-only mode, removed after analysis.
        let mut temp_output: Option<PathBuf> = None;

        let file_to_analyze = if already_encoded {
            // Already in the target container: skip straight to analysis.
            Self::set_status(&items, id, ConversionStatus::Analyzing).await;
            source.clone()
        } else {
            Self::set_status(&items, id, ConversionStatus::Converting { progress: 0.0 }).await;

            let output = match Self::pick_output_path(id, &source, mode, &config).await {
                Ok(path) => path,
                Err(message) => {
                    Self::fail_item(&items, id, &name, message, &progress_tx).await;
                    return;
                }
            };

            // Mirror the encoder's pass-boundary checkpoints into the item
            // status and the event stream.
            let (enc_tx, mut enc_rx) = mpsc::channel::<EncodeProgress>(4);
            let forward_items = Arc::clone(&items);
            let forward_tx = progress_tx.clone();
            let forwarder = tokio::spawn(async move {
                while let Some(update) = enc_rx.recv().await {
                    Self::set_status(
                        &forward_items,
                        id,
                        ConversionStatus::Converting {
                            progress: update.progress,
                        },
                    )
                    .await;
                    if let Some(tx) = &forward_tx {
                        let _ = tx
                            .send(SchedulerEvent::ItemProgress {
                                id,
                                progress: update.progress,
                            })
                            .await;
                    }
                }
            });

            let job = EncodeJob {
                job_id: id.to_string(),
                input_path: source.clone(),
                output_path: output.clone(),
            };
            let encode_result = encoder.encode(job, Some(enc_tx)).await;
            let _ = forwarder.await;

            if let Err(e) = encode_result {
                Self::fail_item(&items, id, &name, e.to_string(), &progress_tx).await;
                return;
            }

            match mode {
                ProcessingMode::ConvertAndKeep => {
                    let mut items = items.write().await;
                    if let Some(item) = items.iter_mut().find(|i| i.id == id) {
                        item.output_path = Some(output.clone());
                    }
                }
                ProcessingMode::AnalyzeOnly => temp_output = Some(output.clone()),
            }

            Self::set_status(&items, id, ConversionStatus::Analyzing).await;
            output
        };

        let analysis_result = analyzer.analyze(&file_to_analyze).await;

        if let Some(temp) = temp_output {
            if let Err(e) = tokio::fs::remove_file(&temp).await {
                debug!(path = %temp.display(), error = %e, "failed to remove analyze-only output");
            }
        }

        let report = match analysis_result {
            Ok(report) => Some(report),
            Err(e) => {
                // The file itself is fine (or was converted fine); only the
                // analyzer could not run. Complete without a report rather
                // than reporting the item failed.
                warn!(item = %name, error = %e, "analysis unavailable");
                None
            }
        };

        Self::set_status(
            &items,
            id,
            ConversionStatus::Completed {
                report: report.clone(),
            },
        )
        .await;

        if let Some(tx) = &progress_tx {
            let _ = tx
                .send(SchedulerEvent::ItemCompleted { id, name, report })
                .await;
        }
    }

    /// Chooses where the encode writes: a collision-free path next to the
    /// source in keep mode, a fresh temp file in analyze-only mode.
    async fn pick_output_path(
        id: Uuid,
        source: &Path,
        mode: ProcessingMode,
        config: &SchedulerConfig,
    ) -> Result<PathBuf, String> {
        match mode {
            ProcessingMode::ConvertAndKeep => {
                resolve_output_path(source, config.output_policy)
                    .await
                    .map_err(|e| e.to_string())
            }
            ProcessingMode::AnalyzeOnly => {
                tokio::fs::create_dir_all(&config.temp_dir)
                    .await
                    .map_err(|e| format!("Failed to create temp directory: {e}"))?;
                Ok(config.temp_dir.join(format!("{id}.m4a")))
            }
        }
    }

    /// Applies a status transition if the monotonic ordering allows it.
    async fn set_status(
        items: &Arc<RwLock<Vec<ConversionItem>>>,
        id: Uuid,
        status: ConversionStatus,
    ) {
        let mut items = items.write().await;
        if let Some(item) = items.iter_mut().find(|i| i.id == id) {
            if item.status.can_transition_to(&status) {
                item.status = status;
            } else {
                debug!(?status, current = ?item.status, "ignoring non-monotonic transition");
            }
        }
    }

    async fn fail_item(
        items: &Arc<RwLock<Vec<ConversionItem>>>,
        id: Uuid,
        name: &str,
        message: String,
        progress_tx: &Option<mpsc::Sender<SchedulerEvent>>,
    ) {
        warn!(item = %name, error = %message, "item failed");
        Self::set_status(
            items,
            id,
            ConversionStatus::Error {
                message: message.clone(),
            },
        )
        .await;

        if let Some(tx) = progress_tx {
            let _ = tx
                .send(SchedulerEvent::ItemFailed {
                    id,
                    name: name.to_string(),
                    error: message,
                })
                .await;
        }
    }
}

/// Expands paths into audio files: directories recursively, files iff their
/// extension is accepted. Nonexistent paths are skipped. Directory entries
/// are visited in name order so submission order is deterministic.
fn collect_audio_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        let Ok(meta) = std::fs::metadata(path) else {
            warn!(path = %path.display(), "submitted path does not exist, skipping");
            continue;
        };

        if meta.is_dir() {
            collect_from_dir(path, &mut files);
        } else if is_accepted(path) {
            files.push(path.clone());
        }
    }

    files
}

fn collect_from_dir(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        warn!(path = %dir.display(), "failed to read directory, skipping");
        return;
    };

    let mut entries: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    entries.sort();

    for entry in entries {
        if entry.is_dir() {
            collect_from_dir(&entry, files);
        } else if is_accepted(&entry) {
            files.push(entry);
        }
    }
}

fn is_accepted(path: &Path) -> bool {
    ACCEPTED_EXTENSIONS.iter().any(|ext| has_extension(path, ext))
}
