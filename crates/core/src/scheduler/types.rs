//! Types for the scheduler module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::analysis::ClipReport;

/// File extensions accepted into the pending set. `m4a` is analyze-only:
/// already in the target container, it skips the encode passes.
pub(crate) const ACCEPTED_EXTENSIONS: [&str; 4] = ["wav", "aif", "aiff", "m4a"];

/// Whether converted output is kept or produced only to feed analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    /// Convert and write the output next to the source (per output policy).
    ConvertAndKeep,
    /// Convert to a throwaway temp file purely to run analysis, then
    /// discard it.
    AnalyzeOnly,
}

/// Lifecycle state of one conversion item.
///
/// Transitions are monotonic along
/// `Pending -> [Converting ->] Analyzing -> (Completed | Error)`; terminal
/// states are absorbing. Only the scheduler applies transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConversionStatus {
    /// Waiting for dispatch.
    Pending,
    /// Encode passes in flight. Progress is discrete (0.0, 0.25, 0.75),
    /// reflecting pass boundaries rather than byte-level progress.
    Converting { progress: f32 },
    /// The file to analyze is ready and the analyzer is running.
    Analyzing,
    /// Terminal. `report` is None only when the analyzer could not be
    /// launched after an otherwise successful conversion.
    Completed { report: Option<ClipReport> },
    /// Terminal failure.
    Error { message: String },
}

impl ConversionStatus {
    fn rank(&self) -> u8 {
        match self {
            ConversionStatus::Pending => 0,
            ConversionStatus::Converting { .. } => 1,
            ConversionStatus::Analyzing => 2,
            ConversionStatus::Completed { .. } | ConversionStatus::Error { .. } => 3,
        }
    }

    /// Whether this state may move to `next` under the monotonic ordering.
    pub fn can_transition_to(&self, next: &ConversionStatus) -> bool {
        match (self, next) {
            // Progress may only advance within Converting
            (
                ConversionStatus::Converting { progress: from },
                ConversionStatus::Converting { progress: to },
            ) => to > from,
            (a, b) => b.rank() > a.rank(),
        }
    }

    /// Whether the item is mid-processing.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ConversionStatus::Converting { .. } | ConversionStatus::Analyzing
        )
    }

    /// Whether the item has reached an absorbing state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConversionStatus::Completed { .. } | ConversionStatus::Error { .. }
        )
    }
}

/// One file's journey through conversion and analysis.
///
/// Mutated exclusively by the scheduler; observers receive clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionItem {
    /// Stable unique id.
    pub id: Uuid,
    /// Path of the submitted source file.
    pub source_path: PathBuf,
    /// File name for display.
    pub display_name: String,
    /// Source is already in the target container; analyze without encoding.
    pub already_encoded: bool,
    /// Current lifecycle state.
    pub status: ConversionStatus,
    /// Where the converted file landed, once encoding succeeds in
    /// convert-and-keep mode.
    pub output_path: Option<PathBuf>,
}

impl ConversionItem {
    /// Creates a pending item for a source file.
    pub fn new(source_path: PathBuf) -> Self {
        let display_name = source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| source_path.display().to_string());
        let already_encoded = has_extension(&source_path, "m4a");

        Self {
            id: Uuid::new_v4(),
            source_path,
            display_name,
            already_encoded,
            status: ConversionStatus::Pending,
            output_path: None,
        }
    }

    /// The clip report, if the item completed with one.
    pub fn report(&self) -> Option<&ClipReport> {
        match &self.status {
            ConversionStatus::Completed { report } => report.as_ref(),
            _ => None,
        }
    }
}

pub(crate) fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

/// Aggregate snapshot of the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerStatus {
    /// Whether a batch is currently being processed.
    pub running: bool,
    /// Items waiting for dispatch.
    pub pending: usize,
    /// Items converting or analyzing right now.
    pub active: usize,
    /// Items that reached `Completed`.
    pub completed: usize,
    /// Items that reached `Error`.
    pub failed: usize,
}

/// Progress events emitted on item transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SchedulerEvent {
    /// An item left the pending set.
    ItemStarted { id: Uuid, name: String },
    /// An item's encode reached a pass boundary.
    ItemProgress { id: Uuid, progress: f32 },
    /// An item completed. `report` is None when analysis could not run.
    ItemCompleted {
        id: Uuid,
        name: String,
        report: Option<ClipReport>,
    },
    /// An item failed.
    ItemFailed {
        id: Uuid,
        name: String,
        error: String,
    },
    /// All dispatched items finished; the scheduler may be started again.
    BatchFinished { completed: usize, failed: usize },
}
