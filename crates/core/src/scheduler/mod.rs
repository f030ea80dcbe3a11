//! Scheduler module: batch conversion-and-analysis orchestration.
//!
//! The [`ConversionScheduler`] owns a set of [`ConversionItem`]s, expands
//! submitted paths into audio files, and runs each item through encode +
//! clip analysis under a semaphore-bounded worker pool. Per-item status and
//! aggregate progress are observable through snapshots and an optional
//! event channel.
//!
//! # Example
//!
//! ```ignore
//! use clipgate_core::scheduler::{ConversionScheduler, ProcessingMode, SchedulerConfig};
//! use clipgate_core::encoder::AfconvertEncoder;
//! use clipgate_core::analysis::AfclipAnalyzer;
//!
//! let scheduler = ConversionScheduler::new(
//!     SchedulerConfig::default(),
//!     AfconvertEncoder::with_defaults(),
//!     AfclipAnalyzer::with_defaults(),
//! );
//!
//! scheduler.submit(&[PathBuf::from("/music/album")]).await;
//!
//! let (tx, mut rx) = tokio::sync::mpsc::channel(100);
//! scheduler.start(ProcessingMode::ConvertAndKeep, Some(tx)).await;
//!
//! while let Some(event) = rx.recv().await {
//!     println!("{event:?}");
//! }
//! ```

mod config;
mod runner;
mod types;

pub use config::{SchedulerConfig, UNATTENDED_MAX_CONCURRENT};
pub use runner::{ConversionScheduler, SchedulerError};
pub use types::{
    ConversionItem, ConversionStatus, ProcessingMode, SchedulerEvent, SchedulerStatus,
};
