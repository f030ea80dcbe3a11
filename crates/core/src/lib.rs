//! Core library for clipgate: converts lossless audio (WAV/AIFF) into
//! loudness-normalized AAC and analyzes the result for digital clipping.
//!
//! The pieces fit together like this:
//!
//! - [`encoder`] wraps the external two-pass encoder (`afconvert`) and the
//!   sample-rate probe (`afinfo`).
//! - [`analysis`] wraps the external clip analyzer (`afclip`) and parses its
//!   free-text report into a structured [`analysis::ClipReport`].
//! - [`scheduler`] owns a batch of [`scheduler::ConversionItem`]s and runs
//!   them through encode + analysis under a bounded worker pool.
//! - [`config`] loads the whole thing from TOML with env overrides.
//! - [`testing`] provides mock encoder/analyzer implementations for tests
//!   and alternative front ends.

pub mod analysis;
pub mod config;
pub mod encoder;
pub mod scheduler;
pub mod testing;

pub use analysis::{
    parse_report, AfclipAnalyzer, AnalysisError, AnalyzerConfig, ClipAnalyzer, ClipEvent,
    ClipReport, ClipVerdict,
};
pub use config::{load_config, load_config_from_str, Config, ConfigError};
pub use encoder::{
    resolve_output_path, AfconvertEncoder, EncodeJob, EncodeOutcome, EncodeProgress, Encoder,
    EncoderConfig, EncodeError, OutputPolicy,
};
pub use scheduler::{
    ConversionItem, ConversionScheduler, ConversionStatus, ProcessingMode, SchedulerConfig,
    SchedulerError, SchedulerEvent, SchedulerStatus, UNATTENDED_MAX_CONCURRENT,
};
