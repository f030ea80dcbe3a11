//! Types for the analysis module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One clip occurrence from the analyzer's detail table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipEvent {
    /// Position of the clip in seconds.
    pub seconds: f64,
    /// Sample index of the clip.
    pub sample: u64,
    /// Channel label: "L", "R", or the analyzer's raw token for anything
    /// beyond stereo.
    pub channel: String,
    /// Sample amplitude at the clip (1.0 is full scale).
    pub amplitude: f64,
    /// Decibels relative to full scale.
    pub decibels: f64,
}

/// What the report actually establishes about the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipVerdict {
    /// The analyzer explicitly reported zero clipped samples.
    Clean,
    /// At least one clip was counted.
    Clipped,
    /// All counters are zero but no "no samples clipped" phrase was
    /// recognized. This is a parse-completeness gap, not a clipping
    /// guarantee, and must not be presented as verified clean.
    Unknown,
}

/// Structured clip-analysis result for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipReport {
    /// Display name of the analyzed file.
    pub filename: String,
    /// Full path of the analyzed file.
    pub path: PathBuf,
    /// Channel count from the report's file-info line; defaults to 2.
    pub channels: u32,
    /// Sample rate from the report's file-info line; defaults to 48000.
    pub sample_rate: u32,
    /// On-sample clips counted on the left channel.
    pub left_on_sample: u64,
    /// Inter-sample clips counted on the left channel.
    pub left_inter_sample: u64,
    /// On-sample clips counted on the right channel.
    pub right_on_sample: u64,
    /// Inter-sample clips counted on the right channel.
    pub right_inter_sample: u64,
    /// Set when the analyzer explicitly reported zero clipped samples.
    /// Distinct from all counters happening to be zero.
    pub has_no_clipping: bool,
    /// Per-event detail rows. May be empty even with nonzero counters; the
    /// analyzer can summarize without detail or truncate the table.
    pub events: Vec<ClipEvent>,
}

impl ClipReport {
    /// An empty report for a file, all counters zero and nothing verified.
    pub fn empty(filename: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            path: path.into(),
            channels: 2,
            sample_rate: 48_000,
            left_on_sample: 0,
            left_inter_sample: 0,
            right_on_sample: 0,
            right_inter_sample: 0,
            has_no_clipping: false,
            events: Vec::new(),
        }
    }

    /// Sum of the four channel counters.
    pub fn total_clips(&self) -> u64 {
        self.left_on_sample + self.left_inter_sample + self.right_on_sample + self.right_inter_sample
    }

    /// What this report establishes about the file.
    pub fn verdict(&self) -> ClipVerdict {
        if self.total_clips() > 0 {
            ClipVerdict::Clipped
        } else if self.has_no_clipping {
            ClipVerdict::Clean
        } else {
            ClipVerdict::Unknown
        }
    }

    /// Smallest overshoot among detail events, in dB. None without events.
    pub fn min_decibels(&self) -> Option<f64> {
        self.events
            .iter()
            .map(|e| e.decibels)
            .fold(None, |acc, db| match acc {
                Some(min) if min <= db => Some(min),
                _ => Some(db),
            })
    }

    /// Largest overshoot among detail events, in dB. None without events.
    pub fn max_decibels(&self) -> Option<f64> {
        self.events
            .iter()
            .map(|e| e.decibels)
            .fold(None, |acc, db| match acc {
                Some(max) if max >= db => Some(max),
                _ => Some(db),
            })
    }

    /// Mean overshoot among detail events, in dB. None without events.
    pub fn avg_decibels(&self) -> Option<f64> {
        if self.events.is_empty() {
            return None;
        }
        let sum: f64 = self.events.iter().map(|e| e.decibels).sum();
        Some(sum / self.events.len() as f64)
    }
}
