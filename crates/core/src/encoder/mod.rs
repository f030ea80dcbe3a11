//! Encoder module wrapping the external two-pass AAC encoder.
//!
//! This module provides the [`Encoder`] trait and the [`AfconvertEncoder`]
//! implementation, which shells out to `afconvert` for the actual encode and
//! to `afinfo` for sample-rate probing.
//!
//! The encode is always two passes:
//!
//! 1. **Generate**: convert the input to an intermediate lossless CAF while
//!    generating loudness-normalization (SoundCheck) metadata. If the source
//!    sample rate exceeds 48 kHz the pass also resamples down to 48 kHz with
//!    the high-quality resampler settings.
//! 2. **Embed**: encode the intermediate to 256 kbps stereo AAC in an M4A
//!    container, reading back the normalization metadata generated by pass 1.
//!
//! Two passes are required because the normalization metadata must be
//! computed over the full signal before it can be written into the final
//! container.
//!
//! # Example
//!
//! ```ignore
//! use clipgate_core::encoder::{AfconvertEncoder, Encoder, EncodeJob, EncoderConfig};
//!
//! let encoder = AfconvertEncoder::with_defaults();
//! encoder.validate().await?;
//!
//! let job = EncodeJob {
//!     job_id: "track-01".to_string(),
//!     input_path: PathBuf::from("/music/track.wav"),
//!     output_path: PathBuf::from("/music/track.m4a"),
//! };
//! let outcome = encoder.encode(job, None).await?;
//! println!("Encoded {} bytes", outcome.output_size_bytes);
//! ```

mod afconvert;
mod config;
mod error;
mod paths;
mod traits;
mod types;

pub use afconvert::AfconvertEncoder;
pub use config::EncoderConfig;
pub use error::EncodeError;
pub use paths::{resolve_output_path, OutputPolicy};
pub use traits::Encoder;
pub use types::{EncodeJob, EncodeOutcome, EncodePass, EncodeProgress};
