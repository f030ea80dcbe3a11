//! Configuration for the encoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the afconvert-based encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Path to the afconvert binary.
    #[serde(default = "default_afconvert_path")]
    pub afconvert_path: PathBuf,

    /// Path to the afinfo binary (sample-rate probe).
    #[serde(default = "default_afinfo_path")]
    pub afinfo_path: PathBuf,

    /// Temporary directory for pass-1 intermediate files.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// AAC bitrate in bits per second.
    #[serde(default = "default_bitrate")]
    pub bitrate: u32,

    /// Encoder quality, 0-127.
    #[serde(default = "default_quality")]
    pub quality: u32,

    /// Bitrate allocation strategy passed to the encoder.
    #[serde(default = "default_strategy")]
    pub strategy: u32,

    /// Sources above this rate are resampled down to it in pass 1.
    #[serde(default = "default_target_sample_rate")]
    pub target_sample_rate: u32,

    /// Timeout for a single encode pass in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_afconvert_path() -> PathBuf {
    PathBuf::from("afconvert")
}

fn default_afinfo_path() -> PathBuf {
    PathBuf::from("afinfo")
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("clipgate")
}

fn default_bitrate() -> u32 {
    256_000
}

fn default_quality() -> u32 {
    127
}

fn default_strategy() -> u32 {
    2
}

fn default_target_sample_rate() -> u32 {
    48_000
}

fn default_timeout() -> u64 {
    600 // 10 minutes per pass
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            afconvert_path: default_afconvert_path(),
            afinfo_path: default_afinfo_path(),
            temp_dir: default_temp_dir(),
            bitrate: default_bitrate(),
            quality: default_quality(),
            strategy: default_strategy(),
            target_sample_rate: default_target_sample_rate(),
            timeout_secs: default_timeout(),
        }
    }
}

impl EncoderConfig {
    /// Creates a new config with custom afconvert/afinfo paths.
    pub fn with_paths(afconvert_path: PathBuf, afinfo_path: PathBuf) -> Self {
        Self {
            afconvert_path,
            afinfo_path,
            ..Default::default()
        }
    }

    /// Sets the temp directory.
    pub fn with_temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.temp_dir = temp_dir;
        self
    }

    /// Sets the per-pass timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EncoderConfig::default();
        assert_eq!(config.afconvert_path, PathBuf::from("afconvert"));
        assert_eq!(config.afinfo_path, PathBuf::from("afinfo"));
        assert_eq!(config.bitrate, 256_000);
        assert_eq!(config.quality, 127);
        assert_eq!(config.strategy, 2);
        assert_eq!(config.target_sample_rate, 48_000);
    }

    #[test]
    fn test_config_builder() {
        let config = EncoderConfig::with_paths(
            PathBuf::from("/usr/bin/afconvert"),
            PathBuf::from("/usr/bin/afinfo"),
        )
        .with_temp_dir(PathBuf::from("/tmp/test"))
        .with_timeout(30);

        assert_eq!(config.afconvert_path, PathBuf::from("/usr/bin/afconvert"));
        assert_eq!(config.temp_dir, PathBuf::from("/tmp/test"));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_config_serialization() {
        let config = EncoderConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EncoderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.bitrate, config.bitrate);
        assert_eq!(parsed.target_sample_rate, config.target_sample_rate);
    }
}
