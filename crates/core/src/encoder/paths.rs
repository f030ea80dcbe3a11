//! Collision-safe output path resolution.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use super::error::EncodeError;

/// Where converted files are written relative to their source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputPolicy {
    /// Next to the source file.
    #[default]
    SameDirectory,
    /// In an `M4A` subfolder next to the source file, created if absent.
    Subfolder,
}

/// Name of the subfolder used by [`OutputPolicy::Subfolder`].
const SUBFOLDER_NAME: &str = "M4A";

/// Resolves an output path for `input` that does not already exist.
///
/// The base candidate is `<input-stem>.m4a` in the policy's directory. On
/// collision, `-1`, `-2`, ... are appended to the stem until a free name is
/// found. Existence is re-checked against the filesystem at resolution time
/// rather than cached.
///
/// Resolution and file creation are not atomic: two workers resolving the
/// same base name concurrently can both pick the same candidate before
/// either creates the file. The window is accepted; distinct inputs with
/// identical stems in the same directory at the same instant are the only
/// way to hit it.
pub async fn resolve_output_path(
    input: &Path,
    policy: OutputPolicy,
) -> Result<PathBuf, EncodeError> {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));

    let dir = match policy {
        OutputPolicy::SameDirectory => parent.to_path_buf(),
        OutputPolicy::Subfolder => {
            let dir = parent.join(SUBFOLDER_NAME);
            fs::create_dir_all(&dir)
                .await
                .map_err(|_| EncodeError::OutputDirectoryFailed { path: dir.clone() })?;
            dir
        }
    };

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());

    let mut candidate = dir.join(format!("{stem}.m4a"));
    let mut counter = 1u32;
    while fs::try_exists(&candidate).await.unwrap_or(false) {
        candidate = dir.join(format!("{stem}-{counter}.m4a"));
        counter += 1;
    }

    Ok(candidate)
}
