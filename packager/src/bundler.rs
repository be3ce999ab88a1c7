//! Content-gathering bundlers.
//!
//! Bundlers populate an `ArtifactBuilder` through `add_file` and know
//! nothing about packaging internals. Variants share no base struct;
//! each implements the `Bundler` capability independently.

use std::path::{Path, PathBuf};

use bpack_core::error::{BpackError, Result};

use crate::artifact::ArtifactBuilder;

/// A source of files for an artifact.
pub trait Bundler {
    /// Add this bundler's files to the artifact.
    fn bundle(&self, artifact: &mut ArtifactBuilder) -> Result<()>;
}

/// Bundles every regular file under a directory tree, keyed by its
/// slash-separated path relative to the root.
pub struct DirectoryBundler {
    root: PathBuf,
}

impl DirectoryBundler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Bundler for DirectoryBundler {
    fn bundle(&self, artifact: &mut ArtifactBuilder) -> Result<()> {
        walk_dir(&self.root, &self.root, artifact)
    }
}

/// Recursively walk a directory and add regular files to the artifact.
fn walk_dir(root: &Path, current: &Path, artifact: &mut ArtifactBuilder) -> Result<()> {
    let read_dir = std::fs::read_dir(current).map_err(|e| {
        BpackError::Other(format!(
            "failed to read directory {}: {}",
            current.display(),
            e
        ))
    })?;

    for entry in read_dir {
        let entry = entry
            .map_err(|e| BpackError::Other(format!("failed to read directory entry: {}", e)))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| {
            BpackError::Other(format!(
                "failed to read file type of {}: {}",
                path.display(),
                e
            ))
        })?;

        if file_type.is_dir() {
            walk_dir(root, &path, artifact)?;
        } else if file_type.is_file() {
            let relative = path.strip_prefix(root).map_err(|e| {
                BpackError::Other(format!(
                    "failed to compute relative path for {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            let content = std::fs::read(&path)?;
            artifact.add_file(key, content);
        }
        // Symlinks and special files are skipped
    }

    Ok(())
}
