//! Artifact metadata resolution.
//!
//! Merges an optional caller-supplied `name:version` tag with the
//! optional embedded metadata file, enforces precedence and
//! required-field rules, then enriches the result with git provenance
//! and builder identity before serializing it to YAML.

use std::collections::BTreeMap;
use std::path::Path;

use bpack_core::error::{BpackError, Result};
use bpack_core::metadata::{ArtifactMetadata, EmbeddedMetadata};

use crate::artifact::EMBEDDED_METADATA_PATH;
use crate::provenance;

/// Final metadata plus its YAML encoding, ready for archiving.
#[derive(Debug, Clone)]
pub struct ResolvedMetadata {
    pub metadata: ArtifactMetadata,
    /// YAML serialization of `metadata`, written as the archive's
    /// first entry.
    pub encoded: Vec<u8>,
}

impl ResolvedMetadata {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn version(&self) -> &str {
        &self.metadata.version
    }
}

/// Resolve final artifact metadata from the file set and the optional tag.
///
/// Precedence: tag name/version override the embedded file; every other
/// field comes only from the embedded file. Fails before any filesystem
/// or network I/O if the final name or version is empty.
///
/// `workdir` is where the best-effort git queries run.
pub fn resolve(
    files: &BTreeMap<String, Vec<u8>>,
    tag: &str,
    workdir: &Path,
) -> Result<ResolvedMetadata> {
    let tag_parts = parse_tag(tag)?;

    let embedded = match files.get(EMBEDDED_METADATA_PATH) {
        Some(raw) => {
            serde_yaml::from_slice::<EmbeddedMetadata>(raw).map_err(|e| {
                BpackError::MetadataParse {
                    file: EMBEDDED_METADATA_PATH.to_string(),
                    message: e.to_string(),
                }
            })?
        }
        None => EmbeddedMetadata::default(),
    };

    let name = tag_parts
        .as_ref()
        .map(|(n, _)| n.clone())
        .or_else(|| embedded.name.clone())
        .filter(|n| !n.is_empty())
        .ok_or(BpackError::MissingMetadata { field: "name" })?;

    let version = tag_parts
        .as_ref()
        .map(|(_, v)| v.clone())
        .or_else(|| embedded.version.clone())
        .filter(|v| !v.is_empty())
        .ok_or(BpackError::MissingMetadata { field: "version" })?;

    let mut metadata = ArtifactMetadata::new(name, version, &embedded);
    metadata.git = provenance::git_provenance(workdir);
    metadata.builder = provenance::builder_identity(workdir);

    let encoded = serde_yaml::to_string(&metadata)?.into_bytes();

    Ok(ResolvedMetadata { metadata, encoded })
}

/// Parse an optional `name:version` tag.
///
/// An empty tag means "no override". Anything else must be exactly two
/// non-empty segments separated by a single colon.
fn parse_tag(tag: &str) -> Result<Option<(String, String)>> {
    if tag.is_empty() {
        return Ok(None);
    }

    let parts: Vec<&str> = tag.split(':').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(BpackError::TagFormat {
            tag: tag.to_string(),
        });
    }

    Ok(Some((parts[0].to_string(), parts[1].to_string())))
}
