//! FluxCD-compatible OCI image assembly.
//!
//! Wraps an in-memory artifact tarball as a single-layer OCI image with
//! the media types, config, and annotations a GitOps source-controller
//! expects. The tarball is already gzip-compressed; the layer is a
//! byte-addressable blob, not a second compression pass.

use std::collections::HashMap;

use bpack_core::error::{BpackError, Result};
use bpack_core::metadata::ArtifactMetadata;
use oci_distribution::client::{Config, ImageLayer};
use oci_distribution::manifest::OciImageManifest;
use oci_spec::image::{Arch, ConfigBuilder, ImageConfigurationBuilder, Os, RootFsBuilder};
use sha2::{Digest, Sha256};

/// Config blob media type marking the artifact class.
///
/// Stable across versions; FluxCD's source-controller matches on it.
pub const CONFIG_MEDIA_TYPE: &str = "application/vnd.cncf.flux.config.v1+json";

/// Layer media type for the gzipped artifact tarball.
pub const CONTENT_MEDIA_TYPE: &str = "application/vnd.cncf.flux.content.v1.tar+gzip";

const ANNOTATION_TITLE: &str = "org.opencontainers.image.title";
const ANNOTATION_DESCRIPTION: &str = "org.opencontainers.image.description";
const ANNOTATION_CREATED: &str = "org.opencontainers.image.created";
const ANNOTATION_REVISION: &str = "org.opencontainers.image.revision";
const ANNOTATION_SOURCE: &str = "org.opencontainers.image.source";

/// An assembled OCI image, ready for publication.
pub struct OciArtifact {
    /// Exactly one layer: the compressed artifact tarball
    pub layers: Vec<ImageLayer>,
    /// Config blob with the flux config media type
    pub config: Config,
    /// Image manifest referencing config and layer
    pub manifest: OciImageManifest,
}

impl std::fmt::Debug for OciArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OciArtifact")
            .field("layers", &self.layers.len())
            .field("manifest", &self.manifest)
            .finish()
    }
}

/// Assemble a single-layer OCI image from the artifact tarball.
///
/// `repository` becomes the image title; `metadata` supplies the
/// version, description, and provenance mirrored into annotations so
/// registry UIs and GitOps controllers can read them without unpacking
/// the layer.
pub fn assemble(
    tarball: Vec<u8>,
    repository: &str,
    metadata: &ArtifactMetadata,
) -> Result<OciArtifact> {
    if tarball.is_empty() {
        return Err(BpackError::OciImageError(
            "failed to append layer: artifact content is empty".to_string(),
        ));
    }
    if repository.is_empty() {
        return Err(BpackError::OciImageError(
            "failed to create FluxCD-compatible OCI image: repository name is empty".to_string(),
        ));
    }

    let diff_id = format!("sha256:{}", sha256_bytes(&tarball));
    let layer = ImageLayer::new(tarball, CONTENT_MEDIA_TYPE.to_string(), None);

    let config_blob = build_config_blob(repository, metadata, diff_id)?;
    let config = Config::new(config_blob, CONFIG_MEDIA_TYPE.to_string(), None);

    let layers = vec![layer];
    let manifest = OciImageManifest::build(&layers, &config, Some(annotations(repository, metadata)));

    Ok(OciArtifact {
        layers,
        config,
        manifest,
    })
}

/// Build the serialized image configuration: amd64/linux (compatibility
/// convention for data artifacts), title label, rootfs diff ID.
fn build_config_blob(
    repository: &str,
    metadata: &ArtifactMetadata,
    diff_id: String,
) -> Result<Vec<u8>> {
    let mut labels = HashMap::new();
    labels.insert(ANNOTATION_TITLE.to_string(), repository.to_string());
    if !metadata.description.is_empty() {
        labels.insert(
            ANNOTATION_DESCRIPTION.to_string(),
            metadata.description.clone(),
        );
    }

    let config = ConfigBuilder::default()
        .labels(labels)
        .build()
        .map_err(image_error)?;

    let rootfs = RootFsBuilder::default()
        .typ("layers".to_string())
        .diff_ids(vec![diff_id])
        .build()
        .map_err(image_error)?;

    let image_config = ImageConfigurationBuilder::default()
        .created(metadata.created_at.to_rfc3339())
        .architecture(Arch::Amd64)
        .os(Os::Linux)
        .config(config)
        .rootfs(rootfs)
        .build()
        .map_err(image_error)?;

    serde_json::to_vec(&image_config).map_err(image_error)
}

/// Manifest annotations mirroring the artifact identity.
fn annotations(repository: &str, metadata: &ArtifactMetadata) -> HashMap<String, String> {
    let mut annotations = HashMap::new();
    annotations.insert(ANNOTATION_TITLE.to_string(), repository.to_string());
    annotations.insert(
        ANNOTATION_CREATED.to_string(),
        metadata.created_at.to_rfc3339(),
    );
    if !metadata.description.is_empty() {
        annotations.insert(
            ANNOTATION_DESCRIPTION.to_string(),
            metadata.description.clone(),
        );
    }
    if !metadata.git.commit.is_empty() {
        annotations.insert(ANNOTATION_REVISION.to_string(), metadata.git.commit.clone());
    }
    if !metadata.git.remote_url.is_empty() {
        annotations.insert(
            ANNOTATION_SOURCE.to_string(),
            metadata.git.remote_url.clone(),
        );
    }
    annotations
}

fn image_error(e: impl std::fmt::Display) -> BpackError {
    BpackError::OciImageError(format!(
        "failed to create FluxCD-compatible OCI image: {}",
        e
    ))
}

/// Compute the SHA256 digest of raw bytes as a hex string.
fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
