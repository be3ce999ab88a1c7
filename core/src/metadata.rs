//! Artifact metadata data model.
//!
//! Shared serde types for the optional embedded metadata file and the
//! generated, authoritative metadata written into every artifact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Optional metadata embedded in the file set before packaging.
///
/// Every field is optional; name and version may be overridden by a
/// caller-supplied `name:version` tag during resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddedMetadata {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub tags: Vec<String>,
    pub homepage: Option<String>,
    pub license: Option<String>,
}

/// Git facts recorded for traceability.
///
/// Each field is gathered best-effort; a failed query leaves that field
/// empty without failing the build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitProvenance {
    /// Commit SHA of HEAD
    pub commit: String,
    /// Tag pointing at HEAD, if any
    pub tag: String,
    /// Configured origin remote URL
    pub remote_url: String,
}

/// Identity of the user producing the artifact, from local git config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderIdentity {
    pub name: String,
    pub email: String,
}

/// Authoritative metadata generated at packaging time.
///
/// Serialized as YAML into `metadata.yaml` at the root of every
/// produced archive. Empty provenance fields are serialized as empty
/// strings rather than omitted, so consumers see a stable shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub homepage: String,
    #[serde(default)]
    pub license: String,
    /// UTC timestamp of packaging, never caller-supplied
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub git: GitProvenance,
    #[serde(default)]
    pub builder: BuilderIdentity,
}

impl ArtifactMetadata {
    /// Build metadata from resolved name/version plus the embedded
    /// fields that the tag cannot override.
    pub fn new(name: String, version: String, embedded: &EmbeddedMetadata) -> Self {
        Self {
            name,
            version,
            description: embedded.description.clone().unwrap_or_default(),
            author: embedded.author.clone().unwrap_or_default(),
            tags: embedded.tags.clone(),
            homepage: embedded.homepage.clone().unwrap_or_default(),
            license: embedded.license.clone().unwrap_or_default(),
            created_at: Utc::now(),
            git: GitProvenance::default(),
            builder: BuilderIdentity::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_metadata_full_parse() {
        let yaml = r#"
name: netbundle
version: 1.2.3
description: Network blueprints
author: Platform Team
tags:
  - network
  - base
homepage: https://example.com/netbundle
license: Apache-2.0
"#;
        let parsed: EmbeddedMetadata = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.name, Some("netbundle".to_string()));
        assert_eq!(parsed.version, Some("1.2.3".to_string()));
        assert_eq!(parsed.tags, vec!["network", "base"]);
        assert_eq!(parsed.license, Some("Apache-2.0".to_string()));
    }

    #[test]
    fn test_embedded_metadata_partial_parse() {
        // Fields not present default to None/empty
        let parsed: EmbeddedMetadata = serde_yaml::from_str("name: netbundle").unwrap();
        assert_eq!(parsed.name, Some("netbundle".to_string()));
        assert_eq!(parsed.version, None);
        assert!(parsed.tags.is_empty());
    }

    #[test]
    fn test_artifact_metadata_roundtrip() {
        let embedded = EmbeddedMetadata {
            description: Some("Network blueprints".to_string()),
            tags: vec!["network".to_string()],
            ..Default::default()
        };
        let meta = ArtifactMetadata::new("netbundle".to_string(), "1.2.3".to_string(), &embedded);

        let yaml = serde_yaml::to_string(&meta).unwrap();
        let parsed: ArtifactMetadata = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, meta);
    }

    #[test]
    fn test_empty_provenance_serialized_as_empty_fields() {
        let meta = ArtifactMetadata::new(
            "netbundle".to_string(),
            "1.2.3".to_string(),
            &EmbeddedMetadata::default(),
        );

        let yaml = serde_yaml::to_string(&meta).unwrap();
        // Empty provenance is present in the output, not omitted
        assert!(yaml.contains("commit: ''"));
        assert!(yaml.contains("remote_url: ''"));
        assert!(yaml.contains("email: ''"));
    }

    #[test]
    fn test_new_copies_embedded_fields() {
        let embedded = EmbeddedMetadata {
            name: Some("ignored".to_string()),
            version: Some("ignored".to_string()),
            description: Some("desc".to_string()),
            author: Some("author".to_string()),
            tags: vec!["a".to_string(), "b".to_string()],
            homepage: Some("https://example.com".to_string()),
            license: Some("MIT".to_string()),
        };
        let meta = ArtifactMetadata::new("final".to_string(), "9.9.9".to_string(), &embedded);

        // name/version come from the resolved arguments, not the embedded file
        assert_eq!(meta.name, "final");
        assert_eq!(meta.version, "9.9.9");
        assert_eq!(meta.description, "desc");
        assert_eq!(meta.author, "author");
        assert_eq!(meta.tags, vec!["a", "b"]);
        assert_eq!(meta.homepage, "https://example.com");
        assert_eq!(meta.license, "MIT");
    }
}
