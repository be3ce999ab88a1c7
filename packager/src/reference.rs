//! Repository reference parsing.
//!
//! Splits references like `ghcr.io/acme/blueprints/netbundle:1.2.3`
//! into structured registry/repository/tag components.

use bpack_core::error::{BpackError, Result};

/// Default registry when none is specified.
const DEFAULT_REGISTRY: &str = "docker.io";

/// Parsed repository reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Registry hostname (e.g., "ghcr.io", "registry.local:5000")
    pub registry: String,
    /// Repository path (e.g., "acme/blueprints/netbundle")
    pub repository: String,
    /// Tag (e.g., "1.2.3"); None when the reference carries no tag
    pub tag: Option<String>,
}

impl ImageReference {
    /// Parse a repository reference string.
    ///
    /// Supports formats:
    /// - `acme/netbundle` → docker.io/acme/netbundle
    /// - `ghcr.io/acme/netbundle:1.2.3` → ghcr.io/acme/netbundle:1.2.3
    /// - `registry.local:5000/netbundle` → registry.local:5000/netbundle
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim().trim_end_matches('/');
        if reference.is_empty() {
            return Err(BpackError::RegistryError {
                registry: String::new(),
                message: "invalid repository reference: empty reference".to_string(),
            });
        }

        // Split tag on the last colon after the last slash
        let (name, tag) = if let Some(slash_pos) = reference.rfind('/') {
            let after_slash = &reference[slash_pos + 1..];
            if let Some(colon_pos) = after_slash.rfind(':') {
                let tag = &after_slash[colon_pos + 1..];
                let name = &reference[..slash_pos + 1 + colon_pos];
                (name.to_string(), Some(tag.to_string()))
            } else {
                (reference.to_string(), None)
            }
        } else if let Some(colon_pos) = reference.rfind(':') {
            // Could be registry:port or name:tag — a numeric suffix is a port
            let after_colon = &reference[colon_pos + 1..];
            if after_colon.chars().all(|c| c.is_ascii_digit()) {
                (reference.to_string(), None)
            } else {
                (
                    reference[..colon_pos].to_string(),
                    Some(after_colon.to_string()),
                )
            }
        } else {
            (reference.to_string(), None)
        };

        let (registry, repository) = Self::split_registry_repository(&name)?;

        Ok(ImageReference {
            registry,
            repository,
            tag,
        })
    }

    /// Split a name into registry and repository components.
    fn split_registry_repository(name: &str) -> Result<(String, String)> {
        // The first component is a registry hostname if it contains a
        // dot or colon, or is "localhost"
        if let Some(slash_pos) = name.find('/') {
            let first = &name[..slash_pos];
            if first.contains('.') || first.contains(':') || first == "localhost" {
                let registry = first.to_string();
                let repository = name[slash_pos + 1..].to_string();
                if repository.is_empty() {
                    return Err(BpackError::RegistryError {
                        registry,
                        message: format!(
                            "invalid repository reference '{}': empty repository",
                            name
                        ),
                    });
                }
                return Ok((registry, repository));
            }
        }

        if name.is_empty() {
            return Err(BpackError::RegistryError {
                registry: String::new(),
                message: "invalid repository reference: empty repository".to_string(),
            });
        }

        Ok((DEFAULT_REGISTRY.to_string(), name.to_string()))
    }

    /// Return this reference with the given tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Get the full reference string.
    pub fn full_reference(&self) -> String {
        let mut s = format!("{}/{}", self.registry, self.repository);
        if let Some(ref tag) = self.tag {
            s.push(':');
            s.push_str(tag);
        }
        s
    }
}

impl std::fmt::Display for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_reference())
    }
}
