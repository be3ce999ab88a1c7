//! Best-effort git provenance and builder identity queries.
//!
//! Provenance is advisory metadata, never a build precondition: every
//! query that fails — git missing, not a repository, no commits, no
//! remote — yields an empty field and the build continues.

use std::path::Path;
use std::process::Command;

use bpack_core::metadata::{BuilderIdentity, GitProvenance};

/// Gather commit, tag-at-HEAD, and origin remote URL from `dir`.
pub fn git_provenance(dir: &Path) -> GitProvenance {
    GitProvenance {
        commit: git_output(dir, &["rev-parse", "HEAD"]).unwrap_or_default(),
        tag: git_output(dir, &["tag", "--points-at", "HEAD"])
            .map(first_line)
            .unwrap_or_default(),
        remote_url: git_output(dir, &["config", "--get", "remote.origin.url"])
            .unwrap_or_default(),
    }
}

/// Gather the configured git user name and email from `dir`.
pub fn builder_identity(dir: &Path) -> BuilderIdentity {
    BuilderIdentity {
        name: git_output(dir, &["config", "user.name"]).unwrap_or_default(),
        email: git_output(dir, &["config", "user.email"]).unwrap_or_default(),
    }
}

/// Run a git query and return its trimmed stdout, or None on any failure.
fn git_output(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() {
        None
    } else {
        Some(stdout)
    }
}

/// `git tag --points-at` may list several tags; keep the first.
fn first_line(s: String) -> String {
    s.lines().next().unwrap_or_default().trim().to_string()
}
