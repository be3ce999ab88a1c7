//! Tar/gzip artifact serialization.
//!
//! Serializes the generated metadata plus the virtual file set into a
//! gzip-compressed POSIX tar stream, written either to a file on disk
//! or to an in-memory buffer. The metadata entry always comes first;
//! the embedded metadata source file is never re-emitted.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use bpack_core::error::{BpackError, Result};
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::artifact::{EMBEDDED_METADATA_PATH, GENERATED_METADATA_PATH};

/// Permission bits for every archive entry.
const ENTRY_MODE: u32 = 0o644;

/// Serialize metadata and files as a gzipped tar stream into `out`.
///
/// Entries are written in a stable order: `metadata.yaml` first, then
/// the remaining files in path order. Both the tar builder and the gzip
/// encoder are finalized explicitly; a failure to flush the compressed
/// tail is an error, not a silently truncated artifact.
pub fn write_archive<W: Write>(
    out: W,
    metadata: &[u8],
    files: &BTreeMap<String, Vec<u8>>,
) -> Result<W> {
    let encoder = GzEncoder::new(out, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    append_entry(&mut builder, GENERATED_METADATA_PATH, metadata).map_err(|e| {
        BpackError::ArchiveError(format!(
            "failed to write metadata entry '{}': {}",
            GENERATED_METADATA_PATH, e
        ))
    })?;

    for (path, content) in files {
        // The embedded source is replaced by the generated metadata.
        if path == EMBEDDED_METADATA_PATH {
            continue;
        }
        append_entry(&mut builder, path, content).map_err(|e| {
            BpackError::ArchiveError(format!("failed to write archive entry '{}': {}", path, e))
        })?;
    }

    // Close in reverse order of acquisition: tar, then gzip.
    let encoder = builder
        .into_inner()
        .map_err(|e| BpackError::ArchiveError(format!("failed to finalize archive: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| BpackError::ArchiveError(format!("failed to finalize archive: {}", e)))
}

/// Serialize to an in-memory buffer (registry push path).
pub fn write_to_buffer(metadata: &[u8], files: &BTreeMap<String, Vec<u8>>) -> Result<Vec<u8>> {
    write_archive(Vec::new(), metadata, files)
}

/// Serialize to a file on disk (local artifact path).
pub fn write_to_file(path: &Path, metadata: &[u8], files: &BTreeMap<String, Vec<u8>>) -> Result<()> {
    let file = File::create(path).map_err(|e| {
        BpackError::ArchiveError(format!(
            "failed to create archive file {}: {}",
            path.display(),
            e
        ))
    })?;

    write_archive(file, metadata, files)?;
    Ok(())
}

/// Resolve the caller's output path to a concrete archive file name.
///
/// A path that names an existing directory, ends with a separator, or
/// has no file extension is treated as a directory and gets a
/// synthesized `<name>-<version>.tar.gz` inside it; anything else is
/// used verbatim.
pub fn resolve_output_path(output: &Path, name: &str, version: &str) -> PathBuf {
    let file_name = format!("{}-{}.tar.gz", name, version);

    let dir_like = output.is_dir()
        || output
            .to_string_lossy()
            .ends_with(std::path::MAIN_SEPARATOR)
        || output.extension().is_none();

    if dir_like {
        if output == Path::new(".") {
            PathBuf::from(file_name)
        } else {
            output.join(file_name)
        }
    } else {
        output.to_path_buf()
    }
}

/// Append one entry: header (name, size, mode) followed by content.
fn append_entry<W: Write>(
    builder: &mut tar::Builder<W>,
    path: &str,
    content: &[u8],
) -> std::io::Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(ENTRY_MODE);
    header.set_cksum();
    builder.append_data(&mut header, path, content)
}
