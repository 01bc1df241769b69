// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Archiver: staging directory to `.tar.gz` plus a `.sha256` sidecar.
//!
//! The checksum covers the compressed bytes exactly as written to disk, so a
//! client can verify a download by hashing the file it received. The staging
//! directory is removed only after the archive and sidecar are complete.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use plugpub_core::RegistryError;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::fsutil::walk_files;

/// Result of archiving one staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOutput {
    pub archive: PathBuf,
    pub checksum_file: PathBuf,
    /// Hex-encoded SHA-256 of the archive bytes.
    pub checksum: String,
    /// Archive size in bytes.
    pub size: u64,
}

/// Tees everything written through it into a SHA-256 hasher.
struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
    written: u64,
}

impl<W: Write> HashingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            written: 0,
        }
    }

    fn finish(self) -> (W, String, u64) {
        (self.inner, hex::encode(self.hasher.finalize()), self.written)
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Path of the checksum sidecar for an archive: `<archive>.sha256`.
pub fn checksum_path(archive: &Path) -> PathBuf {
    let mut name = OsString::from(archive.as_os_str());
    name.push(".sha256");
    PathBuf::from(name)
}

/// Compress `source` into `dest`, write the sidecar, then delete `source`.
///
/// Entries use paths relative to `source`; directories get no entries of
/// their own. On failure the staging directory is left in place and any
/// partial archive is removed.
pub fn tar_gz(source: &Path, dest: &Path) -> Result<ArchiveOutput, RegistryError> {
    let (checksum, size) = match write_archive(source, dest) {
        Ok(done) => done,
        Err(err) => {
            let _ = fs::remove_file(dest);
            return Err(err);
        }
    };

    let checksum_file = checksum_path(dest);
    fs::write(&checksum_file, &checksum).map_err(|e| archive_error(&checksum_file, e))?;

    fs::remove_dir_all(source).map_err(|e| archive_error(source, e))?;
    debug!(archive = %dest.display(), %checksum, size, "archive written");

    Ok(ArchiveOutput {
        archive: dest.to_path_buf(),
        checksum_file,
        checksum,
        size,
    })
}

fn write_archive(source: &Path, dest: &Path) -> Result<(String, u64), RegistryError> {
    let files = walk_files(source).map_err(|e| archive_error(source, e))?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| archive_error(parent, e))?;
    }
    let file = File::create(dest).map_err(|e| archive_error(dest, e))?;

    let writer = HashingWriter::new(BufWriter::new(file));
    let mut builder = tar::Builder::new(GzEncoder::new(writer, Compression::default()));
    builder.mode(tar::HeaderMode::Deterministic);

    for rel in &files {
        let path = source.join(rel);
        builder
            .append_path_with_name(&path, rel)
            .map_err(|e| archive_error(&path, e))?;
    }

    finish_archive(builder).map_err(|e| archive_error(dest, e))
}

/// Flush tar and gzip trailers through the hasher and sync the file.
fn finish_archive(
    builder: tar::Builder<GzEncoder<HashingWriter<BufWriter<File>>>>,
) -> io::Result<(String, u64)> {
    let writer = builder.into_inner()?.finish()?;
    let (buffered, checksum, size) = writer.finish();
    buffered.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    Ok((checksum, size))
}

fn archive_error(path: &Path, source: io::Error) -> RegistryError {
    RegistryError::Archive {
        path: path.to_path_buf(),
        source,
    }
}
