// SPDX-FileCopyrightText: 2026 Plugpub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local artifact hashing.

use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

const CHUNK: usize = 64 * 1024;

/// Hex SHA-256 and byte size of a local file.
pub async fn artifact_info(path: &Path) -> io::Result<(String, u64)> {
    let mut file = tokio::fs::File::open(path).await?;
    let size = file.metadata().await?.len();

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok((hex::encode(hasher.finalize()), size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashes_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.tar.gz");
        let content = vec![7u8; CHUNK * 2 + 13];
        std::fs::write(&path, &content).unwrap();

        let (checksum, size) = artifact_info(&path).await.unwrap();
        assert_eq!(checksum, hex::encode(Sha256::digest(&content)));
        assert_eq!(size, content.len() as u64);
    }

    #[tokio::test]
    async fn missing_file_errors() {
        assert!(artifact_info(Path::new("/nonexistent.tar.gz")).await.is_err());
    }
}
