// Evidence hashing for loaded artifact files
//
// Each artifact database is hashed (SHA-256) at load time so the overview
// can tie every dataset back to the exact file examined.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use super::BUFFER_SIZE;

/// Size and SHA-256 of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    pub size_bytes: u64,
    /// Lowercase hex
    pub sha256: String,
}

// =============================================================================
// Hashing
// =============================================================================

/// Stream a file through SHA-256
#[instrument(skip_all, fields(path = %path.display()))]
pub fn sha256_file(path: &Path) -> std::io::Result<FileDigest> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
    let mut hasher = Sha256::new();
    let mut size_bytes = 0u64;

    loop {
        let chunk = reader.fill_buf()?;
        if chunk.is_empty() {
            break;
        }
        hasher.update(chunk);
        let n = chunk.len();
        size_bytes += n as u64;
        reader.consume(n);
    }

    let sha256 = hex::encode(hasher.finalize());
    debug!(size_bytes, %sha256, "Hashed artifact file");
    Ok(FileDigest { size_bytes, sha256 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sha256_bytes(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }
    use std::io::Write;
    use tempfile::TempDir;

    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn test_sha256_bytes() {
        assert_eq!(sha256_bytes(b"abc"), ABC_SHA256);
    }

    #[test]
    fn test_sha256_file_matches_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("calllog.db");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"abc").unwrap();
        drop(file);

        let digest = sha256_file(&path).unwrap();
        assert_eq!(digest.size_bytes, 3);
        assert_eq!(digest.sha256, ABC_SHA256);
    }

    #[test]
    fn test_sha256_file_spanning_buffers() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big.db");
        let data = vec![0x5Au8; BUFFER_SIZE * 2 + 17];
        std::fs::write(&path, &data).unwrap();

        let digest = sha256_file(&path).unwrap();
        assert_eq!(digest.size_bytes, data.len() as u64);
        assert_eq!(digest.sha256, sha256_bytes(&data));
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(sha256_file(&temp_dir.path().join("nope.db")).is_err());
    }
}
