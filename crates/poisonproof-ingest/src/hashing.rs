//! SHA-256 digests of original file bytes.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::IngestResult;

/// Lowercase hex SHA-256 of `bytes`.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Lowercase hex SHA-256 of a file, streamed.
pub fn hash_file(path: &Path) -> IngestResult<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            hash_bytes(b"password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
        assert_eq!(hash_bytes(&[]).len(), 64);
    }

    #[test]
    fn test_file_and_bytes_agree() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"id,salary\n1,60000\n").unwrap();
        assert_eq!(
            hash_file(file.path()).unwrap(),
            hash_bytes(b"id,salary\n1,60000\n")
        );
    }
}
