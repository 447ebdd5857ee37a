//! CRC32 checksums over finalized container files
//!
//! Reported for every written file and recomputed by the verifier, so a
//! verified file can be matched against the run that produced it.
//!
//! Uses CRC32 (IEEE polynomial).

use std::fs;
use std::path::Path;

use crc32fast::Hasher;

use super::errors::{ContainerError, ContainerResult};

/// Computes a CRC32 checksum over the provided data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Computes the checksum of a file on disk.
pub fn checksum_file(path: &Path) -> ContainerResult<u32> {
    let bytes = fs::read(path).map_err(|e| {
        ContainerError::read_io(path, "Failed to read file for checksum", e)
    })?;
    Ok(compute_checksum(&bytes))
}

/// Formats a checksum the way reports print it.
pub fn format_checksum(checksum: u32) -> String {
    format!("{:08x}", checksum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_checksum_deterministic() {
        let data = b"Obj\x01 container bytes";
        assert_eq!(compute_checksum(data), compute_checksum(data));
    }

    #[test]
    fn test_checksum_detects_single_bit_flip() {
        let mut data = vec![0x4f, 0x62, 0x6a, 0x01, 0x04];
        let original = compute_checksum(&data);
        data[2] ^= 0x01;
        assert_ne!(original, compute_checksum(&data));
    }

    #[test]
    fn test_checksum_file_matches_bytes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("blob");
        fs::write(&path, b"payload").unwrap();
        assert_eq!(checksum_file(&path).unwrap(), compute_checksum(b"payload"));
    }

    #[test]
    fn test_checksum_missing_file_is_read_error() {
        let tmp = TempDir::new().unwrap();
        let err = checksum_file(&tmp.path().join("absent")).unwrap_err();
        assert!(err.is_read());
    }

    #[test]
    fn test_format_is_zero_padded() {
        assert_eq!(format_checksum(0xab), "000000ab");
    }
}
