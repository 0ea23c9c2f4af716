/// Content fingerprints — streaming SHA-512 over a file's bytes.
///
/// Files are read in fixed-size chunks so a large message never has to be
/// held in memory. The digest is a pure function of the byte content: the
/// chunk size changes nothing but the number of `read` calls.
use crate::error::{DedupError, Result};
use sha2::{Digest, Sha512};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Default read size for [`Sha512Hasher`].
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Number of leading hex characters used as shard directory levels.
pub const SHARD_DEPTH: usize = 3;

/// Lowercase hex digest of a file's full content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already hex-encoded digest.
    ///
    /// Returns `None` unless `hex` is at least [`SHARD_DEPTH`] characters of
    /// lowercase hexadecimal, which is all the store needs to place it.
    pub fn from_hex(hex: impl Into<String>) -> Option<Self> {
        let hex = hex.into();
        let valid = hex.len() >= SHARD_DEPTH
            && hex
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then_some(Self(hex))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Relative shard directory: the first three hex characters as three
    /// single-character path segments, e.g. `a/b/c`.
    pub fn shard(&self) -> PathBuf {
        self.0[..SHARD_DEPTH]
            .chars()
            .map(|c| c.to_string())
            .collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anything that can fingerprint a file on disk.
///
/// The engine is generic over this so tests can count or fake hashing.
pub trait ContentHasher {
    fn fingerprint(&self, path: &Path) -> Result<Fingerprint>;
}

/// The production hasher: SHA-512, read in `chunk_size` pieces.
#[derive(Debug, Clone, Copy)]
pub struct Sha512Hasher {
    chunk_size: usize,
}

impl Sha512Hasher {
    /// A hasher reading `chunk_size` bytes at a time (clamped to at least 1).
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }
}

impl Default for Sha512Hasher {
    fn default() -> Self {
        Self::with_chunk_size(CHUNK_SIZE)
    }
}

impl ContentHasher for Sha512Hasher {
    fn fingerprint(&self, path: &Path) -> Result<Fingerprint> {
        let file = File::open(path).map_err(|e| DedupError::io(path, e))?;
        fingerprint_reader(file, self.chunk_size).map_err(|e| DedupError::io(path, e))
    }
}

/// Hash everything `reader` yields, `chunk_size` bytes at a time.
pub fn fingerprint_reader<R: Read>(mut reader: R, chunk_size: usize) -> io::Result<Fingerprint> {
    let mut hasher = Sha512::new();
    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(Fingerprint(hex::encode(hasher.finalize())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// SHA-512 of the empty input (FIPS 180-2 test vector).
    const EMPTY_SHA512: &str = "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce\
                                47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e";

    #[test]
    fn empty_input_matches_known_vector() {
        let fp = fingerprint_reader(io::empty(), CHUNK_SIZE).unwrap();
        assert_eq!(fp.as_str(), EMPTY_SHA512);
        assert_eq!(fp.as_str().len(), 128);
    }

    /// The digest must not depend on how the bytes were chunked.
    #[test]
    fn digest_is_independent_of_chunk_size() {
        let data: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
        let reference = fingerprint_reader(&data[..], CHUNK_SIZE).unwrap();
        for chunk in [1, 7, 64, 4096, 1 << 20] {
            let fp = fingerprint_reader(&data[..], chunk).unwrap();
            assert_eq!(fp, reference, "chunk size {chunk} changed the digest");
        }
    }

    #[test]
    fn file_and_reader_agree() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"Subject: hello\r\n\r\nbody\r\n").unwrap();
        file.flush().unwrap();

        let from_file = Sha512Hasher::with_chunk_size(3)
            .fingerprint(file.path())
            .unwrap();
        let from_bytes =
            fingerprint_reader(&b"Subject: hello\r\n\r\nbody\r\n"[..], CHUNK_SIZE).unwrap();
        assert_eq!(from_file, from_bytes);
    }

    #[test]
    fn different_content_gives_different_digest() {
        let a = fingerprint_reader(&b"message one"[..], CHUNK_SIZE).unwrap();
        let b = fingerprint_reader(&b"message two"[..], CHUNK_SIZE).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn missing_file_is_an_io_error_naming_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let err = Sha512Hasher::default().fingerprint(&missing).unwrap_err();
        match err {
            DedupError::Io { path, source } => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn shard_uses_first_three_hex_chars() {
        let fp = Fingerprint::from_hex("abcdef0123").unwrap();
        assert_eq!(fp.shard(), PathBuf::from("a").join("b").join("c"));
    }

    #[test]
    fn from_hex_rejects_short_or_non_hex() {
        assert!(Fingerprint::from_hex("ab").is_none());
        assert!(Fingerprint::from_hex("abz123").is_none());
        assert!(Fingerprint::from_hex("ABC123").is_none());
        assert!(Fingerprint::from_hex("abc").is_some());
    }
}
