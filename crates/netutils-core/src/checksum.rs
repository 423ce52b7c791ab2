//! Cryptographic digests of a byte source, for remotes that report MD5, SHA-1
//! or SHA-256 instead of the XOR fingerprint.

use crate::transfer::read_retrying;
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::io::{self, Read};

const BUF_SIZE: usize = 64 * 1024;

/// Reads `source` to the end through `D` and returns the digest as lowercase hex.
pub fn digest_source<D: Digest, R: Read + ?Sized>(source: &mut R) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = read_retrying(source, &mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn md5_source<R: Read + ?Sized>(source: &mut R) -> io::Result<String> {
    digest_source::<Md5, R>(source)
}

pub fn sha1_source<R: Read + ?Sized>(source: &mut R) -> io::Result<String> {
    digest_source::<Sha1, R>(source)
}

pub fn sha256_source<R: Read + ?Sized>(source: &mut R) -> io::Result<String> {
    digest_source::<Sha256, R>(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::{Cursor, Write};

    #[test]
    fn sha256_empty_source() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let mut file = File::open(f.path()).unwrap();
        assert_eq!(
            sha256_source(&mut file).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_known_content() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        let mut file = File::open(f.path()).unwrap();
        assert_eq!(
            sha256_source(&mut file).unwrap(),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn md5_known_content() {
        assert_eq!(
            md5_source(&mut Cursor::new(b"hello\n".to_vec())).unwrap(),
            "b1946ac92492d2347c6235b4d2611184"
        );
        assert_eq!(
            md5_source(&mut io::empty()).unwrap(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }

    #[test]
    fn sha1_known_content() {
        assert_eq!(
            sha1_source(&mut Cursor::new(b"hello\n".to_vec())).unwrap(),
            "f572d396fae9206628714fb2ce00f72e94f2258f"
        );
        assert_eq!(
            sha1_source(&mut io::empty()).unwrap(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn sha256_spans_buffer_boundary() {
        let data = vec![b'a'; BUF_SIZE + 1];
        let expected = hex::encode(Sha256::digest(&data));
        assert_eq!(sha256_source(&mut Cursor::new(data)).unwrap(), expected);
    }
}
