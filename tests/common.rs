// tests/common.rs
//! Shared fixtures for the integration tests.

use std::io::Write as _;

use dbcrypt_rs::consts::SQLITE_HEADER;
use dbcrypt_rs::{CancelToken, Codec, V4Codec};
use tempfile::NamedTempFile;

/// 0x11 repeated, hex-encoded; the key used by most scenarios.
pub fn hex_key() -> String {
    "11".repeat(32)
}

/// Same key with its last byte changed.
#[allow(dead_code)]
pub fn wrong_hex_key() -> String {
    let mut key = hex_key();
    key.replace_range(62..64, "22");
    key
}

pub fn write_temp(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}

/// Three-page plaintext image: page 0 is the header followed by a byte
/// pattern, page 1 is a second pattern, page 2 is all zeros.
#[allow(dead_code)]
pub fn three_page_plaintext(page_size: usize) -> Vec<u8> {
    let mut plain = vec![0u8; page_size * 3];
    plain[..SQLITE_HEADER.len()].copy_from_slice(SQLITE_HEADER);
    for i in SQLITE_HEADER.len()..page_size {
        plain[i] = ((i + 37) % 251) as u8;
    }
    for i in 0..page_size {
        plain[page_size + i] = ((i + 91) % 251) as u8;
    }
    plain
}

#[allow(dead_code)]
pub fn encrypt_to_vec(codec: &V4Codec, plain: &[u8], hex_key: &str) -> Vec<u8> {
    let file = write_temp(plain);
    let mut out = Vec::new();
    codec
        .encrypt(&CancelToken::new(), file.path(), hex_key, &mut out)
        .unwrap();
    out
}

#[allow(dead_code)]
pub fn decrypt_to_vec(
    codec: &V4Codec,
    encrypted: &[u8],
    hex_key: &str,
) -> dbcrypt_rs::Result<Vec<u8>> {
    let file = write_temp(encrypted);
    let mut out = Vec::new();
    codec
        .decrypt(&CancelToken::new(), file.path(), hex_key, &mut out)
        .map(|()| out)
}
