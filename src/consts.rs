// src/consts.rs

//! Shared page-format constants plus the fixed Windows v4 parameters.

/// The 16-byte signature every plaintext SQLite image starts with.
pub const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

/// Raw key length in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// Length of the random salt stored at the start of page 0. Equal to the
/// header length, which is what lets encryption replace the header in place.
pub const SALT_SIZE: usize = 16;

/// Per-page CBC initialization vector length.
pub const IV_SIZE: usize = 16;

/// AES block size; the cipher region of every page is a multiple of this.
pub const AES_BLOCK_SIZE: usize = 16;

/// Byte XORed into the salt to obtain the HMAC-key salt.
pub const MAC_SALT_XOR: u8 = 0x3a;

/// PBKDF2 rounds for the HMAC key (derived from the encryption key).
pub const MAC_KEY_ITER: u32 = 2;

pub const HMAC_SHA512_SIZE: usize = 64;

/// Windows v4 page size.
pub const V4_PAGE_SIZE: usize = 4096;

/// Windows v4 PBKDF2 rounds for the encryption key.
pub const V4_ITER_COUNT: u32 = 256_000;

pub const V4_VERSION: &str = "Windows v4";
