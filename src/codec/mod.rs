// src/codec/mod.rs

//! The codec operation surface and the `(platform, version)` registry.

pub mod windows;

use std::io::Write;
use std::path::Path;

use zeroize::Zeroizing;

use crate::cancel::CancelToken;
use crate::consts::KEY_SIZE;
use crate::error::{DbcryptError, Result};

use crate::codec::windows::v4::V4Codec;

/// One concrete page-format variant.
///
/// `encrypt` and `decrypt` stream the input file page by page into `output`
/// in strict page order. The sink is owned by the caller; it is neither
/// flushed nor closed here, and on error (including [`DbcryptError::Cancelled`])
/// partial output may have been written.
pub trait Codec: Send + Sync + std::fmt::Debug {
    /// Transform a plaintext database image into an encrypted image.
    fn encrypt(
        &self,
        cancel: &CancelToken,
        plain_path: &Path,
        hex_key: &str,
        output: &mut dyn Write,
    ) -> Result<()>;

    /// Transform an encrypted database image back into plaintext.
    fn decrypt(
        &self,
        cancel: &CancelToken,
        db_path: &Path,
        hex_key: &str,
        output: &mut dyn Write,
    ) -> Result<()>;

    fn page_size(&self) -> usize;

    fn reserve(&self) -> usize;

    fn hmac_size(&self) -> usize;

    /// Human-readable variant label, e.g. `"Windows v4"`.
    fn version(&self) -> &str;
}

/// Look up the codec registered for a `(platform, version)` pair.
///
/// Only `("windows", 4)` is currently recognized.
pub fn new_codec(platform: &str, version: u32) -> Result<Box<dyn Codec>> {
    match (platform, version) {
        ("windows", 4) => Ok(Box::new(V4Codec::new())),
        _ => Err(DbcryptError::PlatformUnsupported {
            platform: platform.to_string(),
            version,
        }),
    }
}

/// Decode and length-check a user-supplied hex key.
pub(crate) fn decode_key(hex_key: &str) -> Result<Zeroizing<Vec<u8>>> {
    let key = hex::decode(hex_key)?;
    if key.len() != KEY_SIZE {
        return Err(DbcryptError::KeyLength {
            expected: KEY_SIZE,
            got: key.len(),
        });
    }
    Ok(Zeroizing::new(key))
}
