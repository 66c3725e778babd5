// src/codec/windows/v4.rs

//! The "Windows v4" codec: 4096-byte pages, PBKDF2-HMAC-SHA512 with
//! 256 000 rounds for the encryption key, and a 64-byte HMAC-SHA512 tag
//! per page.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::{debug, warn};

use crate::cancel::CancelToken;
use crate::codec::{decode_key, Codec};
use crate::consts::{
    HMAC_SHA512_SIZE, IV_SIZE, KEY_SIZE, SALT_SIZE, SQLITE_HEADER, V4_ITER_COUNT, V4_PAGE_SIZE,
    V4_VERSION,
};
use crate::crypto::hmac::HmacSha512;
use crate::crypto::kdf::{self, DerivedKeys};
use crate::crypto::rng;
use crate::error::{DbcryptError, Result};
use crate::image::DbImage;
use crate::page::{self, PageLayout};
use crate::utils::{is_all_zero, read_full};

/// Parameter record and codec implementation for the Windows v4 variant.
#[derive(Clone, Copy, Debug)]
pub struct V4Codec {
    iter_count: u32,
    layout: PageLayout,
    version: &'static str,
}

impl V4Codec {
    pub fn new() -> Self {
        Self {
            iter_count: V4_ITER_COUNT,
            layout: PageLayout::new(V4_PAGE_SIZE, HMAC_SHA512_SIZE),
            version: V4_VERSION,
        }
    }

    pub fn iter_count(&self) -> u32 {
        self.iter_count
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Derive the encryption and HMAC subkeys for this variant.
    pub fn derive_keys(&self, key: &[u8], salt: &[u8]) -> Result<DerivedKeys> {
        kdf::derive_keys(key, salt, self.iter_count)
    }

    /// Check a candidate raw key against page 1 of an encrypted image
    /// without decrypting anything.
    pub fn validate_key(&self, page1: &[u8], key: &[u8], salt: &[u8]) -> bool {
        if key.len() != KEY_SIZE {
            return false;
        }
        match self.derive_keys(key, salt) {
            Ok(keys) => page::verify_page_mac::<HmacSha512>(page1, keys.mac_key(), 0, &self.layout),
            Err(_) => false,
        }
    }

    fn read_failed(&self, path: &Path, source: io::Error) -> DbcryptError {
        DbcryptError::ReadFailed {
            path: path.to_path_buf(),
            source,
        }
    }

    fn short_page(&self, path: &Path, page_no: u64, got: usize) -> DbcryptError {
        self.read_failed(
            path,
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "page {page_no} is {got} bytes, expected {}",
                    self.layout.page_size()
                ),
            ),
        )
    }
}

impl Default for V4Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for V4Codec {
    fn encrypt(
        &self,
        cancel: &CancelToken,
        plain_path: &Path,
        hex_key: &str,
        output: &mut dyn Write,
    ) -> Result<()> {
        let key = decode_key(hex_key)?;
        let page_size = self.layout.page_size();
        let reserve = self.layout.reserve();

        let mut plain_file = File::open(plain_path).map_err(|source| DbcryptError::OpenFailed {
            path: plain_path.to_path_buf(),
            source,
        })?;

        let mut header = [0u8; SQLITE_HEADER.len()];
        plain_file
            .read_exact(&mut header)
            .map_err(|e| self.read_failed(plain_path, e))?;
        if header != *SQLITE_HEADER {
            return Err(DbcryptError::InvalidHeader);
        }

        // Rest of page 0; a shorter file is zero-filled to a full page.
        let mut first_payload = vec![0u8; page_size - SQLITE_HEADER.len()];
        read_full(&mut plain_file, &mut first_payload)
            .map_err(|e| self.read_failed(plain_path, e))?;

        let mut salt = [0u8; SALT_SIZE];
        rng::fill_random(&mut salt)?;
        let keys = self.derive_keys(&key, &salt)?;

        debug!(
            "encrypting {} with a fresh salt ({page_size}-byte pages)",
            plain_path.display()
        );

        // Page 0 plaintext is the salt followed by the payload; its reserve
        // tail is replaced by a random IV and zeros before encryption.
        let mut first_plain = vec![0u8; SALT_SIZE + first_payload.len()];
        first_plain[..SALT_SIZE].copy_from_slice(&salt);
        first_plain[SALT_SIZE..].copy_from_slice(&first_payload);
        let tail_start = first_plain.len() - reserve;
        first_plain[tail_start..].fill(0);
        rng::fill_random(&mut first_plain[tail_start..tail_start + IV_SIZE])?;

        let encrypted = page::encrypt_page::<HmacSha512>(
            &first_plain,
            keys.enc_key(),
            keys.mac_key(),
            0,
            &self.layout,
        )?;
        output
            .write_all(&encrypted)
            .map_err(DbcryptError::WriteFailed)?;

        let mut page_buf = vec![0u8; page_size];
        let mut pages_written: u64 = 1;
        for page_no in 1u64.. {
            cancel.check()?;

            let n = read_full(&mut plain_file, &mut page_buf)
                .map_err(|e| self.read_failed(plain_path, e))?;
            if n == 0 {
                break;
            }
            let at_eof = n < page_size;
            if at_eof {
                page_buf[n..].fill(0);
            }

            // Unallocated pages pass through untouched.
            if is_all_zero(&page_buf) {
                output
                    .write_all(&page_buf)
                    .map_err(DbcryptError::WriteFailed)?;
                pages_written += 1;
                if at_eof {
                    break;
                }
                continue;
            }

            let tail_start = page_size - reserve;
            page_buf[tail_start..].fill(0);
            rng::fill_random(&mut page_buf[tail_start..tail_start + IV_SIZE])?;

            let encrypted = page::encrypt_page::<HmacSha512>(
                &page_buf,
                keys.enc_key(),
                keys.mac_key(),
                page_no,
                &self.layout,
            )?;
            output
                .write_all(&encrypted)
                .map_err(DbcryptError::WriteFailed)?;
            pages_written += 1;

            if at_eof {
                break;
            }
        }

        debug!(
            "encrypted {pages_written} pages from {}",
            plain_path.display()
        );
        Ok(())
    }

    fn decrypt(
        &self,
        cancel: &CancelToken,
        db_path: &Path,
        hex_key: &str,
        output: &mut dyn Write,
    ) -> Result<()> {
        let key = decode_key(hex_key)?;
        let page_size = self.layout.page_size();

        let image = DbImage::open(db_path, page_size)?;
        let keys = self.derive_keys(&key, image.salt())?;

        if !page::verify_page_mac::<HmacSha512>(image.first_page(), keys.mac_key(), 0, &self.layout)
        {
            warn!("key validation failed for {}", db_path.display());
            return Err(DbcryptError::KeyMismatch);
        }

        debug!(
            "decrypting {} ({} pages)",
            db_path.display(),
            image.total_pages()
        );

        output
            .write_all(SQLITE_HEADER)
            .map_err(DbcryptError::WriteFailed)?;

        // The decrypted first page replaces its salt with the header just
        // written; its reserve bytes keep the on-disk IV/HMAC/pad, which
        // the database treats as unused space.
        let first = page::decrypt_page::<HmacSha512>(
            image.first_page(),
            keys.enc_key(),
            keys.mac_key(),
            0,
            &self.layout,
        )?;
        output.write_all(&first).map_err(DbcryptError::WriteFailed)?;

        let mut db_file = File::open(db_path).map_err(|source| DbcryptError::OpenFailed {
            path: db_path.to_path_buf(),
            source,
        })?;
        db_file
            .seek(SeekFrom::Start(page_size as u64))
            .map_err(|e| self.read_failed(db_path, e))?;

        let mut page_buf = vec![0u8; page_size];
        for page_no in 1..image.total_pages() {
            cancel.check()?;

            let n = read_full(&mut db_file, &mut page_buf)
                .map_err(|e| self.read_failed(db_path, e))?;
            if n == 0 {
                break;
            }
            if n < page_size {
                return Err(self.short_page(db_path, page_no, n));
            }

            if is_all_zero(&page_buf) {
                output
                    .write_all(&page_buf)
                    .map_err(DbcryptError::WriteFailed)?;
                continue;
            }

            let plain = page::decrypt_page::<HmacSha512>(
                &page_buf,
                keys.enc_key(),
                keys.mac_key(),
                page_no,
                &self.layout,
            )?;
            output.write_all(&plain).map_err(DbcryptError::WriteFailed)?;
        }

        debug!(
            "decrypted {} pages from {}",
            image.total_pages(),
            db_path.display()
        );
        Ok(())
    }

    fn page_size(&self) -> usize {
        self.layout.page_size()
    }

    fn reserve(&self) -> usize {
        self.layout.reserve()
    }

    fn hmac_size(&self) -> usize {
        self.layout.hmac_size()
    }

    fn version(&self) -> &str {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v4_parameters() {
        let codec = V4Codec::new();
        assert_eq!(codec.page_size(), 4096);
        assert_eq!(codec.reserve(), 80);
        assert_eq!(codec.hmac_size(), 64);
        assert_eq!(codec.iter_count(), 256_000);
        assert_eq!(codec.version(), "Windows v4");
    }

    #[test]
    fn validate_key_rejects_wrong_length_key() {
        let codec = V4Codec::new();
        let page1 = vec![0u8; codec.page_size()];
        assert!(!codec.validate_key(&page1, &[0x11; 16], &page1[..SALT_SIZE]));
    }
}
