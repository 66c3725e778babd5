// src/page.rs

//! Stateless primitives over a single page buffer.
//!
//! Every encrypted page is laid out as:
//!
//! ```text
//! [0, off)                    salt (page 0 only, off = 16)
//! [off, data_end)             AES-256-CBC ciphertext
//! [data_end, data_end + 16)   IV
//! [data_end + 16, .. + tag)   HMAC tag
//! [.., page_size)             zero pad
//! ```
//!
//! where `data_end = page_size - reserve`. The HMAC covers the page from
//! `off` through the IV, followed by the little-endian one-based page
//! number, so pages cannot be transplanted between slots.
//!
//! The primitives are generic over the MAC (`M: Mac + KeyInit`), the same
//! shape the `pbkdf2` crate uses for its PRF; the v4 codec instantiates
//! them with [`HmacSha512`](crate::crypto::hmac::HmacSha512).

use hmac::digest::KeyInit;
use hmac::Mac;

use crate::consts::{AES_BLOCK_SIZE, IV_SIZE, SALT_SIZE};
use crate::crypto::cbc;
use crate::error::{DbcryptError, Result};

/// Size arithmetic for one page-format variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageLayout {
    page_size: usize,
    reserve: usize,
    hmac_size: usize,
}

impl PageLayout {
    /// Build a layout from the page size and the stored tag width. The
    /// reserve is the smallest multiple of the AES block size covering
    /// IV + tag.
    pub fn new(page_size: usize, hmac_size: usize) -> Self {
        let mut reserve = IV_SIZE + hmac_size;
        if reserve % AES_BLOCK_SIZE != 0 {
            reserve = (reserve / AES_BLOCK_SIZE + 1) * AES_BLOCK_SIZE;
        }
        Self {
            page_size,
            reserve,
            hmac_size,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn reserve(&self) -> usize {
        self.reserve
    }

    pub fn hmac_size(&self) -> usize {
        self.hmac_size
    }

    /// Offset of the reserve region; also where the IV starts.
    pub fn data_end(&self) -> usize {
        self.page_size - self.reserve
    }

    /// Offset of the stored HMAC tag.
    pub fn mac_start(&self) -> usize {
        self.data_end() + IV_SIZE
    }
}

/// Leading bytes of a page that do not belong to the cipher region: the
/// salt on page 0, nothing elsewhere.
pub fn page_offset(page_no: u64) -> usize {
    if page_no == 0 {
        SALT_SIZE
    } else {
        0
    }
}

/// MAC over `page[offset .. mac_start]` followed by the one-based page
/// number as a little-endian u32.
fn page_mac<M>(page: &[u8], mac_key: &[u8], offset: usize, page_no: u64, layout: &PageLayout) -> Result<M>
where
    M: Mac + KeyInit,
{
    let mut mac = <M as Mac>::new_from_slice(mac_key)
        .map_err(|e| DbcryptError::Crypto(format!("invalid HMAC key: {e}")))?;
    mac.update(&page[offset..layout.mac_start()]);
    mac.update(&((page_no + 1) as u32).to_le_bytes());
    Ok(mac)
}

/// Check a page's stored tag against a recomputation under `mac_key`.
///
/// The comparison is constant-time and uses the leading `hmac_size` bytes
/// of the raw MAC when the hash output is wider than the stored tag.
pub fn verify_page_mac<M>(page: &[u8], mac_key: &[u8], page_no: u64, layout: &PageLayout) -> bool
where
    M: Mac + KeyInit,
{
    if page.len() != layout.page_size() {
        return false;
    }
    let offset = page_offset(page_no);
    match page_mac::<M>(page, mac_key, offset, page_no, layout) {
        Ok(mac) => mac
            .verify_truncated_left(&page[layout.mac_start()..layout.mac_start() + layout.hmac_size()])
            .is_ok(),
        Err(_) => false,
    }
}

/// Decrypt one page.
///
/// Verifies the stored HMAC first, then CBC-decrypts the cipher region with
/// the IV taken from the reserve. The returned buffer is the decrypted
/// region followed by the reserve bytes unchanged; for page 0 the leading
/// salt bytes are not part of the result.
pub fn decrypt_page<M>(
    page: &[u8],
    enc_key: &[u8; 32],
    mac_key: &[u8; 32],
    page_no: u64,
    layout: &PageLayout,
) -> Result<Vec<u8>>
where
    M: Mac + KeyInit,
{
    if page.len() != layout.page_size() {
        return Err(DbcryptError::InvalidPageShape(format!(
            "encrypted page size {} for page {page_no}, expected {}",
            page.len(),
            layout.page_size()
        )));
    }

    let offset = page_offset(page_no);
    let mac = page_mac::<M>(page, mac_key, offset, page_no, layout)?;
    mac.verify_truncated_left(&page[layout.mac_start()..layout.mac_start() + layout.hmac_size()])
        .map_err(|_| DbcryptError::HashVerificationFailed { page: page_no })?;

    let mut iv = [0u8; IV_SIZE];
    iv.copy_from_slice(&page[layout.data_end()..layout.data_end() + IV_SIZE]);

    let mut plain = Vec::with_capacity(layout.page_size() - offset);
    plain.extend_from_slice(&page[offset..layout.data_end()]);
    cbc::decrypt_in_place(enc_key, &iv, &mut plain)?;
    plain.extend_from_slice(&page[layout.data_end()..]);
    Ok(plain)
}

/// Encrypt one page.
///
/// `plain_page` must be a full page, or, for page 0 only, a page without
/// its leading salt bytes (the output's first 16 bytes are then left zeroed
/// for the caller to fill). Its last `reserve` bytes carry the chosen IV
/// followed by zeros; they are copied into the output before the tag is
/// written over them.
pub fn encrypt_page<M>(
    plain_page: &[u8],
    enc_key: &[u8; 32],
    mac_key: &[u8; 32],
    page_no: u64,
    layout: &PageLayout,
) -> Result<Vec<u8>>
where
    M: Mac + KeyInit,
{
    let offset = page_offset(page_no);

    let (salt, payload) = if page_no == 0 {
        if plain_page.len() == layout.page_size() {
            (Some(&plain_page[..SALT_SIZE]), &plain_page[SALT_SIZE..])
        } else if plain_page.len() == layout.page_size() - SALT_SIZE {
            (None, plain_page)
        } else {
            return Err(DbcryptError::InvalidPageShape(format!(
                "plain page size {} for page {page_no}",
                plain_page.len()
            )));
        }
    } else if plain_page.len() == layout.page_size() {
        (None, plain_page)
    } else {
        return Err(DbcryptError::InvalidPageShape(format!(
            "plain page size {} for page {page_no}",
            plain_page.len()
        )));
    };

    if payload.len() < layout.reserve() {
        return Err(DbcryptError::InvalidPageShape(format!(
            "plain page size {} smaller than reserve {} for page {page_no}",
            payload.len(),
            layout.reserve()
        )));
    }
    let data_len = payload.len() - layout.reserve();
    if data_len % AES_BLOCK_SIZE != 0 {
        return Err(DbcryptError::InvalidPageShape(format!(
            "plain data length {data_len} for page {page_no}"
        )));
    }
    if layout.reserve() < IV_SIZE + layout.hmac_size() {
        return Err(DbcryptError::InvalidPageShape(format!(
            "reserve {} too small for IV({IV_SIZE}) and HMAC({})",
            layout.reserve(),
            layout.hmac_size()
        )));
    }

    let tail = &payload[data_len..];
    let mut iv = [0u8; IV_SIZE];
    iv.copy_from_slice(&tail[..IV_SIZE]);

    let mut page_out = vec![0u8; layout.page_size()];
    if let Some(salt) = salt {
        page_out[..SALT_SIZE].copy_from_slice(salt);
    }
    page_out[offset..offset + data_len].copy_from_slice(&payload[..data_len]);
    cbc::encrypt_in_place(enc_key, &iv, &mut page_out[offset..offset + data_len])?;
    page_out[layout.data_end()..].copy_from_slice(tail);

    let mac = page_mac::<M>(&page_out, mac_key, offset, page_no, layout)?;
    let tag = mac.finalize().into_bytes();
    let tag = tag.as_slice();
    if tag.len() < layout.hmac_size() {
        return Err(DbcryptError::Crypto(format!(
            "HMAC output {} shorter than stored tag width {}",
            tag.len(),
            layout.hmac_size()
        )));
    }
    page_out[layout.mac_start()..layout.mac_start() + layout.hmac_size()]
        .copy_from_slice(&tag[..layout.hmac_size()]);

    Ok(page_out)
}
