// src/crypto/cbc.rs

//! AES-256-CBC over block-aligned page regions, without padding.
//!
//! The cipher region of a page is always a whole number of AES blocks, so
//! chaining is done directly over the `aes` block cipher.

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes256Dec, Aes256Enc, Block};

use crate::consts::{AES_BLOCK_SIZE, IV_SIZE, KEY_SIZE};
use crate::error::{DbcryptError, Result};
use crate::utils::xor_blocks;

fn check_aligned(len: usize) -> Result<()> {
    if len % AES_BLOCK_SIZE != 0 {
        return Err(DbcryptError::Crypto(format!(
            "cipher region length {len} is not a multiple of the AES block size"
        )));
    }
    Ok(())
}

/// CBC-encrypt `data` in place under `key` with `iv`.
pub fn encrypt_in_place(key: &[u8; KEY_SIZE], iv: &[u8; IV_SIZE], data: &mut [u8]) -> Result<()> {
    check_aligned(data.len())?;
    let cipher = Aes256Enc::new(key.into());

    let mut prev = *iv;
    let mut xored = [0u8; AES_BLOCK_SIZE];
    for chunk in data.chunks_exact_mut(AES_BLOCK_SIZE) {
        xor_blocks(chunk, &prev, &mut xored);
        let mut block = Block::from(xored);
        cipher.encrypt_block(&mut block);
        chunk.copy_from_slice(block.as_slice());
        prev.copy_from_slice(chunk);
    }
    Ok(())
}

/// CBC-decrypt `data` in place under `key` with `iv`.
pub fn decrypt_in_place(key: &[u8; KEY_SIZE], iv: &[u8; IV_SIZE], data: &mut [u8]) -> Result<()> {
    check_aligned(data.len())?;
    let cipher = Aes256Dec::new(key.into());

    let mut prev = *iv;
    let mut ciphertext = [0u8; AES_BLOCK_SIZE];
    for chunk in data.chunks_exact_mut(AES_BLOCK_SIZE) {
        ciphertext.copy_from_slice(chunk);
        let mut block = Block::from(ciphertext);
        cipher.decrypt_block(&mut block);
        xor_blocks(block.as_slice(), &prev, chunk);
        prev = ciphertext;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; KEY_SIZE] = [0x42; KEY_SIZE];
    const IV: [u8; IV_SIZE] = [0x11; IV_SIZE];

    #[test]
    fn roundtrip_multiple_blocks() {
        let plain: Vec<u8> = (0..64u8).collect();
        let mut buf = plain.clone();
        encrypt_in_place(&KEY, &IV, &mut buf).unwrap();
        assert_ne!(buf, plain);
        decrypt_in_place(&KEY, &IV, &mut buf).unwrap();
        assert_eq!(buf, plain);
    }

    #[test]
    fn chaining_hides_repeated_blocks() {
        // Two identical plaintext blocks must produce distinct ciphertext
        // blocks, unlike ECB.
        let mut buf = [0x77u8; 32];
        encrypt_in_place(&KEY, &IV, &mut buf).unwrap();
        assert_ne!(buf[..16], buf[16..]);
    }

    #[test]
    fn iv_affects_first_block() {
        let mut a = [0x55u8; 16];
        let mut b = [0x55u8; 16];
        encrypt_in_place(&KEY, &IV, &mut a).unwrap();
        encrypt_in_place(&KEY, &[0x12; IV_SIZE], &mut b).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn unaligned_region_rejected() {
        let mut buf = [0u8; 15];
        assert!(encrypt_in_place(&KEY, &IV, &mut buf).is_err());
        assert!(decrypt_in_place(&KEY, &IV, &mut buf).is_err());
    }

    #[test]
    fn empty_region_is_a_noop() {
        let mut buf = [0u8; 0];
        encrypt_in_place(&KEY, &IV, &mut buf).unwrap();
        decrypt_in_place(&KEY, &IV, &mut buf).unwrap();
    }
}
