// src/crypto/kdf.rs

//! Subkey derivation.
//!
//! From the raw 32-byte key and the image salt:
//!
//! ```text
//! enc_key  = PBKDF2-HMAC-SHA512(key, salt, iterations, 32)
//! mac_salt = salt XOR 0x3a
//! mac_key  = PBKDF2-HMAC-SHA512(enc_key, mac_salt, 2, 32)
//! ```
//!
//! Both subkeys live for one encrypt/decrypt operation and are zeroized on
//! drop.

use pbkdf2::pbkdf2;
use zeroize::Zeroize;

use crate::consts::{KEY_SIZE, MAC_KEY_ITER, MAC_SALT_XOR};
use crate::crypto::hmac::HmacSha512;
use crate::error::{DbcryptError, Result};
use crate::utils::xor_bytes;

/// The two subkeys derived from `(key, salt)`.
#[derive(Debug)]
pub struct DerivedKeys {
    enc_key: [u8; KEY_SIZE],
    mac_key: [u8; KEY_SIZE],
}

impl DerivedKeys {
    pub fn enc_key(&self) -> &[u8; KEY_SIZE] {
        &self.enc_key
    }

    pub fn mac_key(&self) -> &[u8; KEY_SIZE] {
        &self.mac_key
    }
}

impl Drop for DerivedKeys {
    fn drop(&mut self) {
        self.enc_key.zeroize();
        self.mac_key.zeroize();
    }
}

/// Derive the encryption and HMAC subkeys.
///
/// `iterations` is the variant's PBKDF2 round count for the encryption key;
/// the HMAC key always uses [`MAC_KEY_ITER`] rounds over the XORed salt.
pub fn derive_keys(key: &[u8], salt: &[u8], iterations: u32) -> Result<DerivedKeys> {
    if iterations == 0 {
        return Err(DbcryptError::Crypto("PBKDF2 iterations must be >= 1".into()));
    }

    let mut enc_key = [0u8; KEY_SIZE];
    pbkdf2::<HmacSha512>(key, salt, iterations, &mut enc_key)
        .map_err(|e| DbcryptError::Crypto(format!("PBKDF2 failed: {e}")))?;

    let mut mac_salt = xor_bytes(salt, MAC_SALT_XOR);
    let mut mac_key = [0u8; KEY_SIZE];
    let derived = pbkdf2::<HmacSha512>(&enc_key, &mac_salt, MAC_KEY_ITER, &mut mac_key)
        .map_err(|e| DbcryptError::Crypto(format!("PBKDF2 failed: {e}")));
    mac_salt.zeroize();
    derived?;

    Ok(DerivedKeys { enc_key, mac_key })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SALT_SIZE;

    const TEST_ITERATIONS: u32 = 16;

    #[test]
    fn derivation_is_deterministic() {
        let key = [0x11u8; KEY_SIZE];
        let salt = [0x22u8; SALT_SIZE];
        let a = derive_keys(&key, &salt, TEST_ITERATIONS).unwrap();
        let b = derive_keys(&key, &salt, TEST_ITERATIONS).unwrap();
        assert_eq!(a.enc_key(), b.enc_key());
        assert_eq!(a.mac_key(), b.mac_key());
    }

    #[test]
    fn salt_changes_both_subkeys() {
        let key = [0x11u8; KEY_SIZE];
        let a = derive_keys(&key, &[0x22u8; SALT_SIZE], TEST_ITERATIONS).unwrap();
        let b = derive_keys(&key, &[0x23u8; SALT_SIZE], TEST_ITERATIONS).unwrap();
        assert_ne!(a.enc_key(), b.enc_key());
        assert_ne!(a.mac_key(), b.mac_key());
    }

    #[test]
    fn mac_key_differs_from_enc_key() {
        let keys = derive_keys(&[0x11u8; KEY_SIZE], &[0x22u8; SALT_SIZE], TEST_ITERATIONS).unwrap();
        assert_ne!(keys.enc_key(), keys.mac_key());
    }

    #[test]
    fn zero_iterations_rejected() {
        let err = derive_keys(&[0u8; KEY_SIZE], &[0u8; SALT_SIZE], 0).unwrap_err();
        assert!(matches!(err, DbcryptError::Crypto(_)));
    }
}
