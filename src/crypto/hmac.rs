// src/crypto/hmac.rs

//! HMAC-SHA primitives (re-exports from `hmac` + `sha2`).
//!
//! The v4 variant authenticates pages with `HmacSha512`; other variants can
//! instantiate the page primitives with any digest.

use hmac::Hmac;
use sha2::Sha512;

pub type HmacSha512 = Hmac<Sha512>;
