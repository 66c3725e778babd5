// src/lib.rs

//! Page-oriented codec for encrypted SQLite database images.
//!
//! Converts between plaintext SQLite images (the `"SQLite format 3\0"`
//! signature) and the encrypted page format used by the Windows v4 variant:
//! PBKDF2-derived subkeys from a per-image salt, AES-256-CBC per page with
//! a random IV, and an HMAC-SHA512 tag binding each page to its page
//! number. All-zero pages pass through both directions untouched.
//!
//! ```no_run
//! use dbcrypt_rs::{new_codec, CancelToken};
//! use std::path::Path;
//!
//! # fn main() -> dbcrypt_rs::Result<()> {
//! let codec = new_codec("windows", 4)?;
//! let mut out = Vec::new();
//! codec.decrypt(
//!     &CancelToken::new(),
//!     Path::new("message_0.db"),
//!     "a1b2...",
//!     &mut out,
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod codec;
pub mod consts;
pub mod crypto;
pub mod error;
pub mod image;
pub mod page;
pub mod utils;

// High-level API.
pub use cancel::CancelToken;
pub use codec::windows::v4::V4Codec;
pub use codec::{new_codec, Codec};
pub use error::{DbcryptError, Result};
pub use image::DbImage;
