// src/error.rs

//! Error types.
//!
//! Every operation returns [`Result<T, DbcryptError>`](DbcryptError). All
//! errors abort the current operation; the codec is deterministic given its
//! inputs, so nothing is retried.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, DbcryptError>;

/// The error type for all codec operations.
#[derive(Error, Debug)]
pub enum DbcryptError {
    /// The user-supplied key was not valid hexadecimal.
    #[error("failed to decode hex key: {0}")]
    KeyDecode(#[from] hex::FromHexError),

    /// The decoded key has the wrong length.
    #[error("invalid key length: expected {expected} bytes, got {got}")]
    KeyLength { expected: usize, got: usize },

    /// Page 1's HMAC does not match under the derived keys.
    #[error("key does not match this database")]
    KeyMismatch,

    /// A page's HMAC failed verification during decryption. Fatal; pages are
    /// never skipped.
    #[error("page {page} failed HMAC verification")]
    HashVerificationFailed { page: u64 },

    /// Encryption input does not start with the SQLite signature.
    #[error("input does not start with a valid SQLite header")]
    InvalidHeader,

    /// An "encrypted" input already carries the plaintext SQLite signature.
    #[error("database is already decrypted")]
    AlreadyDecrypted,

    /// Page length, reserve, or alignment violation. Indicates a caller bug,
    /// not a property of the input file.
    #[error("invalid page shape: {0}")]
    InvalidPageShape(String),

    #[error("failed to open {}: {source}", path.display())]
    OpenFailed { path: PathBuf, source: io::Error },

    #[error("failed to stat {}: {source}", path.display())]
    StatFailed { path: PathBuf, source: io::Error },

    #[error("failed to read {}: {source}", path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    /// The first page could not be read in full.
    #[error("incomplete read: {0}")]
    IncompleteRead(String),

    #[error("failed to write output: {0}")]
    WriteFailed(#[source] io::Error),

    /// The `(platform, version)` pair is not recognized by the registry.
    #[error("unsupported platform: {platform} v{version}")]
    PlatformUnsupported { platform: String, version: u32 },

    /// The cancellation handle was signalled between pages. Partial output
    /// may have been written; the caller discards it.
    #[error("operation cancelled")]
    Cancelled,

    /// A cryptographic primitive failed (infrastructure error).
    #[error("crypto error: {0}")]
    Crypto(String),
}
