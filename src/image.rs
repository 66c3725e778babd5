// src/image.rs

//! Opening an encrypted database image.
//!
//! The opener stats the file, reads the first page, pulls the salt out of
//! its leading bytes and refuses inputs that already carry the plaintext
//! SQLite signature.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::consts::{SALT_SIZE, SQLITE_HEADER};
use crate::error::{DbcryptError, Result};

/// An encrypted image that has been opened and sniffed, but not decrypted.
#[derive(Debug)]
pub struct DbImage {
    path: PathBuf,
    salt: [u8; SALT_SIZE],
    total_pages: u64,
    first_page: Vec<u8>,
}

impl DbImage {
    /// Open `path` and read its first page.
    ///
    /// The page count is the file size divided by `page_size`, rounded up.
    /// Inputs whose first bytes match the ASCII prefix of the SQLite
    /// signature fail with [`DbcryptError::AlreadyDecrypted`]; the trailing
    /// NUL is excluded so a plaintext image is still detected when a writer
    /// omitted the final byte.
    pub fn open(path: &Path, page_size: usize) -> Result<Self> {
        let mut file = File::open(path).map_err(|source| DbcryptError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let metadata = file.metadata().map_err(|source| DbcryptError::StatFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let total_pages = metadata.len().div_ceil(page_size as u64);

        let mut first_page = vec![0u8; page_size];
        file.read_exact(&mut first_page).map_err(|source| {
            if source.kind() == io::ErrorKind::UnexpectedEof {
                DbcryptError::IncompleteRead(format!(
                    "{} is shorter than one page ({page_size} bytes)",
                    path.display()
                ))
            } else {
                DbcryptError::ReadFailed {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let prefix = SQLITE_HEADER.len() - 1;
        if first_page[..prefix] == SQLITE_HEADER[..prefix] {
            return Err(DbcryptError::AlreadyDecrypted);
        }

        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(&first_page[..SALT_SIZE]);

        Ok(Self {
            path: path.to_path_buf(),
            salt,
            total_pages,
            first_page,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn salt(&self) -> &[u8; SALT_SIZE] {
        &self.salt
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn first_page(&self) -> &[u8] {
        &self.first_page
    }
}
