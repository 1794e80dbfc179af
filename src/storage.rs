//! A flat-file store of users, donations and requests.
//!
//! Each table is a headerless CSV file under the data root; columns are
//! positional and follow the field order of the corresponding domain struct.
//! Tables are append-only and read back as whole-table scans. There is no
//! locking and no corruption detection: the positional scheme is fragile by
//! design and documented rather than hidden.

use std::{
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::domain::{BookRequest, Donation, User};

/// File name of the user table.
pub const USERS_FILE: &str = "users.csv";
/// File name of the donation table.
pub const DONATIONS_FILE: &str = "donations.csv";
/// File name of the request table.
pub const REQUESTS_FILE: &str = "requests.csv";
/// Directory holding uploaded book images, relative to the data root.
pub const IMAGES_DIR: &str = "book_images";

/// A flat-file store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Opens a store at the given data root.
    ///
    /// The root does not have to exist yet; missing tables read as empty and
    /// are created on first append.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Returns the data root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the table files and the image directory if they are missing.
    ///
    /// # Errors
    ///
    /// Returns an error if a file or directory cannot be created.
    pub fn init(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Open {
            path: self.root.clone(),
            source,
        })?;
        for file in [USERS_FILE, DONATIONS_FILE, REQUESTS_FILE] {
            let path = self.root.join(file);
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|source| StoreError::Open { path, source })?;
        }
        let images = self.root.join(IMAGES_DIR);
        fs::create_dir_all(&images).map_err(|source| StoreError::Open {
            path: images,
            source,
        })?;
        Ok(())
    }

    /// Reads every user row, in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the table exists but cannot be parsed.
    pub fn users(&self) -> Result<Vec<User>, StoreError> {
        self.read_all(USERS_FILE)
    }

    /// Reads every donation row, in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the table exists but cannot be parsed.
    pub fn donations(&self) -> Result<Vec<Donation>, StoreError> {
        self.read_all(DONATIONS_FILE)
    }

    /// Reads every request row, in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the table exists but cannot be parsed.
    pub fn requests(&self) -> Result<Vec<BookRequest>, StoreError> {
        self.read_all(REQUESTS_FILE)
    }

    /// Appends one user row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be written.
    pub fn append_user(&self, user: &User) -> Result<(), StoreError> {
        self.append(USERS_FILE, user)
    }

    /// Appends one donation row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be written.
    pub fn append_donation(&self, donation: &Donation) -> Result<(), StoreError> {
        self.append(DONATIONS_FILE, donation)
    }

    /// Appends one request row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be written.
    pub fn append_request(&self, request: &BookRequest) -> Result<(), StoreError> {
        self.append(REQUESTS_FILE, request)
    }

    /// Copies an uploaded book image into the image directory.
    ///
    /// The filename is taken verbatim from the source path; uploading a file
    /// with the same name overwrites the previous copy. Returns the stored
    /// path relative to the data root.
    ///
    /// # Errors
    ///
    /// Returns an error if the source has no file name or the copy fails.
    pub fn save_image(&self, source: &Path) -> Result<String, StoreError> {
        let name = source
            .file_name()
            .ok_or_else(|| StoreError::ImageName(source.to_path_buf()))?;

        let dir = self.root.join(IMAGES_DIR);
        fs::create_dir_all(&dir).map_err(|e| StoreError::Image {
            path: dir.clone(),
            source: e,
        })?;

        let destination = dir.join(name);
        fs::copy(source, &destination).map_err(|e| StoreError::Image {
            path: destination.clone(),
            source: e,
        })?;

        tracing::debug!("Stored image at {}", destination.display());

        let relative = PathBuf::from(IMAGES_DIR).join(name);
        Ok(relative.to_string_lossy().into_owned())
    }

    fn read_all<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, StoreError> {
        let path = self.root.join(file);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .map_err(|source| StoreError::Read {
                path: path.clone(),
                source,
            })?;

        reader
            .deserialize()
            .map(|row| {
                row.map_err(|source| StoreError::Read {
                    path: path.clone(),
                    source,
                })
            })
            .collect()
    }

    fn append<T: Serialize>(&self, file: &str, record: &T) -> Result<(), StoreError> {
        let path = self.root.join(file);
        let handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| StoreError::Open {
                path: path.clone(),
                source,
            })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(handle);
        writer
            .serialize(record)
            .and_then(|()| writer.flush().map_err(csv::Error::from))
            .map_err(|source| StoreError::Write { path, source })
    }
}

/// Errors reading or writing the flat-file tables.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A table exists but could not be parsed with its positional schema.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The table file.
        path: PathBuf,
        /// The underlying CSV or IO error.
        source: csv::Error,
    },

    /// A row could not be appended to a table.
    #[error("failed to append to {path}: {source}")]
    Write {
        /// The table file.
        path: PathBuf,
        /// The underlying CSV or IO error.
        source: csv::Error,
    },

    /// A table file or directory could not be opened or created.
    #[error("failed to open {path}: {source}")]
    Open {
        /// The offending path.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },

    /// A book image could not be copied into the image directory.
    #[error("failed to store image at {path}: {source}")]
    Image {
        /// The destination path.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },

    /// The supplied image path does not name a file.
    #[error("image path {0} has no file name")]
    ImageName(PathBuf),
}
