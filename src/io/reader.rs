//! Byte reading for image inputs.
//!
//! Small files are read straight into memory; anything at or above
//! [`MMAP_THRESHOLD`] is memory-mapped and handed to the decoder in place.

// Memory mapping requires unsafe; the map is read-only
#![allow(unsafe_code)]

use crate::error::{IoError, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::ops::Deref;
use std::path::Path;

/// Threshold for using memory mapping (4MB).
pub const MMAP_THRESHOLD: u64 = 4 * 1024 * 1024;

/// Maximum input size accepted (512MB).
const MAX_FILE_SIZE: u64 = 512 * 1024 * 1024;

/// Contents of an input file, either owned or memory-mapped.
///
/// Dereferences to `[u8]`, so it can be passed wherever a byte slice is
/// expected without copying the mapping.
pub enum InputBytes {
    /// Read into a heap buffer.
    Owned(Vec<u8>),
    /// Read-only memory map of the file.
    Mapped(Mmap),
}

impl InputBytes {
    /// Returns true if the contents are memory-mapped.
    #[must_use]
    pub const fn is_mapped(&self) -> bool {
        matches!(self, Self::Mapped(_))
    }
}

impl Deref for InputBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Self::Owned(buffer) => buffer,
            Self::Mapped(mmap) => mmap,
        }
    }
}

impl AsRef<[u8]> for InputBytes {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

/// Reader for a single input image file.
///
/// # Examples
///
/// ```no_run
/// use cutscale::io::FileReader;
///
/// let reader = FileReader::open("photo.jpg").unwrap();
/// let bytes = reader.read_to_bytes().unwrap();
/// let image = image::load_from_memory(&bytes).unwrap();
/// ```
pub struct FileReader {
    file: File,
    size: u64,
    path: String,
}

impl FileReader {
    /// Opens a file for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist, can't be opened, or is
    /// larger than the input limit.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy().to_string();

        if !path_ref.exists() {
            return Err(IoError::FileNotFound { path: path_str }.into());
        }

        let file = File::open(path_ref).map_err(|e| IoError::ReadFailed {
            path: path_str.clone(),
            reason: e.to_string(),
        })?;

        let size = file
            .metadata()
            .map_err(|e| IoError::ReadFailed {
                path: path_str.clone(),
                reason: e.to_string(),
            })?
            .len();

        if size > MAX_FILE_SIZE {
            return Err(IoError::ReadFailed {
                path: path_str,
                reason: format!("file too large: {size} bytes (max: {MAX_FILE_SIZE} bytes)"),
            }
            .into());
        }

        Ok(Self {
            file,
            size,
            path: path_str,
        })
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Reads the whole file.
    ///
    /// Files at or above [`MMAP_THRESHOLD`] are mapped rather than copied.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or mapping fails.
    pub fn read_to_bytes(self) -> Result<InputBytes> {
        if self.size >= MMAP_THRESHOLD {
            self.map_bytes()
        } else {
            self.read_direct_bytes()
        }
    }

    fn map_bytes(self) -> Result<InputBytes> {
        // Safety: read-only map; callers only read through the slice
        let mmap = unsafe {
            Mmap::map(&self.file).map_err(|e| IoError::MmapFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?
        };

        Ok(InputBytes::Mapped(mmap))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn read_direct_bytes(mut self) -> Result<InputBytes> {
        let mut buffer = Vec::with_capacity(self.size as usize);
        self.file
            .read_to_end(&mut buffer)
            .map_err(|e| IoError::ReadFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        Ok(InputBytes::Owned(buffer))
    }
}

/// Reads all bytes of a file, mapping large ones.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the path does not exist, or a read
/// error if the file cannot be read.
pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<InputBytes> {
    FileReader::open(path)?.read_to_bytes()
}
