//! Flat big-endian `f32` field files.
//!
//! MITgcm writes every grid descriptor and snapshot as a headerless,
//! row-major array of big-endian IEEE single-precision floats. There is no
//! metadata in the file, so the caller states the shape and every access here
//! checks the byte length against it before touching the data.
//!
//! Two access paths are provided:
//! - [`read_be_f32`] / [`read_be_f32_prefix`]: eager reads for small grid
//!   descriptors (vertical profiles, masks).
//! - [`MappedField`]: a read-only memory map for snapshots that may be
//!   gigabytes in size. The map is released when the value is dropped or
//!   [`MappedField::close`] is called.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use thiserror::Error;

/// Size in bytes of one stored element (`>f4`).
pub const ELEMENT_SIZE: usize = 4;

/// Error type for binary field access.
#[derive(Debug, Error)]
pub enum BinaryFileError {
    /// Underlying I/O failure
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File length disagrees with the declared shape
    #[error(
        "{}: shape {shape:?} needs {expected_bytes} bytes but file has {actual_bytes}",
        .path.display()
    )]
    ShapeMismatch {
        path: PathBuf,
        shape: Vec<usize>,
        expected_bytes: u64,
        actual_bytes: u64,
    },

    /// Declared shape holds zero elements
    #[error("{}: shape {shape:?} has no elements", .path.display())]
    EmptyShape { path: PathBuf, shape: Vec<usize> },
}

impl BinaryFileError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[inline]
fn decode(bytes: &[u8]) -> f32 {
    f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn decode_all(bytes: &[u8]) -> Vec<f32> {
    bytes.chunks_exact(ELEMENT_SIZE).map(decode).collect()
}

fn file_len(path: &Path, file: &File) -> Result<u64, BinaryFileError> {
    file.metadata()
        .map(|m| m.len())
        .map_err(|e| BinaryFileError::io(path, e))
}

/// Read a whole file holding exactly `expected_len` values.
///
/// # Errors
/// `ShapeMismatch` if the file is not exactly `expected_len * 4` bytes.
pub fn read_be_f32(path: &Path, expected_len: usize) -> Result<Vec<f32>, BinaryFileError> {
    let mut file = File::open(path).map_err(|e| BinaryFileError::io(path, e))?;
    let actual = file_len(path, &file)?;
    let expected = (expected_len * ELEMENT_SIZE) as u64;
    if actual != expected {
        return Err(BinaryFileError::ShapeMismatch {
            path: path.to_path_buf(),
            shape: vec![expected_len],
            expected_bytes: expected,
            actual_bytes: actual,
        });
    }

    let mut bytes = Vec::with_capacity(expected as usize);
    file.read_to_end(&mut bytes)
        .map_err(|e| BinaryFileError::io(path, e))?;
    Ok(decode_all(&bytes))
}

/// Read the first `len` values of a profile file that may hold more.
///
/// Global vertical profiles (`RC.data`, `DRF.data`) cover every model level;
/// a region only uses the top `Nz` of them.
///
/// # Errors
/// `ShapeMismatch` if the file holds fewer than `len` values or its length is
/// not a whole number of elements.
pub fn read_be_f32_prefix(path: &Path, len: usize) -> Result<Vec<f32>, BinaryFileError> {
    let file = File::open(path).map_err(|e| BinaryFileError::io(path, e))?;
    let actual = file_len(path, &file)?;
    let expected = (len * ELEMENT_SIZE) as u64;
    if actual < expected || actual % ELEMENT_SIZE as u64 != 0 {
        return Err(BinaryFileError::ShapeMismatch {
            path: path.to_path_buf(),
            shape: vec![len],
            expected_bytes: expected,
            actual_bytes: actual,
        });
    }

    let mut bytes = vec![0u8; expected as usize];
    file.take(expected)
        .read_exact(&mut bytes)
        .map_err(|e| BinaryFileError::io(path, e))?;
    Ok(decode_all(&bytes))
}

/// Write values as a flat big-endian `f32` file, replacing any existing file.
pub fn write_be_f32(path: &Path, values: &[f32]) -> Result<(), BinaryFileError> {
    let file = File::create(path).map_err(|e| BinaryFileError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    write_be_f32_to(&mut writer, values).map_err(|e| BinaryFileError::io(path, e))?;
    writer.flush().map_err(|e| BinaryFileError::io(path, e))
}

/// Encode values as big-endian `f32` into any writer.
pub fn write_be_f32_to<W: Write>(writer: &mut W, values: &[f32]) -> std::io::Result<()> {
    for v in values {
        writer.write_all(&v.to_be_bytes())?;
    }
    Ok(())
}

/// Read-only memory-mapped view of a shaped big-endian `f32` file.
///
/// Indexing is row-major over `shape`. Nothing is decoded until an element
/// is requested, so opening a multi-gigabyte snapshot costs only the map.
///
/// # Example
///
/// ```ignore
/// use llc_steric::io::MappedField;
///
/// let theta = MappedField::open("Theta/Theta_20110913T000000", &[88, 960 * 1754])?;
/// let sst = theta.at(&[0, 1234]);
/// theta.close();
/// ```
pub struct MappedField {
    path: PathBuf,
    shape: Vec<usize>,
    len: usize,
    map: Mmap,
}

impl MappedField {
    /// Map `path` with the given row-major shape.
    ///
    /// # Errors
    /// - `EmptyShape` if the shape has a zero extent
    /// - `ShapeMismatch` if the file length is not `product(shape) * 4`
    pub fn open<P: AsRef<Path>>(path: P, shape: &[usize]) -> Result<Self, BinaryFileError> {
        let path = path.as_ref();
        let len: usize = shape.iter().product();
        if len == 0 {
            return Err(BinaryFileError::EmptyShape {
                path: path.to_path_buf(),
                shape: shape.to_vec(),
            });
        }

        let file = File::open(path).map_err(|e| BinaryFileError::io(path, e))?;
        let actual = file_len(path, &file)?;
        let expected = (len * ELEMENT_SIZE) as u64;
        if actual != expected {
            return Err(BinaryFileError::ShapeMismatch {
                path: path.to_path_buf(),
                shape: shape.to_vec(),
                expected_bytes: expected,
                actual_bytes: actual,
            });
        }

        // SAFETY: the map is read-only and the model output files are not
        // modified while a batch is running.
        let map = unsafe { Mmap::map(&file) }.map_err(|e| BinaryFileError::io(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            shape: shape.to_vec(),
            len,
            map,
        })
    }

    /// Path of the mapped file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Row-major shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false for a successfully opened field.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element at a flat index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<f32> {
        if index >= self.len {
            return None;
        }
        let start = index * ELEMENT_SIZE;
        Some(decode(&self.map[start..start + ELEMENT_SIZE]))
    }

    /// Element at a multi-dimensional index (one entry per axis).
    pub fn at(&self, index: &[usize]) -> Option<f32> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0;
        for (&i, &n) in index.iter().zip(&self.shape) {
            if i >= n {
                return None;
            }
            flat = flat * n + i;
        }
        self.get(flat)
    }

    /// Number of elements in one slab along the leading axis.
    pub fn slab_len(&self) -> usize {
        self.len / self.shape[0]
    }

    /// Decode leading-axis slab `index` (e.g. one vertical level) into `out`.
    ///
    /// # Panics
    /// Panics if `index` is out of range or `out.len() != self.slab_len()`.
    pub fn slab_into(&self, index: usize, out: &mut [f32]) {
        let n = self.slab_len();
        assert!(index < self.shape[0], "slab {index} out of range for {:?}", self.shape);
        assert_eq!(out.len(), n, "slab buffer length mismatch");
        let start = index * n * ELEMENT_SIZE;
        let bytes = &self.map[start..start + n * ELEMENT_SIZE];
        for (dst, src) in out.iter_mut().zip(bytes.chunks_exact(ELEMENT_SIZE)) {
            *dst = decode(src);
        }
    }

    /// Iterate all elements in file order.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.map.chunks_exact(ELEMENT_SIZE).map(decode)
    }

    /// Decode the whole field into memory.
    pub fn to_vec(&self) -> Vec<f32> {
        decode_all(&self.map)
    }

    /// Release the mapping now rather than at end of scope.
    pub fn close(self) {}
}

impl std::fmt::Debug for MappedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedField")
            .field("path", &self.path)
            .field("shape", &self.shape)
            .finish()
    }
}
