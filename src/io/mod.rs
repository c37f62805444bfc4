//! I/O for MITgcm binary field files.
//!
//! MITgcm output is written as headerless big-endian `f32` arrays, one file
//! per field and snapshot:
//!
//! ```text
//! grid/hFacC_960x1754x88     (88, 960*1754) open-cell fractions
//! Theta/Theta_20110913T000000 (88, 960*1754) potential temperature
//! ```
//!
//! Small grid descriptors are read eagerly; snapshots are memory-mapped.

mod binary;

pub use binary::{
    BinaryFileError, ELEMENT_SIZE, MappedField, read_be_f32, read_be_f32_prefix, write_be_f32,
    write_be_f32_to,
};
