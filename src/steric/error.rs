//! Error type for steric height computation and batch runs.

use std::path::PathBuf;

use thiserror::Error;

use crate::equations::EosError;
use crate::io::BinaryFileError;
use crate::region::GridError;

/// Error type for the steric height calculator and its batch driver.
#[derive(Debug, Error)]
pub enum StericError {
    /// Grid could not be loaded
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Snapshot file could not be mapped (size, shape or I/O)
    #[error(transparent)]
    Binary(#[from] BinaryFileError),

    /// Theta and salt directories hold different numbers of snapshots
    #[error("{}: {theta} theta files but {salt} salt files", .dir.display())]
    CountMismatch {
        dir: PathBuf,
        theta: usize,
        salt: usize,
    },

    /// Equation of state rejected a grid point of a snapshot pair
    #[error(
        "density failed at level {level}, column {column} of ({}, {}): {source}",
        .theta.display(),
        .salt.display()
    )]
    Computation {
        theta: PathBuf,
        salt: PathBuf,
        level: usize,
        column: usize,
        #[source]
        source: EosError,
    },

    /// Equation of state rejected a grid point of an in-memory profile
    #[error("density failed at level {level}, column {column}: {source}")]
    Density {
        level: usize,
        column: usize,
        #[source]
        source: EosError,
    },

    /// In-memory field does not match the region layout
    #[error("field has {actual} values, expected {expected}")]
    FieldLength { expected: usize, actual: usize },

    /// Output file name cannot be derived from an input file
    #[error("cannot derive output path for {}: {reason}", .path.display())]
    OutputPath { path: PathBuf, reason: String },

    /// File system failure outside of field decoding
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is unreadable or invalid
    #[error("invalid configuration {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    /// Snapshot directory produced an invalid glob pattern
    #[error("invalid snapshot pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl StericError {
    pub(crate) fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
