//! Error types for retype

use std::path::PathBuf;

use thiserror::Error;

/// Inconsistencies in the symbol table or qualifier registry.
///
/// These are configuration faults, caught once when the mapping is built
/// and never raised while rewriting individual files.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("symbol '{symbol}' is registered more than once")]
    DuplicateSymbol { symbol: String },

    #[error("qualifier '{qualifier}' is registered more than once")]
    DuplicateQualifier { qualifier: String },

    #[error("symbol '{symbol}' maps to qualifier '{qualifier}' which has no import path")]
    UnresolvedQualifier { symbol: String, qualifier: String },

    #[error("invalid import path '{path}' for qualifier '{qualifier}'")]
    InvalidPath { qualifier: String, path: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
