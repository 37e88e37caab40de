//! Retype - move Go selectors off a deprecated shared-types package

pub mod config;
pub mod driver;
pub mod error;
pub mod imports;
pub mod lexer;
pub mod mapping;
pub mod output;
pub mod rewrite;
pub mod selectors;
pub mod walker;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{DEFAULT_MAX_FILE_SIZE, DriverConfig, WalkerConfig};
pub use driver::{FileEdit, RunReport, WriteFailure, run};
pub use error::{Error, MappingError, Result};
pub use mapping::{DEPRECATED_PATH, DEPRECATED_QUALIFIER, Mapping, QualifierEntry};
pub use output::{DEFAULT_LIST_LIMIT, print_json, print_summary, write_summary};
pub use rewrite::{RewriteOptions, RewriteResult, Rewriter};
