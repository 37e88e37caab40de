//! Test utilities for building throwaway Go source trees.
//!
//! This module is only compiled for tests and benchmarks.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A legacy Go file that imports the deprecated package in a grouped block.
pub const LEGACY_GROUPED: &str = r#"// File : cmd/dbscan/filter.go
// Last Modified : 2025-12-17
package dbscan

import (
	"errors"
	"fmt"
	"sfDBTools/internal/types"

	"github.com/spf13/cobra"
)

func run(cmd *cobra.Command, info types.DBInfo, opts types.ScanOptions) error {
	if opts.Name == "" {
		return errors.New("empty")
	}
	fmt.Println(info, opts)
	return nil
}
"#;

/// A Go file with no reference to the deprecated package.
pub const UNRELATED: &str = r#"package util

import "strings"

func Upper(s string) string { return strings.ToUpper(s) }
"#;

/// A temporary source tree for testing.
///
/// The directory is automatically cleaned up when dropped.
pub struct TestTree {
    dir: TempDir,
}

impl TestTree {
    /// Create a new empty temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Add a file, creating parent directories as needed.
    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Read a file back as a string.
    pub fn read(&self, path: &str) -> String {
        fs::read_to_string(self.dir.path().join(path)).expect("Failed to read file")
    }

    /// Populate `count` files, every `legacy_every`-th one referencing the
    /// deprecated package.
    pub fn populate(&self, count: usize, legacy_every: usize) {
        for i in 0..count {
            let content = if legacy_every > 0 && i % legacy_every == 0 {
                LEGACY_GROUPED
            } else {
                UNRELATED
            };
            self.add_file(&format!("pkg{}/file_{}.go", i % 10, i), content);
        }
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}
