//! Candidate file discovery

use std::path::{Path, PathBuf};

use glob::Pattern;
use ignore::{DirEntry, WalkBuilder};
use tracing::{debug, warn};

use crate::config::WalkerConfig;
use crate::error::{Error, Result};

/// Collect every candidate source file under `root`, sorted by path.
///
/// `root` may also be a single file. Unreadable entries below the root are
/// logged and skipped.
pub fn collect_candidates(root: &Path, config: &WalkerConfig) -> Result<Vec<PathBuf>> {
    std::fs::metadata(root).map_err(|e| Error::read(root, e))?;

    let filter_config = config.clone();
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .parents(config.respect_gitignore)
        .ignore(config.respect_gitignore)
        .git_ignore(config.respect_gitignore)
        .git_global(config.respect_gitignore)
        .git_exclude(config.respect_gitignore)
        .require_git(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| entry.depth() == 0 || !should_skip(entry, &filter_config))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if has_extension(entry.path(), &config.extension) {
            files.push(entry.into_path());
        }
    }

    debug!(root = %root.display(), count = files.len(), "collected candidates");
    Ok(files)
}

/// Check if an entry below the root should be pruned.
fn should_skip(entry: &DirEntry, config: &WalkerConfig) -> bool {
    let name = entry.file_name().to_string_lossy();
    let is_dir = entry.file_type().is_some_and(|t| t.is_dir());

    if is_dir {
        if config.skip_dirs.iter().any(|skip| *skip == name) {
            return true;
        }
        if name.starts_with('.') && config.allowed_hidden_dir.as_deref() != Some(&*name) {
            return true;
        }
    }

    config
        .ignore_patterns
        .iter()
        .any(|pattern| *pattern == name || glob_match(pattern, &name))
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == extension)
}

/// Match a glob pattern against a name.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    Pattern::new(pattern)
        .map(|p| p.matches(name))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "package x\n").unwrap();
    }

    fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_collects_go_files_sorted() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "main.go");
        touch(dir.path(), "cmd/b.go");
        touch(dir.path(), "cmd/a.go");
        touch(dir.path(), "README.md");

        let files = collect_candidates(dir.path(), &WalkerConfig::default()).unwrap();
        assert_eq!(
            relative(dir.path(), &files),
            vec!["cmd/a.go", "cmd/b.go", "main.go"]
        );
    }

    #[test]
    fn test_skip_dirs_at_any_depth() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "vendor/lib.go");
        touch(dir.path(), "internal/node_modules/x.go");
        touch(dir.path(), "internal/backup/old.go");
        touch(dir.path(), "internal/keep.go");

        let files = collect_candidates(dir.path(), &WalkerConfig::default()).unwrap();
        assert_eq!(relative(dir.path(), &files), vec!["internal/keep.go"]);
    }

    #[test]
    fn test_hidden_dirs_except_github() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), ".cache/gen.go");
        touch(dir.path(), ".github/tools/check.go");
        touch(dir.path(), ".hidden_file.go");

        let files = collect_candidates(dir.path(), &WalkerConfig::default()).unwrap();
        assert_eq!(
            relative(dir.path(), &files),
            vec![".github/tools/check.go", ".hidden_file.go"]
        );
    }

    #[test]
    fn test_ignore_patterns() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a_test.go");
        touch(dir.path(), "a.go");
        touch(dir.path(), "generated/x.go");

        let config = WalkerConfig {
            ignore_patterns: vec!["*_test.go".to_string(), "generated".to_string()],
            ..Default::default()
        };
        let files = collect_candidates(dir.path(), &config).unwrap();
        assert_eq!(relative(dir.path(), &files), vec!["a.go"]);
    }

    #[test]
    fn test_single_file_root() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "one.go");
        let root = dir.path().join("one.go");
        let files = collect_candidates(&root, &WalkerConfig::default()).unwrap();
        assert_eq!(files, vec![root]);
    }

    #[test]
    fn test_missing_root_is_error() {
        let result = collect_candidates(Path::new("/nonexistent/retype/root"), &WalkerConfig::default());
        assert!(matches!(result, Err(Error::Read { .. })));
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*.go", "main.go"));
        assert!(!glob_match("*.go", "main.rs"));
        assert!(glob_match("gen?", "gen1"));
        assert!(!glob_match("[", "["));
    }
}
