//! Whole-tree run: discover, rewrite in parallel, then apply or report.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::DriverConfig;
use crate::error::{Error, Result};
use crate::rewrite::{RewriteResult, Rewriter};
use crate::walker::collect_candidates;

/// A file the rewrite changed.
#[derive(Debug, Clone, Serialize)]
pub struct FileEdit {
    /// Path relative to the scanned root
    pub path: PathBuf,
    #[serde(skip)]
    pub full_path: PathBuf,
    /// Destination qualifiers now used by the file
    pub needed: Vec<String>,
    /// Symbols left on the deprecated qualifier
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unmapped: Vec<String>,
    /// Unmapped selectors remain while the deprecated import is gone
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dangling: bool,
    /// Needed qualifiers whose import could not be added
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_imports: Vec<String>,
    #[serde(skip)]
    pub updated: String,
}

impl FileEdit {
    fn new(root: &Path, full_path: PathBuf, result: RewriteResult) -> Self {
        let path = relative_to(root, &full_path);
        Self {
            path,
            full_path,
            needed: result.needed().iter().cloned().collect(),
            unmapped: result.unmapped().iter().cloned().collect(),
            dangling: result.has_dangling_selectors(),
            missing_imports: result.missing_imports().to_vec(),
            updated: result.into_new_text(),
        }
    }

    /// Whether the edited file needs a manual follow-up.
    pub fn needs_attention(&self) -> bool {
        self.dangling || !self.missing_imports.is_empty()
    }
}

/// A changed file that could not be written back.
#[derive(Debug, Clone, Serialize)]
pub struct WriteFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Everything a run found and did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub root: PathBuf,
    /// Candidate files considered
    pub scanned: usize,
    /// Candidates skipped as too large or unreadable
    pub skipped: usize,
    /// Whether changes were written to disk
    pub applied: bool,
    pub edits: Vec<FileEdit>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<WriteFailure>,
}

impl RunReport {
    pub fn changed(&self) -> usize {
        self.edits.len()
    }

    pub fn needs_attention(&self) -> impl Iterator<Item = &FileEdit> {
        self.edits.iter().filter(|e| e.needs_attention())
    }
}

enum FileOutcome {
    Skipped,
    Unchanged,
    Changed(RewriteResult),
}

/// Run the rewrite over every candidate file under `root`.
pub fn run(root: &Path, rewriter: &Rewriter, config: &DriverConfig) -> Result<RunReport> {
    let files = collect_candidates(root, &config.walker)?;
    info!(root = %root.display(), files = files.len(), "scanning");

    let outcomes = map_files(&files, config.parallel_workers, |path| {
        process_file(path, rewriter, config.max_file_size)
    });

    let mut report = RunReport {
        root: root.to_path_buf(),
        scanned: files.len(),
        skipped: 0,
        applied: config.apply,
        edits: Vec::new(),
        failures: Vec::new(),
    };

    for (path, outcome) in files.into_iter().zip(outcomes) {
        match outcome {
            FileOutcome::Skipped => report.skipped += 1,
            FileOutcome::Unchanged => {}
            FileOutcome::Changed(result) => {
                let edit = FileEdit::new(root, path, result);
                if !edit.missing_imports.is_empty() {
                    warn!(
                        path = %edit.path.display(),
                        missing = ?edit.missing_imports,
                        "imports could not be added"
                    );
                }
                if edit.dangling {
                    warn!(
                        path = %edit.path.display(),
                        symbols = ?edit.unmapped,
                        "unmapped selectors remain after removing the deprecated import"
                    );
                }
                report.edits.push(edit);
            }
        }
    }

    if config.apply {
        for edit in &report.edits {
            if let Err(e) = write_edit(edit) {
                error!("{}", e);
                report.failures.push(WriteFailure {
                    path: edit.path.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

fn process_file(path: &Path, rewriter: &Rewriter, max_file_size: u64) -> FileOutcome {
    if let Ok(metadata) = path.metadata() {
        if metadata.len() > max_file_size {
            debug!(path = %path.display(), size = metadata.len(), "skipping large file");
            return FileOutcome::Skipped;
        }
    }

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("{}", Error::read(path, e));
            return FileOutcome::Skipped;
        }
    };

    let result = rewriter.rewrite(&text);
    if result.is_changed() {
        debug!(path = %path.display(), needed = ?result.needed(), "changed");
        if let Some(reason) = result.declined() {
            debug!(path = %path.display(), %reason, "import block left as is");
        }
        FileOutcome::Changed(result)
    } else {
        debug!(path = %path.display(), "unchanged");
        FileOutcome::Unchanged
    }
}

fn write_edit(edit: &FileEdit) -> Result<()> {
    fs::write(&edit.full_path, &edit.updated).map_err(|e| Error::write(&edit.full_path, e))
}

/// Map `f` over `files`, keeping input order.
fn map_files<T, F>(files: &[PathBuf], workers: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&Path) -> T + Sync + Send,
{
    match workers {
        1 => files.iter().map(|p| f(p.as_path())).collect(),
        0 => files.par_iter().map(|p| f(p.as_path())).collect(),
        n => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
            Ok(pool) => pool.install(|| files.par_iter().map(|p| f(p.as_path())).collect()),
            Err(e) => {
                // Fall back to rayon's global pool if custom pool creation fails
                warn!("cannot build thread pool: {}", e);
                files.par_iter().map(|p| f(p.as_path())).collect()
            }
        },
    }
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
        _ => path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| path.to_path_buf()),
    }
}
