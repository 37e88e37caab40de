//! Configuration types for the file driver

/// Directory names never descended into, at any depth.
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    "backup",
    "logs",
    "bin",
    "dist",
    "vendor",
    "node_modules",
];

/// The one hidden directory that is still walked.
pub const ALLOWED_HIDDEN_DIR: &str = ".github";

/// Default maximum file size for rewriting (1MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_000_000;

/// Configuration for candidate file discovery.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    pub skip_dirs: Vec<String>,
    pub allowed_hidden_dir: Option<String>,
    /// File extension (without dot) of candidate files
    pub extension: String,
    /// Extra name patterns to skip (exact names or globs)
    pub ignore_patterns: Vec<String>,
    /// Honour .gitignore and related ignore files
    pub respect_gitignore: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            skip_dirs: SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
            allowed_hidden_dir: Some(ALLOWED_HIDDEN_DIR.to_string()),
            extension: "go".to_string(),
            ignore_patterns: Vec::new(),
            respect_gitignore: false,
        }
    }
}

/// Configuration for a whole run.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub walker: WalkerConfig,
    /// Write changed files back instead of only reporting them
    pub apply: bool,
    /// Files larger than this are skipped
    pub max_file_size: u64,
    /// Number of parallel workers.
    /// 0 = auto-detect (use all available cores)
    /// 1 = sequential (no parallelism)
    /// N = use N worker threads
    pub parallel_workers: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            walker: WalkerConfig::default(),
            apply: false,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            parallel_workers: 0,
        }
    }
}
