//! CLI entry point for retype

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use retype::{
    DEFAULT_LIST_LIMIT, DEFAULT_MAX_FILE_SIZE, DriverConfig, Mapping, RewriteOptions, Rewriter,
    WalkerConfig, print_json, print_summary, run,
};
use tracing_subscriber::EnvFilter;

/// When to color the summary
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolve `auto` against NO_COLOR, FORCE_COLOR, TERM=dumb and whether
    /// stdout is a terminal, in that order.
    fn enabled(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                std::env::var_os("NO_COLOR").is_none()
                    && (std::env::var_os("FORCE_COLOR").is_some()
                        || (std::env::var_os("TERM").is_none_or(|t| t != "dumb")
                            && std::io::stdout().is_terminal()))
            }
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "retype")]
#[command(about = "Move Go selectors off the deprecated sfDBTools/internal/types package")]
#[command(version)]
struct Args {
    /// Repository root (or single file) to rewrite
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Write changes to files (default is a dry run)
    #[arg(long = "apply")]
    apply: bool,

    /// Output the run report as JSON
    #[arg(long = "json")]
    json: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Number of changed files to list before eliding the rest
    #[arg(long = "list-limit", value_name = "N", default_value_t = DEFAULT_LIST_LIMIT)]
    list_limit: usize,

    /// Skip files or directories matching pattern (can be used multiple times)
    #[arg(short = 'I', long = "ignore")]
    ignore: Vec<String>,

    /// Honour .gitignore files while walking
    #[arg(long = "gitignore")]
    gitignore: bool,

    /// Number of parallel workers
    /// (0 = auto-detect, 1 = sequential, N = use N workers)
    #[arg(short = 'j', long = "jobs", default_value = "0")]
    jobs: usize,

    /// Maximum file size to rewrite (default: 1MB)
    /// Use suffixes: K, M, G (e.g., 5M for 5MB)
    #[arg(long = "max-file-size", value_name = "SIZE")]
    max_file_size: Option<String>,

    /// Set `// Last Modified :` header lines of changed files to VALUE
    #[arg(long = "last-modified", value_name = "VALUE", value_parser = parse_stamp)]
    last_modified: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    quiet: bool,
}

/// Byte count with an optional binary K/M/G suffix (`KB` etc. also accepted).
fn parse_file_size(s: &str) -> Result<u64, String> {
    const UNITS: [(&str, u64); 6] = [
        ("KB", 1 << 10),
        ("MB", 1 << 20),
        ("GB", 1 << 30),
        ("K", 1 << 10),
        ("M", 1 << 20),
        ("G", 1 << 30),
    ];

    let upper = s.trim().to_uppercase();
    let (digits, unit) = UNITS
        .iter()
        .find_map(|&(suffix, unit)| upper.strip_suffix(suffix).map(|n| (n, unit)))
        .unwrap_or((upper.as_str(), 1));

    let count: u64 = digits
        .trim()
        .parse()
        .map_err(|_| format!("invalid number: {}", digits))?;
    count
        .checked_mul(unit)
        .ok_or_else(|| format!("size too large: {}", s.trim()))
}

fn parse_stamp(s: &str) -> Result<String, String> {
    let value = s.trim();
    if value.is_empty() {
        return Err("value must not be empty".to_string());
    }
    if value.contains(['\n', '\r']) {
        return Err("value must be a single line".to_string());
    }
    Ok(value.to_string())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("retype={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let max_file_size = match args.max_file_size {
        Some(ref size_str) => parse_file_size(size_str).unwrap_or_else(|e| {
            eprintln!("retype: invalid --max-file-size '{}': {}", size_str, e);
            process::exit(1);
        }),
        None => DEFAULT_MAX_FILE_SIZE,
    };

    let mapping = Mapping::builtin().unwrap_or_else(|e| {
        eprintln!("retype: {}", e);
        process::exit(1);
    });
    let rewriter = Rewriter::new(
        mapping,
        RewriteOptions {
            last_modified: args.last_modified.clone(),
        },
    );

    let config = DriverConfig {
        walker: WalkerConfig {
            ignore_patterns: args.ignore.clone(),
            respect_gitignore: args.gitignore,
            ..Default::default()
        },
        apply: args.apply,
        max_file_size,
        parallel_workers: args.jobs,
        ..Default::default()
    };

    let root = if args.path.is_absolute() {
        args.path.clone()
    } else {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        if args.path == Path::new(".") {
            cwd
        } else {
            cwd.join(&args.path)
        }
    };

    let report = run(&root, &rewriter, &config).unwrap_or_else(|e| {
        eprintln!("retype: {}", e);
        process::exit(1);
    });

    let result = if args.json {
        print_json(&report)
    } else {
        print_summary(&report, args.color.enabled(), args.list_limit)
    };

    if let Err(e) = result {
        eprintln!("retype: error writing output: {}", e);
        process::exit(1);
    }

    if !report.failures.is_empty() {
        process::exit(1);
    }
}
