use crate::config::{LoggingConfig, Section};
use std::{
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::{filter::Targets, fmt};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

// -------- level helpers --------
fn parse_tracing_level(s: &str) -> Option<tracing::Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

fn level_filter(s: &str) -> LevelFilter {
    parse_tracing_level(s).map_or(LevelFilter::OFF, LevelFilter::from_level)
}

// -------- rotating writer for files --------
#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl<'a> fmt::MakeWriter<'a> for RotWriter {
    type Writer = RotWriterHandle;
    fn make_writer(&'a self) -> Self::Writer {
        RotWriterHandle(self.0.clone())
    }
}

struct RotWriterHandle(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotWriterHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log file writer poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log file writer poisoned"))?
            .flush()
    }
}

// -------- path resolution helpers --------

/// Resolve a log file path against `base_dir` (home_dir).
/// Absolute paths are kept as-is; relative paths are joined with `base_dir`.
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Create a rotating writer for log files, ensuring the parent directory exists.
fn create_rotating_writer_at_path(
    log_path: &Path,
    max_bytes: usize,
    max_backups: usize,
) -> std::io::Result<RotWriter> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let rot = FileRotate::new(
        log_path,
        AppendTimestamp::default(FileLimit::MaxFiles(max_backups)),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None, // file permissions (Unix only)
    );

    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

// -------- filters --------

/// Library targets whose TRACE output carries bound statement values
/// (SeaORM records whole `Statement`s, passwords included, on its spans).
const VALUE_ECHOING_TARGETS: &[&str] = &["sea_orm"];

/// Per-target filter: "default" sets the fallback level, every other key is a target prefix.
///
/// Targets in [`VALUE_ECHOING_TARGETS`] are capped at DEBUG unless a section
/// names them explicitly.
fn build_targets(cfg: &LoggingConfig, pick: impl Fn(&Section) -> &str) -> Targets {
    let default_level = cfg
        .get("default")
        .map_or(LevelFilter::OFF, |s| level_filter(pick(s)));

    let targets = cfg
        .iter()
        .filter(|(name, _)| name.as_str() != "default")
        .fold(
            Targets::new().with_default(default_level),
            |targets, (name, section)| targets.with_target(name.clone(), level_filter(pick(section))),
        );

    VALUE_ECHOING_TARGETS
        .iter()
        .filter(|target| !cfg.contains_key(**target))
        .fold(targets, |targets, target| {
            targets.with_target(*target, default_level.min(LevelFilter::DEBUG))
        })
}

fn build_file_writer(cfg: &LoggingConfig, base_dir: &Path) -> Option<RotWriter> {
    let section = cfg.get("default")?;
    if section.file.trim().is_empty() {
        return None;
    }

    let max_bytes = section.max_size_mb.unwrap_or(100) * 1024 * 1024;
    let log_path = resolve_log_path(&section.file, base_dir);

    match create_rotating_writer_at_path(
        &log_path,
        usize::try_from(max_bytes).unwrap_or(usize::MAX),
        section.max_backups.unwrap_or(3),
    ) {
        Ok(writer) => Some(writer),
        Err(e) => {
            eprintln!(
                "Failed to initialize log file '{}': {e}",
                log_path.to_string_lossy()
            );
            None
        }
    }
}

// -------- public init --------

/// Initialize logging from a configuration.
/// - `cfg`: LoggingConfig containing the logging sections
/// - `base_dir`: base directory used to resolve relative log file paths (usually home_dir)
///
/// Console output is human-readable; the optional file sink (from the "default"
/// section) is JSON lines with size-based rotation. Calling this twice is a no-op.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

    // Bridge `log` → `tracing` *before* installing the subscriber (sqlx logs via `log`).
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    // Console logs go to stderr; stdout belongs to command output.
    let ansi = std::io::stderr().is_terminal();
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(build_targets(cfg, |s| &s.console_level));

    let file_layer = build_file_writer(cfg, base_dir).map(|writer| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_level(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(writer)
            .with_filter(build_targets(cfg, |s| &s.file_level))
    });

    let _ = Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

fn init_default_logging() {
    let _ = fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

// =================== tests ===================
