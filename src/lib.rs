pub mod adapters;
pub mod agent_core;
pub mod config;
pub mod inference;
pub mod voice;

use std::path::{Path, PathBuf};

pub use adapters::{DataAdapter, RestAdapter, SqliteAdapter};
pub use agent_core::Orchestrator;
pub use config::AssistantConfig;
pub use inference::{ChatMessage, ProjectSettings, ProviderKind, Role};

/// Return the platform-standard data directory for Shopdesk.
///
/// - macOS: `~/Library/Application Support/shopdesk/`
/// - Windows: `{FOLDERID_RoamingAppData}\shopdesk\`
/// - Linux: `$XDG_DATA_HOME/shopdesk/` (fallback `~/.local/share/...`)
///
/// Falls back to `~/.shopdesk/` only if none of the above can be resolved.
pub(crate) fn data_dir() -> PathBuf {
    if let Some(dir) = dirs::data_dir() {
        return dir.join("shopdesk");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".shopdesk")
}

/// Initialize the tracing subscriber.
///
/// With `to_stderr` unset, logs go to `shopdesk.log` in the data directory:
/// 1. Rotates existing logs (shopdesk.log → .1 → .2 → .3, keeps last 3).
/// 2. Opens a fresh shopdesk.log with a line-flushing writer.
/// 3. Logs a startup banner with the log path.
///
/// `RUST_LOG` overrides the default filter (`shopdesk=info,warn`).
pub fn init_tracing(to_stderr: bool) -> std::io::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("shopdesk=info,warn"));

    if to_stderr {
        fmt::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
        return Ok(());
    }

    let log_dir = data_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("shopdesk.log");

    // Rotate: shopdesk.log.2 -> .3, .1 -> .2, shopdesk.log -> .1
    rotate_log_file(&log_path, 3);

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    fmt::fmt()
        .with_env_filter(filter)
        .with_writer(FlushingWriter::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    // Startup banner with the log path
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_file = %log_path.display(),
        pid = std::process::id(),
        "=== Shopdesk starting ==="
    );
    Ok(())
}

/// Rotate log files: `shopdesk.log` → `shopdesk.log.1` → … → `.{keep}`.
///
/// Oldest file beyond `keep` is deleted. Missing files in the chain are skipped.
fn rotate_log_file(base_path: &Path, keep: u32) {
    // Delete the oldest
    let oldest = format!("{}.{keep}", base_path.display());
    let _ = std::fs::remove_file(&oldest);

    // Shift: .{n-1} -> .{n}
    for i in (1..keep).rev() {
        let from = format!("{}.{i}", base_path.display());
        let to = format!("{}.{}", base_path.display(), i + 1);
        let _ = std::fs::rename(&from, &to);
    }

    // Current -> .1
    if base_path.exists() {
        let to = format!("{}.1", base_path.display());
        let _ = std::fs::rename(base_path, &to);
    }
}

/// A writer that wraps `std::fs::File` and flushes after every write.
///
/// `tracing-subscriber` does not flush the file between events, so a line
/// could sit in OS buffers and be lost if the process dies mid-call. Each
/// log line is on disk as soon as it is written.
#[derive(Clone)]
struct FlushingWriter {
    file: std::sync::Arc<std::sync::Mutex<std::fs::File>>,
}

impl FlushingWriter {
    fn new(file: std::fs::File) -> Self {
        Self {
            file: std::sync::Arc::new(std::sync::Mutex::new(file)),
        }
    }
}

impl std::io::Write for FlushingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut f = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("lock poisoned: {e}")))?;
        let n = std::io::Write::write(&mut *f, buf)?;
        std::io::Write::flush(&mut *f)?;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut f = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("lock poisoned: {e}")))?;
        std::io::Write::flush(&mut *f)
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for FlushingWriter {
    type Writer = FlushingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_shifts_and_drops_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("shopdesk.log");
        std::fs::write(&base, "current").unwrap();
        std::fs::write(dir.path().join("shopdesk.log.1"), "one").unwrap();
        std::fs::write(dir.path().join("shopdesk.log.3"), "oldest").unwrap();

        rotate_log_file(&base, 3);

        assert!(!base.exists());
        let read = |name: &str| std::fs::read_to_string(dir.path().join(name)).unwrap();
        assert_eq!(read("shopdesk.log.1"), "current");
        assert_eq!(read("shopdesk.log.2"), "one");
        assert!(!dir.path().join("shopdesk.log.3").exists());
    }

    #[test]
    fn test_flushing_writer_writes_through() {
        use std::io::Write;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = FlushingWriter::new(file);
        writer.write_all(b"line\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "line\n");
    }
}
