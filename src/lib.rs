pub mod config;
pub mod model;
pub mod overlay;
pub mod router;
pub mod suggestions;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use model::{HttpModelHost, SessionManager};
use router::MessageRouter;
use suggestions::SuggestionGenerator;

/// Return the platform-standard data directory for the companion.
///
/// - macOS: `~/Library/Application Support/com.chat-companion/`
/// - Windows: `{FOLDERID_RoamingAppData}\com.chat-companion\`
/// - Linux: `$XDG_DATA_HOME/com.chat-companion/` (fallback `~/.local/share/...`)
///
/// Falls back to `~/.chat-companion/` only if none of the above can be resolved.
pub(crate) fn data_dir() -> std::path::PathBuf {
    if let Some(dir) = dirs::data_dir() {
        return dir.join("com.chat-companion");
    }
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".chat-companion")
}

/// Initialize the tracing subscriber, writing structured logs to the data directory.
///
/// On each startup the previous logs are rotated (`companion.log` →
/// `companion.log.1` → … → `.{keep}`), a fresh file is opened behind a
/// line-flushing writer and a banner records where the logs are.
///
/// Stdout carries the wire protocol, so nothing is ever logged there.
fn init_tracing(settings: &config::LogSettings) -> std::io::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = data_dir();
    std::fs::create_dir_all(&log_dir)?;

    let log_path = log_dir.join(&settings.file);
    let rotated = rotate_log_file(&log_path, settings.keep);

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.filter));

    fmt::fmt()
        .with_env_filter(filter)
        .with_writer(FlushingWriter::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %log_dir.display(),
        log_file = %log_path.display(),
        rotated,
        pid = std::process::id(),
        "=== chat-companion starting ==="
    );
    Ok(())
}

/// `companion.log` + 2 → `companion.log.2`.
fn rotated_path(base: &Path, generation: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{generation}"));
    PathBuf::from(name)
}

/// Shift `base` and its numbered generations up by one, dropping whatever
/// would land past `keep`. With `keep == 0` the live file is simply removed.
///
/// Returns how many files were shifted. Gaps in the chain are skipped.
fn rotate_log_file(base: &Path, keep: u32) -> u32 {
    if keep == 0 {
        let _ = std::fs::remove_file(base);
        return 0;
    }
    let _ = std::fs::remove_file(rotated_path(base, keep));

    let mut shifted = 0;
    for generation in (0..keep).rev() {
        let from = match generation {
            0 => base.to_path_buf(),
            n => rotated_path(base, n),
        };
        if std::fs::rename(&from, rotated_path(base, generation + 1)).is_ok() {
            shifted += 1;
        }
    }
    shifted
}

/// Shared writer that flushes after every write, so each log line is on
/// disk even if the host kills the process.
struct FlushingWriter<W> {
    inner: Arc<Mutex<W>>,
}

impl<W> Clone for FlushingWriter<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: Write> FlushingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    fn locked(&self) -> std::io::Result<std::sync::MutexGuard<'_, W>> {
        self.inner
            .lock()
            .map_err(|e| std::io::Error::other(format!("log writer lock poisoned: {e}")))
    }
}

impl<W: Write> Write for FlushingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut inner = self.locked()?;
        let n = inner.write(buf)?;
        inner.flush()?;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.locked()?.flush()
    }
}

impl<'a, W: Write + 'a> tracing_subscriber::fmt::MakeWriter<'a> for FlushingWriter<W> {
    type Writer = FlushingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Build the router from configuration.
pub fn build_router(config: &config::CompanionConfig) -> anyhow::Result<MessageRouter> {
    let host = HttpModelHost::new(config.model.clone())?;
    let sessions = SessionManager::new(Arc::new(host));
    let generator = SuggestionGenerator::new(Arc::new(sessions))
        .with_max_messages(config.overlay.max_prompt_messages);
    Ok(MessageRouter::new(Arc::new(generator)))
}

/// Run the companion process: serve the router over stdin/stdout until EOF.
pub fn run() -> anyhow::Result<()> {
    // Config first: it decides where the logs go. A companion without a
    // writable log file still serves requests.
    let (config, source) = config::load_or_default();
    if let Err(e) = init_tracing(&config.logging) {
        eprintln!("chat-companion: logging disabled: {e}");
    }
    source.log();
    tracing::info!(
        base_url = %config.model.base_url,
        model = %config.model.model_name,
        "configuration loaded"
    );

    let router = Arc::new(build_router(&config)?);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        router::stdio::serve(router, stdin, tokio::io::stdout()).await
    })?;

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
