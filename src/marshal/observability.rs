use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Local;

use crate::error::MarshalError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MarshalSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (bad input data or mapping).
    Error,
    /// Critical error (I/O or workbook codec failures).
    Critical,
}

/// Which direction a marshalling call ran in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Records to grid pages.
    Export,
    /// Grid to records.
    Import,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Export => f.write_str("export"),
            Self::Import => f.write_str("import"),
        }
    }
}

/// Context about a marshalling attempt.
#[derive(Debug, Clone)]
pub struct MarshalContext {
    /// Export or import.
    pub operation: Operation,
    /// Name of the record type being exported or imported.
    pub type_name: &'static str,
    /// Base sheet name on export; sheet name of the source grid on import, when known.
    pub sheet: Option<String>,
}

/// Stats reported on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarshalStats {
    /// Records written (export) or produced (import).
    pub records: usize,
    /// Grid pages written (export) or read (import, always 1).
    pub pages: usize,
}

/// Observer interface for export/import outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait MarshalObserver: Send + Sync {
    /// Called when the operation succeeds.
    fn on_success(&self, _ctx: &MarshalContext, _stats: MarshalStats) {}

    /// Called when the operation fails.
    fn on_failure(&self, _ctx: &MarshalContext, _severity: MarshalSeverity, _error: &MarshalError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &MarshalContext, severity: MarshalSeverity, error: &MarshalError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Fans out callbacks to a list of observers, in the order they were added.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn MarshalObserver>>,
}

impl CompositeObserver {
    /// Create a composite that notifies `observers` in iteration order.
    pub fn new(observers: impl IntoIterator<Item = Arc<dyn MarshalObserver>>) -> Self {
        Self {
            observers: observers.into_iter().collect(),
        }
    }

    /// Add one more observer, notified after the existing ones.
    pub fn with(mut self, observer: impl MarshalObserver + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Number of observers each event is forwarded to.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    fn each(&self, notify: impl Fn(&dyn MarshalObserver)) {
        self.observers.iter().for_each(|o| notify(o.as_ref()));
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl MarshalObserver for CompositeObserver {
    fn on_success(&self, ctx: &MarshalContext, stats: MarshalStats) {
        self.each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &MarshalContext, severity: MarshalSeverity, error: &MarshalError) {
        self.each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &MarshalContext, severity: MarshalSeverity, error: &MarshalError) {
        self.each(|o| o.on_alert(ctx, severity, error));
    }
}

/// Logs events to stderr, one line each.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl MarshalObserver for StdErrObserver {
    fn on_success(&self, ctx: &MarshalContext, stats: MarshalStats) {
        eprintln!(
            "[{}][ok] type={} sheet={} records={} pages={}",
            ctx.operation,
            ctx.type_name,
            sheet_label(ctx),
            stats.records,
            stats.pages
        );
    }

    fn on_failure(&self, ctx: &MarshalContext, severity: MarshalSeverity, error: &MarshalError) {
        eprintln!(
            "[{}][{:?}] type={} sheet={} err={}",
            ctx.operation,
            severity,
            ctx.type_name,
            sheet_label(ctx),
            error
        );
    }

    fn on_alert(&self, ctx: &MarshalContext, severity: MarshalSeverity, error: &MarshalError) {
        eprintln!(
            "[ALERT][{}][{:?}] type={} sheet={} err={}",
            ctx.operation,
            severity,
            ctx.type_name,
            sheet_label(ctx),
            error
        );
    }
}

/// Appends timestamped events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{} {line}", Local::now().format("%Y-%m-%dT%H:%M:%S%:z"));
        }
    }
}

impl MarshalObserver for FileObserver {
    fn on_success(&self, ctx: &MarshalContext, stats: MarshalStats) {
        self.append_line(&format!(
            "ok op={} type={} sheet={} records={} pages={}",
            ctx.operation,
            ctx.type_name,
            sheet_label(ctx),
            stats.records,
            stats.pages
        ));
    }

    fn on_failure(&self, ctx: &MarshalContext, severity: MarshalSeverity, error: &MarshalError) {
        self.append_line(&format!(
            "fail severity={:?} op={} type={} sheet={} err={}",
            severity,
            ctx.operation,
            ctx.type_name,
            sheet_label(ctx),
            error
        ));
    }

    fn on_alert(&self, ctx: &MarshalContext, severity: MarshalSeverity, error: &MarshalError) {
        self.append_line(&format!(
            "ALERT severity={:?} op={} type={} sheet={} err={}",
            severity,
            ctx.operation,
            ctx.type_name,
            sheet_label(ctx),
            error
        ));
    }
}

/// Forwards events to `tracing`: `info` on success, `warn`/`error` on failure by severity.
///
/// Alerts are emitted at `error` level with `alert = true`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl MarshalObserver for TracingObserver {
    fn on_success(&self, ctx: &MarshalContext, stats: MarshalStats) {
        tracing::info!(
            operation = %ctx.operation,
            type_name = ctx.type_name,
            sheet = sheet_label(ctx),
            records = stats.records,
            pages = stats.pages,
            "marshalling succeeded"
        );
    }

    fn on_failure(&self, ctx: &MarshalContext, severity: MarshalSeverity, error: &MarshalError) {
        if severity >= MarshalSeverity::Error {
            tracing::error!(
                operation = %ctx.operation,
                type_name = ctx.type_name,
                sheet = sheet_label(ctx),
                ?severity,
                error = %error,
                "marshalling failed"
            );
        } else {
            tracing::warn!(
                operation = %ctx.operation,
                type_name = ctx.type_name,
                sheet = sheet_label(ctx),
                ?severity,
                error = %error,
                "marshalling failed"
            );
        }
    }

    fn on_alert(&self, ctx: &MarshalContext, severity: MarshalSeverity, error: &MarshalError) {
        tracing::error!(
            alert = true,
            operation = %ctx.operation,
            type_name = ctx.type_name,
            sheet = sheet_label(ctx),
            ?severity,
            error = %error,
            "marshalling failure alert"
        );
    }
}

fn sheet_label(ctx: &MarshalContext) -> &str {
    ctx.sheet.as_deref().unwrap_or("-")
}
