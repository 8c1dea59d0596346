use std::sync::{Arc, TryLockError};

use eventlog_codec::{Destination, LogLevel};
use eventlog_store::{EventLogger, SharedLogger};

use crate::hook::HostHook;
use crate::report::ErrorReport;

/// Handles an uncaught error. Returning `true` suppresses the host's default
/// error reporting.
pub type ErrorHandler = Arc<dyn Fn(&ErrorReport) -> bool + Send + Sync>;

/// Which handler currently occupies the host slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapState {
    /// The handler captured at construction.
    Disabled,
    /// A caller-supplied handler.
    CustomActive,
    /// The log-and-export adapter.
    AdapterActive,
}

/// How [`ErrorTapState::enable`] behaves without a custom handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TapOptions {
    /// Install the log-and-export adapter.
    pub export_on_error: bool,
    /// Value the adapter returns to the host.
    pub suppress_error_alerts: bool,
}

/// Owner of the host error slot.
pub struct ErrorTapState<H: HostHook> {
    hook: H,
    original: H::Handler,
    state: TapState,
}

impl<H: HostHook> ErrorTapState<H> {
    /// Takes over `hook`, remembering the handler installed right now.
    pub fn new(mut hook: H) -> Self {
        let original = hook.current();
        Self {
            hook,
            original,
            state: TapState::Disabled,
        }
    }

    /// Installs `custom` if given, else the adapter when
    /// `options.export_on_error` is set, else resets.
    ///
    /// Calling this again simply replaces the active handler.
    pub fn enable(
        &mut self,
        options: TapOptions,
        custom: Option<ErrorHandler>,
        logger: &SharedLogger,
    ) -> TapState {
        if let Some(handler) = custom {
            let adapted = self.hook.adapt(handler);
            self.hook.set(adapted);
            self.state = TapState::CustomActive;
        } else if options.export_on_error {
            let adapter = log_adapter(Arc::clone(logger), options.suppress_error_alerts);
            let adapted = self.hook.adapt(adapter);
            self.hook.set(adapted);
            self.state = TapState::AdapterActive;
        } else {
            self.reset();
        }
        tracing::debug!(state = ?self.state, "error tap updated");
        self.state
    }

    /// Reinstalls the handler captured at construction.
    pub fn reset(&mut self) {
        self.hook.set(self.original.clone());
        self.state = TapState::Disabled;
    }

    pub fn state(&self) -> TapState {
        self.state
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    /// The handler captured at construction.
    pub fn original(&self) -> &H::Handler {
        &self.original
    }
}

impl<H: HostHook + std::fmt::Debug> std::fmt::Debug for ErrorTapState<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorTapState")
            .field("hook", &self.hook)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Handler that records the error at `Error` level to console and store,
/// exports the log, and returns `suppress`.
///
/// If the logger is locked by the thread that raised the error, the event is
/// dropped with a diagnostic instead of deadlocking.
pub fn log_adapter(logger: SharedLogger, suppress: bool) -> ErrorHandler {
    Arc::new(move |report: &ErrorReport| {
        let message = report.describe();
        match logger.try_lock() {
            Ok(mut guard) => record(&mut guard, &message),
            Err(TryLockError::Poisoned(poisoned)) => record(&mut poisoned.into_inner(), &message),
            Err(TryLockError::WouldBlock) => {
                tracing::error!(error = %message, "event logger busy, uncaught error not recorded");
            }
        }
        suppress
    })
}

fn record(logger: &mut EventLogger, message: &str) {
    logger.append(LogLevel::Error, message, Destination::Both);
    if let Err(err) = logger.export_all() {
        tracing::warn!(error = %err, "export after uncaught error failed");
    }
}
