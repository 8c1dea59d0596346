//! Host error slots.

use std::panic::PanicHookInfo;
use std::sync::Arc;

use crate::report::ErrorReport;
use crate::tap::ErrorHandler;

/// The host runtime's single process-wide error slot.
pub trait HostHook {
    /// Handler representation the host stores natively.
    type Handler: Clone;

    /// The handler currently installed.
    fn current(&mut self) -> Self::Handler;

    /// Replaces the installed handler.
    fn set(&mut self, handler: Self::Handler);

    /// Wraps an [`ErrorHandler`] into the host's representation.
    fn adapt(&self, handler: ErrorHandler) -> Self::Handler;
}

// ---------------------------------------------------------------------------
// ManualHook
// ---------------------------------------------------------------------------

/// Slot for hosts that deliver errors themselves by calling [`fire`](Self::fire).
#[derive(Clone, Default)]
pub struct ManualHook {
    active: Option<ErrorHandler>,
}

impl ManualHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `handler` already installed.
    pub fn with_handler(handler: ErrorHandler) -> Self {
        Self {
            active: Some(handler),
        }
    }

    pub fn active(&self) -> Option<&ErrorHandler> {
        self.active.as_ref()
    }

    /// Delivers an uncaught error. Returns whether default reporting is
    /// suppressed; `false` when no handler is installed.
    pub fn fire(&self, report: &ErrorReport) -> bool {
        self.active.as_ref().is_some_and(|handler| handler(report))
    }
}

impl std::fmt::Debug for ManualHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualHook")
            .field("installed", &self.active.is_some())
            .finish()
    }
}

impl HostHook for ManualHook {
    type Handler = Option<ErrorHandler>;

    fn current(&mut self) -> Self::Handler {
        self.active.clone()
    }

    fn set(&mut self, handler: Self::Handler) {
        self.active = handler;
    }

    fn adapt(&self, handler: ErrorHandler) -> Self::Handler {
        Some(handler)
    }
}

// ---------------------------------------------------------------------------
// PanicHook
// ---------------------------------------------------------------------------

type PanicHandler = Arc<dyn Fn(&PanicHookInfo<'_>) + Send + Sync + 'static>;

/// Drives the standard library panic hook.
///
/// The hook installed when this is created doubles as the default reporter:
/// adapted handlers that do not suppress reporting forward the panic to it.
pub struct PanicHook {
    default: PanicHandler,
}

impl PanicHook {
    /// Must not be called while the current thread is panicking.
    pub fn new() -> Self {
        let mut hook = Self {
            default: Arc::new(|_: &PanicHookInfo<'_>| {}),
        };
        hook.default = hook.current();
        hook
    }
}

impl Default for PanicHook {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PanicHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanicHook").finish_non_exhaustive()
    }
}

impl HostHook for PanicHook {
    type Handler = PanicHandler;

    fn current(&mut self) -> Self::Handler {
        // take_hook leaves the std default behind, so put the taken hook back.
        let taken: PanicHandler = Arc::from(std::panic::take_hook());
        let reinstall = Arc::clone(&taken);
        std::panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| reinstall(info)));
        taken
    }

    fn set(&mut self, handler: Self::Handler) {
        std::panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| handler(info)));
    }

    fn adapt(&self, handler: ErrorHandler) -> Self::Handler {
        let default = Arc::clone(&self.default);
        Arc::new(move |info: &PanicHookInfo<'_>| {
            let report = ErrorReport::from_panic(info);
            if !handler(&report) {
                default(info);
            }
        })
    }
}
