//! Uncaught error interception for eventlog.
//!
//! An [`ErrorTapState`] drives the host's single error slot (a [`HostHook`]).
//! It snapshots whatever handler was installed when it was created, and can
//! switch between that original, a caller-supplied handler, and an adapter
//! that records the error as an event and exports the log.

mod hook;
mod report;
mod tap;

pub use hook::{HostHook, ManualHook, PanicHook};
pub use report::ErrorReport;
pub use tap::{ErrorHandler, ErrorTapState, TapOptions, TapState, log_adapter};
