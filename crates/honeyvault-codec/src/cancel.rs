//! Cooperative cancellation for long-running encode/decode calls (spec.md
//! §5: "surface an Aborted error if the caller's cancellation token fires
//! between symbols").

use std::sync::atomic::{AtomicBool, Ordering};

pub trait CancelToken: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

/// The default: never cancels. Use when the caller has no cancellation
/// mechanism of its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverCancel;

impl CancelToken for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl CancelToken for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}
