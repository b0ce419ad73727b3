//! Counter-based termination signal.
//!
//! The operator stops a capture with Ctrl-C. Each interrupt increments a single
//! atomic counter; the acquisition loop only ever reads it:
//!
//! - `0`: running
//! - `1`: stop requested, finish the current record and finalize
//! - `2+`: exit requested, the chart window closes and the process ends
//!
//! The counter is only mutated by `fetch_add`, so notifications arriving while the
//! loop or the finalizer is busy are never lost.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use crate::error::AppResult;
use tracing::{debug, warn};

/// Counter value at which capture stops gracefully.
pub const STOP_REQUESTED: usize = 1;

/// Counter value at which the surrounding process should exit.
pub const EXIT_REQUESTED: usize = 2;

/// Process-wide interrupt counter shared between the listener and the loop.
#[derive(Debug, Clone, Default)]
pub struct TerminationSignal {
    count: Arc<AtomicUsize>,
}

impl TerminationSignal {
    /// A fresh signal with the counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one interrupt and returns the new count.
    pub fn notify(&self) -> usize {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Number of interrupts received so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// True once the first interrupt has arrived.
    pub fn stop_requested(&self) -> bool {
        self.count() >= STOP_REQUESTED
    }

    /// True once a second interrupt has arrived.
    pub fn exit_requested(&self) -> bool {
        self.count() >= EXIT_REQUESTED
    }

    /// Blocks the calling thread until [`exit_requested`](Self::exit_requested).
    pub fn wait_for_exit(&self, poll: Duration) {
        while !self.exit_requested() {
            std::thread::sleep(poll);
        }
    }
}

/// Forwards every Ctrl-C received by the process to `signal`.
///
/// The OS handler is registered before this returns and stays registered for
/// the life of the process, replacing the default "terminate on SIGINT"
/// behaviour. Call it once, after the setup prompts.
pub fn listen_for_interrupts(
    runtime: &Handle,
    signal: TerminationSignal,
) -> AppResult<JoinHandle<()>> {
    let mut interrupts = {
        let _guard = runtime.enter();
        interrupt_stream()?
    };

    Ok(runtime.spawn(async move {
        while interrupts.recv().await.is_some() {
            let count = signal.notify();
            debug!(count, "interrupt received");
        }
        warn!("interrupt stream closed");
    }))
}

#[cfg(unix)]
fn interrupt_stream() -> std::io::Result<tokio::signal::unix::Signal> {
    use tokio::signal::unix::{signal, SignalKind};
    signal(SignalKind::interrupt())
}

#[cfg(windows)]
fn interrupt_stream() -> std::io::Result<tokio::signal::windows::CtrlC> {
    tokio::signal::windows::ctrl_c()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_running() {
        let signal = TerminationSignal::new();
        assert_eq!(signal.count(), 0);
        assert!(!signal.stop_requested());
        assert!(!signal.exit_requested());
    }

    #[test]
    fn test_first_notify_stops_second_exits() {
        let signal = TerminationSignal::new();
        assert_eq!(signal.notify(), 1);
        assert!(signal.stop_requested());
        assert!(!signal.exit_requested());

        assert_eq!(signal.notify(), 2);
        assert!(signal.exit_requested());
    }

    #[test]
    fn test_clones_share_counter() {
        let signal = TerminationSignal::new();
        let handler_side = signal.clone();
        handler_side.notify();
        assert!(signal.stop_requested());
    }

    #[test]
    fn test_wait_for_exit_returns_after_second_notify() {
        let signal = TerminationSignal::new();
        signal.notify();
        let notifier = signal.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            notifier.notify();
        });
        signal.wait_for_exit(Duration::from_millis(5));
        assert!(signal.exit_requested());
        handle.join().unwrap();
    }
}
