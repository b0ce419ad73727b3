//! Interrupt counting across threads and its effect on the capture loop.

mod common;

use common::{data, ScriptedChannel, Step};
use serial_capture::capture::{Capture, CaptureSession};
use serial_capture::signal::{listen_for_interrupts, TerminationSignal};
use std::io::{self, ErrorKind, Read};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::tempdir;

#[test]
fn test_concurrent_notifications_are_not_lost() {
    let signal = TerminationSignal::new();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let signal = signal.clone();
            thread::spawn(move || {
                for _ in 0..1000 {
                    signal.notify();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(signal.count(), 8000);
    assert!(signal.exit_requested());
}

#[test]
fn test_notify_returns_running_count() {
    let signal = TerminationSignal::new();
    assert_eq!(signal.notify(), 1);
    assert!(signal.stop_requested());
    assert!(!signal.exit_requested());
    assert_eq!(signal.notify(), 2);
    assert!(signal.exit_requested());
}

#[cfg(unix)]
#[test]
fn test_each_sigint_counts_once() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let signal = TerminationSignal::new();
    let _listener = listen_for_interrupts(runtime.handle(), signal.clone()).unwrap();
    let pid = std::process::id().to_string();

    for expected in 1..=2 {
        let status = std::process::Command::new("kill")
            .args(["-INT", &pid])
            .status()
            .unwrap();
        assert!(status.success());

        let deadline = Instant::now() + Duration::from_secs(5);
        while signal.count() < expected && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(signal.count(), expected);
    }
    assert!(signal.exit_requested());

    runtime.shutdown_background();
}

#[test]
fn test_idle_line_polls_until_interrupt() {
    let dir = tempdir().unwrap();
    let signal = TerminationSignal::new();
    let mut steps = vec![Step::Timeout; 100];
    steps.push(Step::Interrupt);
    steps.push(Step::Timeout);
    let channel = ScriptedChannel::new(steps, &signal);

    let captured = Capture::new(CaptureSession::new(dir.path().join("idle.csv")), 0)
        .run(channel, &signal, Vec::new())
        .unwrap();

    assert!(captured.dataset.is_empty());
    assert_eq!(signal.count(), 1);
}

#[test]
fn test_double_interrupt_in_one_read_still_stops() {
    let dir = tempdir().unwrap();
    let signal = TerminationSignal::new();
    let steps = vec![
        data(b"1,"),
        Step::Interrupt,
        Step::Interrupt,
        data(b"2\r\n"),
        data(b"3,4\r\n"),
    ];
    let channel = ScriptedChannel::new(steps, &signal);

    let captured = Capture::new(CaptureSession::new(dir.path().join("run.csv")), 0)
        .run(channel, &signal, Vec::new())
        .unwrap();

    assert_eq!(captured.dataset.len(), 1);
    assert_eq!(signal.count(), 2);
}

#[test]
fn test_interrupt_from_another_thread_stops_capture() {
    let dir = tempdir().unwrap();
    let signal = TerminationSignal::new();
    let remote = signal.clone();
    let interrupter = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        remote.notify();
    });

    let channel = IdleAfter {
        data: b"1,2\r\n".to_vec(),
    };

    let captured = Capture::new(CaptureSession::new(dir.path().join("run.csv")), 0)
        .run(channel, &signal, Vec::new())
        .unwrap();
    interrupter.join().unwrap();

    assert_eq!(captured.dataset.len(), 1);
    assert_eq!(signal.count(), 1);
}

#[test]
fn test_wait_for_exit_returns_after_second_interrupt() {
    let signal = TerminationSignal::new();
    signal.notify();
    let remote = signal.clone();
    let interrupter = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        remote.notify();
    });

    signal.wait_for_exit(Duration::from_millis(5));
    interrupter.join().unwrap();
    assert!(signal.exit_requested());
}

/// Sends its data once, then times out every millisecond forever.
struct IdleAfter {
    data: Vec<u8>,
}

impl Read for IdleAfter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.data.is_empty() {
            thread::sleep(Duration::from_millis(1));
            return Err(io::Error::from(ErrorKind::TimedOut));
        }
        let n = self.data.len().min(buf.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data.drain(..n);
        Ok(n)
    }
}
