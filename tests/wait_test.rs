/*!
 * Wait Engine Tests
 * Single-shot waits, info snapshots and loop preconditions
 */

use pretty_assertions::assert_eq;
use signal_thread::runtime::{Isolate, Value};
use signal_thread::signals::*;
use signal_thread::{kill_by_thread_id, SignalError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

fn self_id() -> u64 {
    unsafe { libc::pthread_self() as usize as u64 }
}

#[test]
fn test_wait_once_consumes_delivery() {
    let (tx, rx) = mpsc::channel();
    let waiter = thread::spawn(move || {
        // Blocked before the id is published, so an early delivery stays pending
        mask("USR1")?;
        tx.send(self_id()).unwrap();
        WaitEngine::wait_once(libc::SIGUSR1)
    });

    let raw = rx.recv().unwrap();
    assert_eq!(unsafe { kill_by_thread_id(raw, "USR1") }.unwrap(), 0);
    assert_eq!(waiter.join().unwrap().unwrap(), libc::SIGUSR1);
}

#[test]
fn test_wait_info_once_snapshot() {
    let (tx, rx) = mpsc::channel();
    let waiter = thread::spawn(move || {
        mask("USR2")?;
        tx.send(self_id()).unwrap();
        WaitEngine::wait_info_once(libc::SIGUSR2)
    });

    let raw = rx.recv().unwrap();
    unsafe { kill_by_thread_id(raw, libc::SIGUSR2) }.unwrap();
    let info = waiter.join().unwrap().unwrap();
    assert_eq!(info.signo, libc::SIGUSR2);
    #[cfg(target_os = "linux")]
    assert_eq!(info.pid, std::process::id() as i32);
}

#[test]
fn test_waitinfo_without_callback_returns_value() {
    let (tx, rx) = mpsc::channel();
    let waiter = thread::spawn(move || {
        let mut iso = Isolate::new();
        mask("HUP")?;
        tx.send(self_id()).unwrap();
        waitinfo(&mut iso, "SIGHUP", None)
    });

    let raw = rx.recv().unwrap();
    unsafe { kill_by_thread_id(raw, "HUP") }.unwrap();
    let value = waiter.join().unwrap().unwrap();
    assert_eq!(value.as_siginfo().map(|info| info.signo), Some(libc::SIGHUP));
}

#[test]
fn test_waitinfo_loop_passes_snapshots() {
    let (tx, rx) = mpsc::channel();
    let waiter = thread::spawn(move || {
        let mut iso = Isolate::new();
        // Stops the loop on the first delivery
        let stop = Value::block(|_, args| {
            let signo = args[0].as_siginfo().map(|info| info.signo).unwrap_or(-1);
            Err(Value::exception("StopIteration", signo.to_string()))
        });
        mask("USR1").unwrap();
        tx.send(self_id()).unwrap();
        let err = waitinfo(&mut iso, "USR1", Some(&stop)).unwrap_err();
        (err, iso.take_exception())
    });

    let raw = rx.recv().unwrap();
    unsafe { kill_by_thread_id(raw, "USR1") }.unwrap();
    let (err, exception) = waiter.join().unwrap();
    assert_eq!(err, SignalError::Raised);
    let exception = exception.unwrap();
    assert_eq!(
        exception.as_exception(),
        Some(("StopIteration", libc::SIGUSR1.to_string().as_str()))
    );
}

#[test]
fn test_wait_loop_calls_back_once_per_delivery() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let (tx, rx) = mpsc::channel();
    let waiter = thread::spawn(move || {
        let mut iso = Isolate::new();
        // Second delivery ends the loop
        let callback = Value::block(move |_, args| {
            assert!(args.is_empty());
            match seen.fetch_add(1, Ordering::SeqCst) + 1 {
                2 => Err(Value::exception("StopIteration", "done")),
                _ => Ok(Value::Nil),
            }
        });
        mask("USR1").unwrap();
        tx.send(self_id()).unwrap();
        let err = wait(&mut iso, "USR1", &callback).unwrap_err();
        (err, iso.take_exception())
    });

    let raw = rx.recv().unwrap();
    unsafe { kill_by_thread_id(raw, "USR1") }.unwrap();
    // Standard signals coalesce while pending, so send the next one only
    // after the first has been dispatched
    let deadline = Instant::now() + Duration::from_secs(5);
    while calls.load(Ordering::SeqCst) < 1 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    unsafe { kill_by_thread_id(raw, "USR1") }.unwrap();

    let (err, exception) = waiter.join().unwrap();
    assert_eq!(err, SignalError::Raised);
    assert_eq!(
        exception.as_ref().and_then(Value::as_exception),
        Some(("StopIteration", "done"))
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_loops_require_a_block() {
    let mut iso = Isolate::new();
    let native = Value::native(|_| Value::Nil);

    let err = wait(&mut iso, "USR1", &native).unwrap_err();
    assert!(err.is_runtime());
    assert!(err.to_string().contains("require defined block"));

    let err = waitinfo(&mut iso, "USR1", Some(&native)).unwrap_err();
    assert!(err.is_runtime());

    // Rejected before anything was masked
    assert!(!MaskController::is_blocked(libc::SIGUSR1).unwrap());
}

#[test]
fn test_wait_rejects_bad_identifiers() {
    let mut iso = Isolate::new();
    let block = Value::block(|_, _| Ok(Value::Nil));
    assert!(wait(&mut iso, "BOGUS", &block).unwrap_err().is_invalid_argument());
    assert!(waitinfo(&mut iso, 100_000, None).unwrap_err().is_invalid_argument());
    assert!(WaitEngine::wait_once(0).unwrap_err().is_runtime());
}
