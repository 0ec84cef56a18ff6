/*!
 * Cancellation Tests
 * Forced termination of blocked workers and post-teardown accessors
 */

use pretty_assertions::assert_eq;
use signal_thread::runtime::{Isolate, IsolateRuntime, Value};
use signal_thread::signals::{stats, MaskController, WaitEngine};
use signal_thread::SignalThread;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    done()
}

/// Block that waits for a signal nobody sends
fn blocked_forever() -> Value {
    Value::block(|iso, _| {
        WaitEngine::wait_once(libc::SIGWINCH)
            .map(|_| Value::Nil)
            .map_err(|err| iso.rescue(err))
    })
}

#[test]
fn test_cancel_blocked_worker() {
    let mut host = Isolate::new();
    let handle = SignalThread::spawn(&IsolateRuntime, &host, &blocked_forever(), &[]).unwrap();
    thread::sleep(Duration::from_millis(50));
    assert!(handle.is_alive());

    let started = Instant::now();
    let result = handle.cancel(&mut host).unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(result, Some(Value::symbol("canceled")));

    assert!(!handle.is_alive());
    assert_eq!(handle.thread_id(), None);
    assert_eq!(handle.failed(), None);
    assert_eq!(handle.exception(&mut host), None);
    assert_eq!(handle.kill(&mut host, "WINCH").unwrap(), None);
    assert_eq!(handle.join(&mut host).unwrap(), Some(Value::symbol("canceled")));
}

#[test]
fn test_cancel_is_idempotent() {
    let mut host = Isolate::new();
    let handle = SignalThread::spawn(&IsolateRuntime, &host, &blocked_forever(), &[]).unwrap();

    assert!(handle.cancel(&mut host).unwrap().is_some());
    assert_eq!(handle.cancel(&mut host).unwrap(), None);
    assert_eq!(handle.clone().cancel(&mut host).unwrap(), None);
}

#[test]
fn test_cancel_before_worker_reaches_wait() {
    let mut host = Isolate::new();
    let handle = SignalThread::spawn(&IsolateRuntime, &host, &blocked_forever(), &[]).unwrap();

    // No settling delay: the request is deferred to the wait call
    assert_eq!(
        handle.cancel(&mut host).unwrap(),
        Some(Value::symbol("canceled"))
    );
}

#[test]
fn test_cancel_finished_worker_is_noop() {
    let mut host = Isolate::new();
    let done = Value::block(|_, _| Ok(Value::Int(1)));
    let handle = SignalThread::spawn(&IsolateRuntime, &host, &done, &[]).unwrap();
    assert!(wait_until(Duration::from_secs(5), || !handle.is_alive()));

    assert_eq!(handle.cancel(&mut host).unwrap(), None);
    assert_eq!(handle.failed(), Some(false));
    assert_eq!(handle.join(&mut host).unwrap(), Some(Value::Int(1)));
}

#[test]
fn test_cancel_trap_resets_caller_mask() {
    let mut host = Isolate::new();
    let noop = Value::block(|_, _| Ok(Value::Nil));

    let handle = SignalThread::trap(&IsolateRuntime, &host, "USR1", &noop, &[]).unwrap();
    assert!(MaskController::is_blocked(libc::SIGUSR1).unwrap());

    let canceled_before = stats().threads_canceled;
    assert_eq!(
        handle.cancel(&mut host).unwrap(),
        Some(Value::symbol("canceled"))
    );
    assert!(stats().threads_canceled > canceled_before);
    assert_eq!(MaskController::current().unwrap(), Vec::<i32>::new());
}

#[test]
fn test_cancel_clears_mask_of_sibling_trap() {
    let mut host = Isolate::new();
    let noop = Value::block(|_, _| Ok(Value::Nil));
    let usr2 = Arc::new(AtomicUsize::new(0));
    let count = Arc::clone(&usr2);
    let counter = Value::block(move |_, _| {
        count.fetch_add(1, Ordering::SeqCst);
        Ok(Value::Nil)
    });

    let first = SignalThread::trap(&IsolateRuntime, &host, "USR1", &noop, &[]).unwrap();
    let second = SignalThread::trap(&IsolateRuntime, &host, "USR2", &counter, &[]).unwrap();
    assert!(MaskController::is_blocked(libc::SIGUSR2).unwrap());

    assert!(first.cancel(&mut host).unwrap().is_some());
    // The whole caller mask is gone, the sibling worker is not
    assert!(!MaskController::is_blocked(libc::SIGUSR2).unwrap());
    assert!(second.is_alive());

    // The worker keeps its own mask and still traps deliveries
    second.kill(&mut host, "USR2").unwrap();
    assert!(wait_until(Duration::from_secs(5), || usr2.load(Ordering::SeqCst) == 1));
    assert!(second.cancel(&mut host).unwrap().is_some());
}

#[test]
fn test_dropping_handles_of_running_worker() {
    let mut host = Isolate::new();
    let handle = SignalThread::spawn(&IsolateRuntime, &host, &blocked_forever(), &[]).unwrap();
    let keeper = handle.clone();
    drop(handle);

    assert!(keeper.is_alive());
    assert!(keeper.cancel(&mut host).unwrap().is_some());
}
