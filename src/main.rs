/*!
 * sigtrap - Signal Thread Demo
 *
 * Traps a signal on a worker thread and prints the trap arguments every time
 * it arrives:
 *
 *   sigtrap [SIGNAL] [ARGS...]      (defaults: HUP hoge fuga)
 *
 * Send it with `kill -HUP <pid>`; the main thread logs counters every second.
 */

use miette::IntoDiagnostic;
use signal_thread::{init_tracing, stats, Isolate, IsolateRuntime, SignalThread, Value};
use std::time::Duration;
use tracing::info;

fn main() -> miette::Result<()> {
    init_tracing();

    let mut argv = std::env::args().skip(1);
    let signal = argv.next().unwrap_or_else(|| "HUP".to_string());
    let mut args: Vec<Value> = argv.map(Value::Str).collect();
    if args.is_empty() {
        args = vec![Value::Str("hoge".into()), Value::Str("fuga".into())];
    }

    let host = Isolate::new();
    let callback = Value::block(|_, args| {
        for arg in args {
            println!("{:?}", arg);
        }
        Ok(Value::Nil)
    });

    let handle = SignalThread::trap(&IsolateRuntime, &host, signal.as_str(), &callback, &args)?;
    info!(
        pid = std::process::id(),
        signal = %signal,
        thread_id = ?handle.thread_id(),
        "wait..."
    );

    loop {
        std::thread::sleep(Duration::from_secs(1));
        let snapshot = serde_json::to_string(&stats()).into_diagnostic()?;
        info!(stats = %snapshot, alive = handle.is_alive(), "tick");
    }
}
