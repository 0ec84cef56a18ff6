/*!
 * Signal Thread Builder
 * Builder pattern for configured worker spawns
 */

use super::config::ThreadConfig;
use super::context::ThreadContext;
use super::lifecycle::SignalThread;
use super::spawn::{start_worker, WorkerBody, WorkerStart};
use crate::core::errors::{SignalError, SignalResult};
use crate::runtime::{Interpreter, ScriptRuntime};
use crate::signals::{resolve, MaskController, SignalId, SignalTable};
use std::sync::Arc;
use tracing::info;

/// Builder for SignalThread
#[derive(Debug, Clone, Default)]
pub struct SignalThreadBuilder {
    config: ThreadConfig,
}

impl SignalThreadBuilder {
    /// Create a builder with environment-derived defaults
    pub fn new() -> Self {
        Self {
            config: ThreadConfig::from_env(),
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: ThreadConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the worker name prefix
    pub fn with_name(mut self, prefix: impl Into<String>) -> Self {
        self.config.name_prefix = prefix.into();
        self
    }

    /// Set the worker stack size in bytes
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    pub fn config(&self) -> &ThreadConfig {
        &self.config
    }

    /// Run `callable(args...)` on a new worker with its own interpreter
    pub fn spawn<R>(
        &self,
        runtime: &R,
        host: &R::Interpreter,
        callable: &<R::Interpreter as Interpreter>::Value,
        args: &[<R::Interpreter as Interpreter>::Value],
    ) -> SignalResult<SignalThread<R::Interpreter>>
    where
        R: ScriptRuntime,
    {
        let mut worker = runtime.open()?;
        let callable = host.migrate(callable, &mut worker);
        let args = args.iter().map(|arg| host.migrate(arg, &mut worker)).collect();

        self.launch(worker, WorkerBody::Call { callable, args })
    }

    /// Block `signal` here, then run `callback(args...)` on a new worker for
    /// every delivery of it
    ///
    /// The worker inherits the blocked mask, so deliveries sent right after
    /// this returns stay pending until the worker starts waiting.
    pub fn trap<R>(
        &self,
        runtime: &R,
        host: &R::Interpreter,
        signal: impl Into<SignalId>,
        callback: &<R::Interpreter as Interpreter>::Value,
        args: &[<R::Interpreter as Interpreter>::Value],
    ) -> SignalResult<SignalThread<R::Interpreter>>
    where
        R: ScriptRuntime,
    {
        let signal = resolve(signal)?;
        if !host.is_block(callback) {
            return Err(SignalError::runtime("trap", "require defined block"));
        }
        MaskController::block(signal)?;

        let mut worker = runtime.open()?;
        let callback = host.migrate(callback, &mut worker);
        let args = args.iter().map(|arg| host.migrate(arg, &mut worker)).collect();

        let handle = self.launch(
            worker,
            WorkerBody::Trap {
                signal,
                callback,
                args,
            },
        )?;
        info!(
            context = handle.context_id(),
            signal = %SignalTable::describe(signal),
            "Trap installed"
        );
        Ok(handle)
    }

    fn launch<I: Interpreter>(
        &self,
        interpreter: I,
        body: WorkerBody<I::Value>,
    ) -> SignalResult<SignalThread<I>> {
        let context = Arc::new(ThreadContext::new());
        start_worker(
            &self.config,
            WorkerStart {
                context: Arc::clone(&context),
                interpreter,
                body,
            },
        )?;
        Ok(SignalThread::from_context(context))
    }
}
