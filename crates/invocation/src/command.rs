//! Leaf commands and the tenant executor boundary.
//!
//! The execution engine only understands [`Command`]: something that runs
//! against a built [`Context`] and reports [`CommandStatus`]. Tenants write
//! [`CommandExecutor`]s instead, which return domain results and errors; the
//! [`ExecutorAdapter`] turns those into statuses and sends failures to the
//! command source so nothing propagates into dispatch.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::context::Context;
use crate::error::ExecutionError;
use crate::result::CommandResult;

/// Prefix for every failure report sent to a source.
pub const ERROR_PREFIX: &str = "Error running command: ";

/// Caller identity threaded through parsing and execution.
pub trait CommandSource: Clone + Send + Sync + 'static {
	/// Delivers a user-visible failure message to whoever issued the command.
	fn send_error(&self, message: &str);
}

/// Status of one leaf execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
	/// Ran to completion with the given result value.
	Success(i32),
	/// Failed; the failure has already been reported to the source.
	Failed,
}

/// Executable attached to a terminal tree node.
pub trait Command<S>: Send + Sync {
	fn run(&self, context: &Context<S>) -> CommandStatus;
}

impl<S, F> Command<S> for F
where
	F: Fn(&Context<S>) -> CommandStatus + Send + Sync,
{
	fn run(&self, context: &Context<S>) -> CommandStatus {
		self(context)
	}
}

/// Shared handle to a leaf command.
pub type CommandRef<S> = Arc<dyn Command<S>>;

/// Maps a context to the sources its continuation runs as.
///
/// A forking node may yield any number of sources; a plain redirect must
/// yield exactly one.
pub type RedirectModifier<S> = Arc<dyn Fn(&Context<S>) -> Result<Vec<S>, ExecutionError> + Send + Sync>;

/// Tenant-supplied command body.
pub trait CommandExecutor<S>: Send + Sync {
	fn execute(&self, context: &Context<S>) -> Result<CommandResult, ExecutionError>;
}

impl<S, F> CommandExecutor<S> for F
where
	F: Fn(&Context<S>) -> Result<CommandResult, ExecutionError> + Send + Sync,
{
	fn execute(&self, context: &Context<S>) -> Result<CommandResult, ExecutionError> {
		self(context)
	}
}

/// Adapts a [`CommandExecutor`] to the [`Command`] shape.
///
/// Errors, non-success results and panics raised by the executor are sent to
/// the context's source and become [`CommandStatus::Failed`].
pub struct ExecutorAdapter<S> {
	executor: Arc<dyn CommandExecutor<S>>,
}

impl<S: CommandSource> ExecutorAdapter<S> {
	pub fn new(executor: impl CommandExecutor<S> + 'static) -> Self {
		Self {
			executor: Arc::new(executor),
		}
	}

	/// Wraps the adapter into a shareable command handle.
	pub fn into_command(self) -> CommandRef<S> {
		Arc::new(self)
	}
}

impl<S: CommandSource> Command<S> for ExecutorAdapter<S> {
	fn run(&self, context: &Context<S>) -> CommandStatus {
		match catch_unwind(AssertUnwindSafe(|| self.executor.execute(context))) {
			Ok(Ok(result)) => match result.error_message() {
				None => CommandStatus::Success(result.result()),
				Some(message) => {
					report_failure(context.source(), message);
					CommandStatus::Failed
				}
			},
			Ok(Err(error)) => {
				tracing::debug!(input = context.input(), error = %error, "command executor failed");
				report_failure(context.source(), &error.to_string());
				CommandStatus::Failed
			}
			Err(payload) => {
				let message = panic_message(payload.as_ref());
				tracing::error!(input = context.input(), panic = %message, "command executor panicked");
				report_failure(context.source(), &message);
				CommandStatus::Failed
			}
		}
	}
}

/// Sends `message` to `source` with the standard failure prefix.
pub fn report_failure<S: CommandSource>(source: &S, message: &str) {
	source.send_error(&format!("{ERROR_PREFIX}{message}"));
}

/// Best-effort text of a caught panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"internal error".to_string()
	}
}
