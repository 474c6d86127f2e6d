//! Command kinds tenants register.

use std::fmt;
use std::sync::Arc;

use herald_invocation::{CommandResult, ContextBuilder, ExecutionError, SyntaxError};

use crate::cause::CommandCause;

/// A command backed by an argument tree.
///
/// `parse` walks the text after the alias and records matched nodes,
/// arguments and the terminal executable on the builder. The managed
/// registrar builds and executes the result.
pub trait ParameterizedCommand: Send + Sync {
	fn parse(&self, args: &str, builder: &mut ContextBuilder<CommandCause>) -> Result<(), SyntaxError>;

	fn suggestions(&self, _cause: &CommandCause, _args: &str) -> Vec<String> {
		Vec::new()
	}
}

/// A command that handles its argument text itself.
pub trait RawCommand: Send + Sync {
	fn process(&self, cause: &CommandCause, args: &str) -> Result<CommandResult, ExecutionError>;

	fn suggestions(&self, _cause: &CommandCause, _args: &str) -> Vec<String> {
		Vec::new()
	}
}

impl<F> RawCommand for F
where
	F: Fn(&CommandCause, &str) -> Result<CommandResult, ExecutionError> + Send + Sync,
{
	fn process(&self, cause: &CommandCause, args: &str) -> Result<CommandResult, ExecutionError> {
		self(cause, args)
	}
}

/// A command of either kind, routed to its registrar once at registration.
#[derive(Clone)]
pub enum Command {
	Parameterized(Arc<dyn ParameterizedCommand>),
	Raw(Arc<dyn RawCommand>),
}

impl Command {
	pub fn parameterized(command: impl ParameterizedCommand + 'static) -> Self {
		Self::Parameterized(Arc::new(command))
	}

	pub fn raw(command: impl RawCommand + 'static) -> Self {
		Self::Raw(Arc::new(command))
	}

	pub fn kind(&self) -> &'static str {
		match self {
			Self::Parameterized(_) => "parameterized",
			Self::Raw(_) => "raw",
		}
	}
}

impl fmt::Debug for Command {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Command::{}", self.kind())
	}
}
