//! Registrars own the commands behind mappings.
//!
//! The registry resolves aliases; a registrar turns a resolved mapping plus
//! argument text into a result or suggestions. [`ManagedRegistrar`] handles
//! argument-tree commands, [`RawRegistrar`] handles commands that parse their
//! own text. Embedders may supply further registrars through
//! [`CommandRegistry::register_alias`](crate::CommandRegistry::register_alias).

use std::sync::Arc;

use herald_invocation::CommandResult;

use crate::cause::CommandCause;
use crate::error::CommandError;
use crate::mapping::CommandMapping;

mod managed;
mod raw;

pub use managed::ManagedRegistrar;
pub use raw::RawRegistrar;

/// Executes and completes commands for the mappings it owns.
pub trait CommandRegistrar: Send + Sync {
	/// Stable identifier used in logs.
	fn id(&self) -> &str;

	/// Runs `mapping` with the text that followed its alias.
	fn process(&self, cause: &CommandCause, mapping: &CommandMapping, args: &str) -> Result<CommandResult, CommandError>;

	/// Completions for the text that followed the alias.
	fn suggestions(&self, cause: &CommandCause, mapping: &CommandMapping, args: &str) -> Vec<String>;

	/// Releases whatever the registrar holds for `mapping`.
	fn unregister(&self, mapping: &CommandMapping);
}

/// Shared registrar handle.
pub type RegistrarRef = Arc<dyn CommandRegistrar>;
