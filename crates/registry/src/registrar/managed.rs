use std::sync::Arc;

use herald_invocation::{CommandResult, ContextBuilder, execute};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::CommandRegistrar;
use crate::cause::CommandCause;
use crate::command::ParameterizedCommand;
use crate::error::CommandError;
use crate::mapping::{CommandMapping, MappingId};

/// Registrar for argument-tree commands.
///
/// Each invocation gets a fresh [`ContextBuilder`] rooted at the mapping's
/// primary alias; the command parses into it and the built context runs
/// through the execution engine.
#[derive(Default)]
pub struct ManagedRegistrar {
	commands: RwLock<FxHashMap<MappingId, Arc<dyn ParameterizedCommand>>>,
}

pub(crate) const MANAGED_REGISTRAR: &str = "herald:managed";

impl ManagedRegistrar {
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn bind(&self, mapping: &CommandMapping, command: Arc<dyn ParameterizedCommand>) {
		self.commands.write().insert(mapping.id(), command);
	}

	pub fn len(&self) -> usize {
		self.commands.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.commands.read().is_empty()
	}

	fn command(&self, mapping: &CommandMapping) -> Option<Arc<dyn ParameterizedCommand>> {
		self.commands.read().get(&mapping.id()).cloned()
	}
}

impl CommandRegistrar for ManagedRegistrar {
	fn id(&self) -> &str {
		MANAGED_REGISTRAR
	}

	fn process(&self, cause: &CommandCause, mapping: &CommandMapping, args: &str) -> Result<CommandResult, CommandError> {
		let command = self.command(mapping).ok_or_else(|| CommandError::unknown(mapping.primary_alias()))?;

		let mut builder = ContextBuilder::new(cause.clone(), mapping.primary_alias(), 0);
		command.parse(args, &mut builder)?;
		let context = builder.build(args);
		let execution = execute(&context)?;

		tracing::debug!(
			alias = mapping.primary_alias(),
			successes = execution.successes,
			failures = execution.failures,
			forked = execution.forked,
			"executed command"
		);
		Ok(execution.to_result())
	}

	fn suggestions(&self, cause: &CommandCause, mapping: &CommandMapping, args: &str) -> Vec<String> {
		self.command(mapping).map(|command| command.suggestions(cause, args)).unwrap_or_default()
	}

	fn unregister(&self, mapping: &CommandMapping) {
		self.commands.write().remove(&mapping.id());
	}
}
