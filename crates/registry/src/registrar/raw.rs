use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use herald_invocation::{CommandResult, panic_message, report_failure};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::CommandRegistrar;
use crate::cause::CommandCause;
use crate::command::RawCommand;
use crate::error::CommandError;
use crate::mapping::{CommandMapping, MappingId};

/// Registrar for commands that handle their own argument text.
///
/// Raw commands never reach the execution engine, so this registrar is their
/// error boundary: failures are reported to the cause and come back as an
/// error [`CommandResult`]. Panics are contained the same way.
#[derive(Default)]
pub struct RawRegistrar {
	commands: RwLock<FxHashMap<MappingId, Arc<dyn RawCommand>>>,
}

pub(crate) const RAW_REGISTRAR: &str = "herald:raw";

impl RawRegistrar {
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn bind(&self, mapping: &CommandMapping, command: Arc<dyn RawCommand>) {
		self.commands.write().insert(mapping.id(), command);
	}

	pub fn len(&self) -> usize {
		self.commands.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.commands.read().is_empty()
	}

	fn command(&self, mapping: &CommandMapping) -> Option<Arc<dyn RawCommand>> {
		self.commands.read().get(&mapping.id()).cloned()
	}
}

impl CommandRegistrar for RawRegistrar {
	fn id(&self) -> &str {
		RAW_REGISTRAR
	}

	fn process(&self, cause: &CommandCause, mapping: &CommandMapping, args: &str) -> Result<CommandResult, CommandError> {
		let command = self.command(mapping).ok_or_else(|| CommandError::unknown(mapping.primary_alias()))?;

		match catch_unwind(AssertUnwindSafe(|| command.process(cause, args))) {
			Ok(Ok(result)) => {
				if let Some(message) = result.error_message() {
					report_failure(cause, message);
				}
				Ok(result)
			}
			Ok(Err(error)) => {
				tracing::debug!(alias = mapping.primary_alias(), %error, "raw command failed");
				let message = error.to_string();
				report_failure(cause, &message);
				Ok(CommandResult::error(message))
			}
			Err(payload) => {
				let message = panic_message(payload.as_ref());
				tracing::error!(alias = mapping.primary_alias(), panic = %message, "raw command panicked");
				report_failure(cause, &message);
				Ok(CommandResult::error(message))
			}
		}
	}

	fn suggestions(&self, cause: &CommandCause, mapping: &CommandMapping, args: &str) -> Vec<String> {
		self.command(mapping).map(|command| command.suggestions(cause, args)).unwrap_or_default()
	}

	fn unregister(&self, mapping: &CommandMapping) {
		self.commands.write().remove(&mapping.id());
	}
}
