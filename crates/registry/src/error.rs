use herald_invocation::{DispatchError, ExecutionError, SyntaxError};
use thiserror::Error;

use crate::mapping::CommandMapping;
use crate::tenant::TenantId;

/// Failure to register a command under a set of aliases.
///
/// Every variant leaves the registry unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
	#[error("alias '{alias}' must be non-empty and must not contain whitespace")]
	InvalidAlias { alias: String },
	#[error("alias '{alias}' is already registered")]
	AlreadyRegistered { alias: String },
	#[error("no alias of '{primary}' for {tenant} survived collision resolution")]
	NoAliasesAvailable { tenant: TenantId, primary: String },
}

/// Reason a mapping was not removed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnregisterError {
	#[error("mappings owned by {tenant} cannot be unregistered")]
	Protected { tenant: TenantId },
	#[error("mapping '{alias}' is not registered")]
	NotRegistered { alias: String },
	/// The inverse index holds aliases the mapping never recorded.
	#[error("alias index drifted for '{alias}': {stray:?} are not recorded on the mapping")]
	Inconsistent { alias: String, stray: Vec<String> },
}

/// Failure surfaced by [`CommandRegistry::process`](crate::CommandRegistry::process).
#[derive(Debug, Error)]
pub enum CommandError {
	#[error("Unknown command. Type /help for a list of commands.")]
	UnknownCommand { alias: String },
	#[error(transparent)]
	Syntax(#[from] SyntaxError),
	#[error(transparent)]
	Dispatch(#[from] DispatchError),
	#[error(transparent)]
	Failed(#[from] ExecutionError),
}

impl CommandError {
	pub fn unknown(alias: impl Into<String>) -> Self {
		Self::UnknownCommand { alias: alias.into() }
	}

	/// Whether the head token did not resolve to any mapping.
	pub fn is_unknown_command(&self) -> bool {
		matches!(self, Self::UnknownCommand { .. })
	}
}

impl UnregisterError {
	pub(crate) fn not_registered(mapping: &CommandMapping) -> Self {
		Self::NotRegistered {
			alias: mapping.primary_alias().to_string(),
		}
	}
}
