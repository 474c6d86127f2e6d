use std::sync::Arc;

/// Outcome reported by a tenant executor or a whole dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
	result: i32,
	error: Option<Arc<str>>,
}

impl CommandResult {
	/// Successful result with value `1`.
	pub fn success() -> Self {
		Self::with_result(1)
	}

	/// Successful result with value `0`.
	pub fn empty() -> Self {
		Self::with_result(0)
	}

	/// Successful result with an explicit value.
	pub fn with_result(result: i32) -> Self {
		Self { result, error: None }
	}

	/// Non-success result carrying a message for the source.
	pub fn error(message: impl Into<Arc<str>>) -> Self {
		Self {
			result: 0,
			error: Some(message.into()),
		}
	}

	pub fn result(&self) -> i32 {
		self.result
	}

	pub fn is_success(&self) -> bool {
		self.error.is_none()
	}

	pub fn error_message(&self) -> Option<&str> {
		self.error.as_deref()
	}
}
