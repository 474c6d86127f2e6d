use thiserror::Error;

/// Errors raised by the typed argument read API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
	/// A single value was requested but several are stored.
	#[error("more than one entry was found for {key} ({count} values)")]
	TooMany {
		/// Display form of the key.
		key: String,
		/// Number of stored values.
		count: usize,
	},
	/// A value was required but none is stored.
	#[error("no entry was found for {key}")]
	Missing {
		/// Display form of the key.
		key: String,
	},
	/// A key or value carried a type tag other than the one expected.
	#[error("type mismatch for {key}: expected {expected}, found {found}")]
	TypeMismatch {
		/// Display form of the key.
		key: String,
		/// Type the caller asked for.
		expected: &'static str,
		/// Type actually recorded.
		found: &'static str,
	},
}

/// Failure raised by tenant-supplied executors and redirect modifiers.
#[derive(Error, Debug, Clone)]
pub enum ExecutionError {
	/// Free-form failure message shown to the command source.
	#[error("{0}")]
	Message(String),
	/// Argument lookup failed inside the executor.
	#[error(transparent)]
	Argument(#[from] ArgumentError),
}

impl ExecutionError {
	/// Creates a message error.
	pub fn new(message: impl Into<String>) -> Self {
		Self::Message(message.into())
	}
}

/// Failure raised while an argument tree consumes input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at position {cursor}")]
pub struct SyntaxError {
	/// Human-readable description.
	pub message: String,
	/// Byte offset into the argument text where parsing stopped.
	pub cursor: usize,
}

impl SyntaxError {
	/// Creates a syntax error at `cursor`.
	pub fn new(message: impl Into<String>, cursor: usize) -> Self {
		Self {
			message: message.into(),
			cursor,
		}
	}
}

/// Errors surfaced by the context execution engine.
#[derive(Error, Debug, Clone)]
pub enum DispatchError {
	/// The context chain ended without reaching an executable node.
	#[error("unknown or incomplete command")]
	NoCommand,
	/// A non-forking redirect produced other than exactly one source.
	#[error("redirect produced {count} sources but the node does not fork")]
	RedirectArity {
		/// Number of sources produced.
		count: usize,
	},
	/// A redirect modifier failed outside fork mode.
	#[error("redirect failed: {0}")]
	Redirect(#[source] ExecutionError),
}
