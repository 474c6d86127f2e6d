//! Parse contexts and execution for herald commands.
//!
//! An external argument tree walks the text after a command alias and feeds a
//! [`ContextBuilder`]. Building it yields an immutable [`Context`] chain that
//! [`execute`] runs, following redirects and forking one logical command into
//! several independent executions where a node asks for it.
//!
//! - [`ParameterKey`] / [`ArgumentStore`]: typed, multi-valued argument slots.
//! - [`ContextBuilder`] / [`Context`]: per-parse accumulation and its result.
//! - [`ExecutorAdapter`]: boundary between tenant executors and the engine.
//! - [`execute`]: redirect and fork semantics with per-branch isolation.

mod builder;
mod command;
mod context;
mod error;
mod execute;
mod key;
mod range;
mod result;
mod store;
mod value;

pub use builder::{ContextBuilder, NodeInfo, SuggestionContext};
pub use command::{
	Command, CommandExecutor, CommandRef, CommandSource, CommandStatus, ERROR_PREFIX, ExecutorAdapter, RedirectModifier, panic_message, report_failure,
};
pub use context::Context;
pub use error::{ArgumentError, DispatchError, ExecutionError, SyntaxError};
pub use execute::{Execution, execute};
pub use key::{ParameterKey, RawKey, TypeDescriptor};
pub use range::{ParsedArgument, ParsedNode, StringRange};
pub use result::CommandResult;
pub use store::ArgumentStore;
pub use value::ArgumentValue;
