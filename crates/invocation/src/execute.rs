//! Context execution with redirect and fork semantics.
//!
//! # Role
//!
//! [`execute`] walks a built [`Context`] chain level by level. A context whose
//! child matched nodes continues into that child, either as its own source,
//! as the single source its redirect modifier produces, or (when forking) once
//! per produced source. A context without a child runs its command.
//!
//! # Invariants
//!
//! - Once any level forks, a failing branch (modifier error, bad redirect
//!   arity, or command failure) is counted and skipped; siblings still run.
//! - Outside fork mode, modifier and arity failures abort the execution.
//! - A panicking command or modifier counts as that branch failing and never
//!   unwinds out of [`execute`].
//! - Branches share argument storage read-only; nothing a branch does is
//!   visible to its siblings.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::command::{CommandStatus, panic_message};
use crate::context::Context;
use crate::error::{DispatchError, ExecutionError};
use crate::result::CommandResult;

/// Aggregate outcome of executing a context chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Execution {
	/// Sum of the result values of successful branches.
	pub result: i32,
	/// Branches whose command succeeded.
	pub successes: usize,
	/// Branches that failed, including failed redirects.
	pub failures: usize,
	/// Whether any level of the chain forked.
	pub forked: bool,
}

impl Execution {
	/// Branches that reached a command or failed trying to.
	pub fn attempted(&self) -> usize {
		self.successes + self.failures
	}

	/// Collapses the execution into a single result for the caller.
	pub fn to_result(&self) -> CommandResult {
		if self.successes == 0 && self.failures > 0 {
			CommandResult::error(format!("all {} executions failed", self.failures))
		} else {
			CommandResult::with_result(self.result)
		}
	}
}

/// Executes `context` and every continuation it redirects or forks into.
pub fn execute<S: Clone>(context: &Context<S>) -> Result<Execution, DispatchError> {
	let mut summary = Execution::default();
	let mut found_command = false;
	let mut contexts = vec![context.clone()];

	while !contexts.is_empty() {
		let mut next = Vec::new();

		for ctx in &contexts {
			let Some(child) = ctx.child() else {
				if let Some(command) = ctx.command() {
					found_command = true;
					match catch_unwind(AssertUnwindSafe(|| command.run(ctx))) {
						Ok(CommandStatus::Success(value)) => {
							summary.result = summary.result.saturating_add(value);
							summary.successes += 1;
						}
						Ok(CommandStatus::Failed) => summary.failures += 1,
						Err(payload) => {
							let message = panic_message(payload.as_ref());
							tracing::error!(input = ctx.input(), panic = %message, "command panicked");
							summary.failures += 1;
						}
					}
				}
				continue;
			};

			summary.forked |= ctx.is_forked();
			if !child.has_nodes() {
				continue;
			}
			found_command = true;

			let Some(modifier) = ctx.redirect_modifier() else {
				next.push(child.copy_for(ctx.source().clone()));
				continue;
			};

			let produced = catch_unwind(AssertUnwindSafe(|| modifier(ctx))).unwrap_or_else(|payload| {
				let message = panic_message(payload.as_ref());
				tracing::error!(input = ctx.input(), panic = %message, "redirect modifier panicked");
				Err(ExecutionError::new(format!("redirect panicked: {message}")))
			});

			match produced {
				Ok(sources) if ctx.is_forked() || sources.len() == 1 => {
					next.extend(sources.into_iter().map(|source| child.copy_for(source)));
				}
				Ok(sources) => {
					let count = sources.len();
					if !summary.forked {
						return Err(DispatchError::RedirectArity { count });
					}
					tracing::warn!(input = ctx.input(), count, "redirect produced wrong number of sources; skipping branch");
					summary.failures += 1;
				}
				Err(error) => {
					if !summary.forked {
						return Err(DispatchError::Redirect(error));
					}
					tracing::debug!(input = ctx.input(), %error, "forked redirect failed; skipping branch");
					summary.failures += 1;
				}
			}
		}

		contexts = next;
	}

	if !found_command {
		return Err(DispatchError::NoCommand);
	}
	Ok(summary)
}

#[cfg(test)]
mod tests;
