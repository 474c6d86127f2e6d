//! Immutable parse results.
//!
//! # Role
//!
//! A [`Context`] is what a [`ContextBuilder`](crate::ContextBuilder) becomes
//! once parsing is complete. Argument storage is behind `Arc`, so contexts are
//! cheap to clone and safe to share between forked branches.
//!
//! # Invariants
//!
//! - `child` forms a finite, acyclic chain mirroring the matched node path.
//! - [`Context::copy_for`] never copies argument storage; it only re-targets
//!   the source.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::command::{CommandRef, RedirectModifier};
use crate::error::ArgumentError;
use crate::key::ParameterKey;
use crate::range::{ParsedArgument, ParsedNode, StringRange};
use crate::store::ArgumentStore;

/// Finalised parse result for one level of the matched node path.
pub struct Context<S> {
	pub(crate) source: S,
	pub(crate) input: Arc<str>,
	pub(crate) arguments: Arc<IndexMap<Arc<str>, ParsedArgument>>,
	pub(crate) store: Arc<ArgumentStore>,
	pub(crate) command: Option<CommandRef<S>>,
	pub(crate) nodes: Arc<[ParsedNode]>,
	pub(crate) range: StringRange,
	pub(crate) child: Option<Arc<Context<S>>>,
	pub(crate) modifier: Option<RedirectModifier<S>>,
	pub(crate) forks: bool,
}

impl<S: Clone> Clone for Context<S> {
	fn clone(&self) -> Self {
		self.copy_for(self.source.clone())
	}
}

impl<S> Context<S> {
	/// Returns the same context executed as `source`.
	pub fn copy_for(&self, source: S) -> Self {
		Self {
			source,
			input: Arc::clone(&self.input),
			arguments: Arc::clone(&self.arguments),
			store: Arc::clone(&self.store),
			command: self.command.clone(),
			nodes: Arc::clone(&self.nodes),
			range: self.range,
			child: self.child.clone(),
			modifier: self.modifier.clone(),
			forks: self.forks,
		}
	}

	pub fn source(&self) -> &S {
		&self.source
	}

	/// Full input string the context was built from.
	pub fn input(&self) -> &str {
		&self.input
	}

	/// Raw per-node parse results, keyed by node-local name.
	pub fn arguments(&self) -> &IndexMap<Arc<str>, ParsedArgument> {
		&self.arguments
	}

	/// Typed view of every argument parsed at this level.
	pub fn store(&self) -> &ArgumentStore {
		&self.store
	}

	pub fn command(&self) -> Option<&CommandRef<S>> {
		self.command.as_ref()
	}

	pub fn nodes(&self) -> &[ParsedNode] {
		&self.nodes
	}

	pub fn has_nodes(&self) -> bool {
		!self.nodes.is_empty()
	}

	pub fn range(&self) -> StringRange {
		self.range
	}

	pub fn child(&self) -> Option<&Context<S>> {
		self.child.as_deref()
	}

	fn chain_depth(&self) -> usize {
		let mut depth = 0;
		let mut current = self.child.as_deref();
		while let Some(child) = current {
			depth += 1;
			current = child.child.as_deref();
		}
		depth
	}

	/// Follows the child chain to its deepest context.
	pub fn last_child(&self) -> &Context<S> {
		let mut current = self;
		while let Some(child) = current.child.as_deref() {
			current = child;
		}
		current
	}

	pub fn redirect_modifier(&self) -> Option<&RedirectModifier<S>> {
		self.modifier.as_ref()
	}

	pub fn is_forked(&self) -> bool {
		self.forks
	}

	/// See [`ArgumentStore::has_any`].
	pub fn has_any<T>(&self, key: &ParameterKey<T>) -> bool {
		self.store.has_any(key)
	}

	/// See [`ArgumentStore::get_one`].
	pub fn get_one<T: Any>(&self, key: &ParameterKey<T>) -> Result<Option<&T>, ArgumentError> {
		self.store.get_one(key)
	}

	/// See [`ArgumentStore::require_one`].
	pub fn require_one<T: Any>(&self, key: &ParameterKey<T>) -> Result<&T, ArgumentError> {
		self.store.require_one(key)
	}

	/// See [`ArgumentStore::get_all`].
	pub fn get_all<T: Any>(&self, key: &ParameterKey<T>) -> Vec<&T> {
		self.store.get_all(key)
	}
}

// Unlink the chain iteratively so deep command trees cannot overflow the
// stack on drop.
impl<S> Drop for Context<S> {
	fn drop(&mut self) {
		let mut next = self.child.take();
		while let Some(child) = next {
			next = match Arc::try_unwrap(child) {
				Ok(mut owned) => owned.child.take(),
				Err(_) => None,
			};
		}
	}
}

impl<S: fmt::Debug> fmt::Debug for Context<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Context")
			.field("source", &self.source)
			.field("input", &self.input)
			.field("range", &self.range)
			.field("nodes", &self.nodes)
			.field("arguments", &self.arguments.keys().collect::<Vec<_>>())
			.field("has_command", &self.command.is_some())
			.field("redirect", &self.modifier.is_some())
			.field("forks", &self.forks)
			.field("children", &self.chain_depth())
			.finish()
	}
}
