//! Mutable per-parse accumulator.
//!
//! # Role
//!
//! The external argument tree walks input and feeds a [`ContextBuilder`]:
//! visited nodes, parsed arguments, typed defaults, the executable at the end
//! of the path, and a child builder when the path continues through a
//! redirect. [`ContextBuilder::build`] turns the whole chain into an
//! immutable [`Context`].
//!
//! # Invariants
//!
//! - [`ContextBuilder::copy`] shares no mutable container with the original.
//! - `build` consumes the builder, so a builder is never built twice.

use std::any::Any;
use std::fmt;
use std::mem;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::command::{CommandRef, RedirectModifier};
use crate::context::Context;
use crate::error::ArgumentError;
use crate::key::ParameterKey;
use crate::range::{ParsedArgument, ParsedNode, StringRange};
use crate::store::ArgumentStore;

/// What the builder needs to know about a tree node when it is visited.
pub struct NodeInfo<S> {
	name: Arc<str>,
	modifier: Option<RedirectModifier<S>>,
	forks: bool,
}

impl<S> NodeInfo<S> {
	/// A node that neither redirects nor forks.
	pub fn new(name: impl Into<Arc<str>>) -> Self {
		Self {
			name: name.into(),
			modifier: None,
			forks: false,
		}
	}

	/// Continues into a child as exactly one derived source.
	pub fn redirect(mut self, modifier: RedirectModifier<S>) -> Self {
		self.modifier = Some(modifier);
		self.forks = false;
		self
	}

	/// Continues into a child once per derived source.
	pub fn fork(mut self, modifier: RedirectModifier<S>) -> Self {
		self.modifier = Some(modifier);
		self.forks = true;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}
}

impl<S> Clone for NodeInfo<S> {
	fn clone(&self) -> Self {
		Self {
			name: Arc::clone(&self.name),
			modifier: self.modifier.clone(),
			forks: self.forks,
		}
	}
}

/// Node and offset suggestions at a cursor should complete from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionContext {
	pub parent: Arc<str>,
	pub start: usize,
}

/// Accumulates one parse attempt.
pub struct ContextBuilder<S> {
	source: S,
	root: Arc<str>,
	range: StringRange,
	arguments: IndexMap<Arc<str>, ParsedArgument>,
	store: ArgumentStore,
	nodes: Vec<ParsedNode>,
	command: Option<CommandRef<S>>,
	modifier: Option<RedirectModifier<S>>,
	forks: bool,
	child: Option<Box<ContextBuilder<S>>>,
}

impl<S: Clone> ContextBuilder<S> {
	/// Starts a parse of the tree rooted at `root`, at input offset `start`.
	pub fn new(source: S, root: impl Into<Arc<str>>, start: usize) -> Self {
		Self {
			source,
			root: root.into(),
			range: StringRange::at(start),
			arguments: IndexMap::new(),
			store: ArgumentStore::new(),
			nodes: Vec::new(),
			command: None,
			modifier: None,
			forks: false,
			child: None,
		}
	}

	/// Independent copy for exploring an alternate continuation.
	///
	/// The copy keeps range, source, root, visited nodes, command and
	/// redirect settings, starts with no child, and owns fresh copies of the
	/// node-argument map and the typed store.
	pub fn copy(&self) -> Self {
		Self {
			source: self.source.clone(),
			root: Arc::clone(&self.root),
			range: self.range,
			arguments: self.arguments.clone(),
			store: self.store.clone(),
			nodes: self.nodes.clone(),
			command: self.command.clone(),
			modifier: self.modifier.clone(),
			forks: self.forks,
			child: None,
		}
	}

	/// Finalises the builder and its whole child chain against `input`.
	///
	/// The chain is built deepest-first without recursion.
	pub fn build(mut self, input: &str) -> Context<S> {
		let input: Arc<str> = Arc::from(input);

		let mut chain = Vec::new();
		let mut next = self.child.take();
		while let Some(mut builder) = next {
			next = builder.child.take();
			chain.push(builder);
		}

		let child = chain
			.into_iter()
			.rev()
			.fold(None, |child, mut builder| Some(Arc::new(builder.take_context(Arc::clone(&input), child))));

		self.take_context(input, child)
	}

	/// Moves this builder's state into a context, leaving it empty.
	fn take_context(&mut self, input: Arc<str>, child: Option<Arc<Context<S>>>) -> Context<S> {
		Context {
			source: self.source.clone(),
			input,
			arguments: Arc::new(mem::take(&mut self.arguments)),
			store: Arc::new(mem::take(&mut self.store)),
			command: self.command.take(),
			nodes: mem::take(&mut self.nodes).into(),
			range: self.range,
			child,
			modifier: self.modifier.take(),
			forks: self.forks,
		}
	}
}

impl<S> ContextBuilder<S> {
	pub fn with_source(&mut self, source: S) -> &mut Self {
		self.source = source;
		self
	}

	pub fn source(&self) -> &S {
		&self.source
	}

	/// Name of the node this builder's parse started from.
	pub fn root(&self) -> &str {
		&self.root
	}

	pub fn range(&self) -> StringRange {
		self.range
	}

	/// Records the raw result of node `name` and appends its value to the
	/// typed store under `(name, runtime type of the value)`.
	pub fn with_argument(&mut self, name: impl Into<Arc<str>>, argument: ParsedArgument) -> &mut Self {
		let name = name.into();
		self.store.put_named(Arc::clone(&name), argument.result().clone());
		self.arguments.insert(name, argument);
		self
	}

	/// Appends `value` under `key` without going through a tree node.
	pub fn put_entry<T: Any + Send + Sync>(&mut self, key: &ParameterKey<T>, value: T) -> &mut Self {
		self.store.put(key, value);
		self
	}

	pub fn arguments(&self) -> &IndexMap<Arc<str>, ParsedArgument> {
		&self.arguments
	}

	pub fn store(&self) -> &ArgumentStore {
		&self.store
	}

	pub fn has_any<T>(&self, key: &ParameterKey<T>) -> bool {
		self.store.has_any(key)
	}

	pub fn get_one<T: Any>(&self, key: &ParameterKey<T>) -> Result<Option<&T>, ArgumentError> {
		self.store.get_one(key)
	}

	pub fn require_one<T: Any>(&self, key: &ParameterKey<T>) -> Result<&T, ArgumentError> {
		self.store.require_one(key)
	}

	pub fn get_all<T: Any>(&self, key: &ParameterKey<T>) -> Vec<&T> {
		self.store.get_all(key)
	}

	pub fn with_command(&mut self, command: CommandRef<S>) -> &mut Self {
		self.command = Some(command);
		self
	}

	pub fn command(&self) -> Option<&CommandRef<S>> {
		self.command.as_ref()
	}

	/// Records a visited node, widens the consumed range to cover it, and
	/// adopts the node's redirect settings.
	pub fn with_node(&mut self, node: &NodeInfo<S>, range: StringRange) -> &mut Self {
		self.nodes.push(ParsedNode::new(Arc::clone(&node.name), range));
		self.range = StringRange::encompassing(self.range, range);
		self.modifier = node.modifier.clone();
		self.forks = node.forks;
		self
	}

	pub fn nodes(&self) -> &[ParsedNode] {
		&self.nodes
	}

	/// Links the continuation into a redirected subtree.
	pub fn with_child(&mut self, child: ContextBuilder<S>) -> &mut Self {
		self.child = Some(Box::new(child));
		self
	}

	pub fn child(&self) -> Option<&ContextBuilder<S>> {
		self.child.as_deref()
	}

	pub fn child_mut(&mut self) -> Option<&mut ContextBuilder<S>> {
		self.child.as_deref_mut()
	}

	/// Follows the child chain to its deepest builder.
	pub fn last_child(&self) -> &ContextBuilder<S> {
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

	/// Number of builders linked below this one.
	fn chain_depth(&self) -> usize {
		let mut depth = 0;
		let mut current = self.child.as_deref();
		while let Some(child) = current {
			depth += 1;
			current = child.child.as_deref();
		}
		depth
	}

	/// Locates the node suggestions at `cursor` should be drawn from.
	///
	/// Returns `None` when the cursor lies before the parsed range.
	pub fn find_suggestion_context(&self, cursor: usize) -> Option<SuggestionContext> {
		let mut current = self;
		loop {
			if current.range.start() > cursor {
				return None;
			}

			if current.range.end() < cursor {
				if let Some(child) = current.child.as_deref() {
					current = child;
					continue;
				}
				return Some(match current.nodes.last() {
					Some(last) => SuggestionContext {
						parent: Arc::clone(last.node_arc()),
						start: last.range().end() + 1,
					},
					None => SuggestionContext {
						parent: Arc::clone(&current.root),
						start: current.range.start(),
					},
				});
			}

			let mut prev = &current.root;
			for node in &current.nodes {
				let range = node.range();
				if range.start() <= cursor && cursor <= range.end() {
					return Some(SuggestionContext {
						parent: Arc::clone(prev),
						start: range.start(),
					});
				}
				prev = node.node_arc();
			}
			return Some(SuggestionContext {
				parent: Arc::clone(prev),
				start: current.range.start(),
			});
		}
	}
}

impl<S: fmt::Debug> fmt::Debug for ContextBuilder<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ContextBuilder")
			.field("source", &self.source)
			.field("root", &self.root)
			.field("range", &self.range)
			.field("nodes", &self.nodes)
			.field("store", &self.store)
			.field("has_command", &self.command.is_some())
			.field("forks", &self.forks)
			.field("children", &self.chain_depth())
			.finish()
	}
}

// Unlink the chain iteratively so a deep unbuilt chain cannot overflow the
// stack on drop.
impl<S> Drop for ContextBuilder<S> {
	fn drop(&mut self) {
		let mut next = self.child.take();
		while let Some(mut child) = next {
			next = child.child.take();
		}
	}
}

#[cfg(test)]
mod tests;
