use std::any::Any;
use std::sync::Arc;

use crate::value::ArgumentValue;

/// Half-open byte range `[start, end)` into the command input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StringRange {
	start: usize,
	end: usize,
}

impl StringRange {
	/// Empty range at `pos`.
	pub const fn at(pos: usize) -> Self {
		Self { start: pos, end: pos }
	}

	/// Range between two offsets, normalised so that `start <= end`.
	pub fn between(a: usize, b: usize) -> Self {
		Self {
			start: a.min(b),
			end: a.max(b),
		}
	}

	/// Smallest range covering both `a` and `b`.
	pub fn encompassing(a: Self, b: Self) -> Self {
		Self {
			start: a.start.min(b.start),
			end: a.end.max(b.end),
		}
	}

	#[inline]
	pub fn start(self) -> usize {
		self.start
	}

	#[inline]
	pub fn end(self) -> usize {
		self.end
	}

	#[inline]
	pub fn len(self) -> usize {
		self.end - self.start
	}

	#[inline]
	pub fn is_empty(self) -> bool {
		self.start == self.end
	}

	/// Slices `input`, yielding an empty string when the range is out of
	/// bounds or splits a character.
	pub fn get(self, input: &str) -> &str {
		input.get(self.start..self.end).unwrap_or("")
	}
}

/// Raw value produced by one argument node, with the input it consumed.
#[derive(Debug, Clone)]
pub struct ParsedArgument {
	range: StringRange,
	result: ArgumentValue,
}

impl ParsedArgument {
	pub fn new(range: StringRange, result: ArgumentValue) -> Self {
		Self { range, result }
	}

	/// Convenience for wrapping a typed value.
	pub fn of<T: Any + Send + Sync>(range: StringRange, value: T) -> Self {
		Self::new(range, ArgumentValue::new(value))
	}

	pub fn range(&self) -> StringRange {
		self.range
	}

	pub fn result(&self) -> &ArgumentValue {
		&self.result
	}
}

/// A tree node visited while parsing, with the input it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNode {
	node: Arc<str>,
	range: StringRange,
}

impl ParsedNode {
	pub fn new(node: impl Into<Arc<str>>, range: StringRange) -> Self {
		Self { node: node.into(), range }
	}

	/// Name of the visited node.
	pub fn node(&self) -> &str {
		&self.node
	}

	pub(crate) fn node_arc(&self) -> &Arc<str> {
		&self.node
	}

	pub fn range(&self) -> StringRange {
		self.range
	}
}
