//! Multi-valued typed argument storage.
//!
//! # Invariants
//!
//! - A present key always maps to a non-empty value list.
//! - Values under a key keep insertion (parse) order.
//! - Every stored value's type tag equals its key's value type.

use std::any::Any;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::ArgumentError;
use crate::key::{ParameterKey, RawKey};
use crate::value::ArgumentValue;

type Values = SmallVec<[ArgumentValue; 1]>;

/// Mapping from argument slot to the ordered values parsed into it.
#[derive(Debug, Clone, Default)]
pub struct ArgumentStore {
	entries: FxHashMap<RawKey, Values>,
}

impl ArgumentStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends `value` under `key`.
	pub fn put<T: Any + Send + Sync>(&mut self, key: &ParameterKey<T>, value: T) {
		self.entries.entry(key.raw().clone()).or_default().push(ArgumentValue::new(value));
	}

	/// Appends an already-erased value, checking its type tag against the key.
	pub fn put_value(&mut self, key: RawKey, value: ArgumentValue) -> Result<(), ArgumentError> {
		if key.value_type() != value.value_type() {
			return Err(ArgumentError::TypeMismatch {
				key: key.to_string(),
				expected: key.value_type().name(),
				found: value.value_type().name(),
			});
		}
		self.entries.entry(key).or_default().push(value);
		Ok(())
	}

	/// Appends `value` under `name`, keyed by the value's own runtime type.
	pub(crate) fn put_named(&mut self, name: Arc<str>, value: ArgumentValue) {
		let key = RawKey::new(name, value.value_type());
		self.entries.entry(key).or_default().push(value);
	}

	/// Returns true if at least one value is stored under `key`.
	#[inline]
	pub fn has_any<T>(&self, key: &ParameterKey<T>) -> bool {
		self.contains(key.raw())
	}

	/// Erased form of [`Self::has_any`].
	#[inline]
	pub fn contains(&self, key: &RawKey) -> bool {
		self.entries.contains_key(key)
	}

	/// Returns the single value under `key`, or `None` if there is none.
	///
	/// Fails with [`ArgumentError::TooMany`] if more than one value is stored.
	pub fn get_one<T: Any>(&self, key: &ParameterKey<T>) -> Result<Option<&T>, ArgumentError> {
		match self.values(key.raw()) {
			[] => Ok(None),
			[value] => downcast(key.raw(), value).map(Some),
			many => Err(ArgumentError::TooMany {
				key: key.to_string(),
				count: many.len(),
			}),
		}
	}

	/// Returns the single value under `key`.
	///
	/// Fails with [`ArgumentError::Missing`] when nothing is stored and
	/// [`ArgumentError::TooMany`] when more than one value is stored.
	pub fn require_one<T: Any>(&self, key: &ParameterKey<T>) -> Result<&T, ArgumentError> {
		self.get_one(key)?.ok_or_else(|| ArgumentError::Missing { key: key.to_string() })
	}

	/// Returns every value under `key` in insertion order.
	pub fn get_all<T: Any>(&self, key: &ParameterKey<T>) -> Vec<&T> {
		self.values(key.raw()).iter().filter_map(ArgumentValue::downcast_ref::<T>).collect()
	}

	/// Returns the erased values under `key`, empty if absent.
	pub fn values(&self, key: &RawKey) -> &[ArgumentValue] {
		self.entries.get(key).map(|v| v.as_slice()).unwrap_or(&[])
	}

	/// Iterates over the keys that hold values.
	pub fn keys(&self) -> impl Iterator<Item = &RawKey> {
		self.entries.keys()
	}

	/// Returns the number of populated keys.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if no key holds a value.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

fn downcast<'a, T: Any>(key: &RawKey, value: &'a ArgumentValue) -> Result<&'a T, ArgumentError> {
	value.downcast_ref::<T>().ok_or_else(|| ArgumentError::TypeMismatch {
		key: key.to_string(),
		expected: std::any::type_name::<T>(),
		found: value.value_type().name(),
	})
}
