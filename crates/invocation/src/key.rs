//! Typed argument slot identities.
//!
//! A slot is identified by its name *and* the type of the values stored in it,
//! so two commands can reuse a short name like `target` for different value
//! types without colliding.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::ArgumentError;

/// Runtime type tag carried by every stored argument value.
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
	id: TypeId,
	name: &'static str,
}

impl TypeDescriptor {
	/// Returns the descriptor for `T`.
	pub fn of<T: Any>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
		}
	}

	/// Returns the underlying [`TypeId`].
	#[inline]
	pub fn type_id(self) -> TypeId {
		self.id
	}

	/// Returns the compiler-provided type name, for diagnostics only.
	#[inline]
	pub fn name(self) -> &'static str {
		self.name
	}

	/// Returns true if this descriptor describes `T`.
	#[inline]
	pub fn is<T: Any>(self) -> bool {
		self.id == TypeId::of::<T>()
	}
}

impl PartialEq for TypeDescriptor {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

impl fmt::Display for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

/// Type-erased slot identity used as the storage key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RawKey {
	name: Arc<str>,
	ty: TypeDescriptor,
}

impl RawKey {
	/// Creates a key for `name` holding values described by `ty`.
	pub fn new(name: impl Into<Arc<str>>, ty: TypeDescriptor) -> Self {
		Self { name: name.into(), ty }
	}

	/// Returns the slot name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the value type of the slot.
	pub fn value_type(&self) -> TypeDescriptor {
		self.ty
	}
}

impl fmt::Debug for RawKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RawKey").field("name", &self.name).field("type", &self.ty).finish()
	}
}

impl fmt::Display for RawKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.name, self.ty)
	}
}

/// Typed handle to an argument slot.
///
/// Equality and hashing use both the name and the value type.
pub struct ParameterKey<T> {
	raw: RawKey,
	_marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> ParameterKey<T> {
	/// Creates a key named `name` for values of type `T`.
	pub fn new(name: impl Into<Arc<str>>) -> Self {
		Self {
			raw: RawKey::new(name, TypeDescriptor::of::<T>()),
			_marker: PhantomData,
		}
	}

	/// Recovers a typed key from an erased one.
	///
	/// Fails if the erased key was created for a different value type.
	pub fn from_raw(raw: RawKey) -> Result<Self, ArgumentError> {
		if !raw.value_type().is::<T>() {
			return Err(ArgumentError::TypeMismatch {
				key: raw.to_string(),
				expected: std::any::type_name::<T>(),
				found: raw.value_type().name(),
			});
		}
		Ok(Self { raw, _marker: PhantomData })
	}
}

impl<T> ParameterKey<T> {
	/// Returns the slot name.
	pub fn name(&self) -> &str {
		self.raw.name()
	}

	/// Returns the value type of the slot.
	pub fn value_type(&self) -> TypeDescriptor {
		self.raw.value_type()
	}

	/// Returns the erased identity used for storage.
	pub fn raw(&self) -> &RawKey {
		&self.raw
	}
}

impl<T> Clone for ParameterKey<T> {
	fn clone(&self) -> Self {
		Self {
			raw: self.raw.clone(),
			_marker: PhantomData,
		}
	}
}

impl<T> PartialEq for ParameterKey<T> {
	fn eq(&self, other: &Self) -> bool {
		self.raw == other.raw
	}
}

impl<T> Eq for ParameterKey<T> {}

impl<T> Hash for ParameterKey<T> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.raw.hash(state);
	}
}

impl<T> fmt::Debug for ParameterKey<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ParameterKey").field(&self.raw.name).field(&self.raw.ty).finish()
	}
}

impl<T> fmt::Display for ParameterKey<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.raw, f)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn same_name_different_type_is_distinct() {
		let a = ParameterKey::<i32>::new("amount");
		let b = ParameterKey::<String>::new("amount");
		assert_ne!(a.raw(), b.raw());
		assert_eq!(a, ParameterKey::<i32>::new("amount"));
	}

	#[test]
	fn from_raw_rejects_mismatched_type() {
		let raw = RawKey::new("amount", TypeDescriptor::of::<i32>());
		assert!(ParameterKey::<i32>::from_raw(raw.clone()).is_ok());

		let err = ParameterKey::<String>::from_raw(raw).unwrap_err();
		assert!(matches!(err, ArgumentError::TypeMismatch { .. }));
	}

	#[test]
	fn display_includes_name_and_type() {
		let key = ParameterKey::<u8>::new("level");
		assert_eq!(key.to_string(), "level (u8)");
	}
}
