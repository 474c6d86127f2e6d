use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::key::TypeDescriptor;

/// A parsed argument value with its runtime type tag.
///
/// Values are immutable once parsed, so clones share the payload.
#[derive(Clone)]
pub struct ArgumentValue {
	ty: TypeDescriptor,
	value: Arc<dyn Any + Send + Sync>,
}

impl ArgumentValue {
	/// Wraps `value`, recording `T` as its type tag.
	pub fn new<T: Any + Send + Sync>(value: T) -> Self {
		Self {
			ty: TypeDescriptor::of::<T>(),
			value: Arc::new(value),
		}
	}

	/// Returns the runtime type tag.
	#[inline]
	pub fn value_type(&self) -> TypeDescriptor {
		self.ty
	}

	/// Returns true if the value holds a `T`.
	#[inline]
	pub fn is<T: Any>(&self) -> bool {
		self.ty.is::<T>()
	}

	/// Borrows the value as `T`, if that is its type.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.value.downcast_ref::<T>()
	}
}

impl fmt::Debug for ArgumentValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ArgumentValue({})", self.ty)
	}
}
