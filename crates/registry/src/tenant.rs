use std::fmt;
use std::sync::Arc;

/// Tenant that owns the platform's own built-in commands.
pub const PLATFORM_TENANT: &str = "herald";

/// Tenant that owns commands contributed by the hosting runtime.
pub const RUNTIME_TENANT: &str = "runtime";

/// Identifier of the plugin or module that registers commands.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TenantId(Arc<str>);

impl TenantId {
	pub fn new(id: impl Into<Arc<str>>) -> Self {
		Self(id.into())
	}

	pub fn platform() -> Self {
		Self::new(PLATFORM_TENANT)
	}

	pub fn runtime() -> Self {
		Self::new(RUNTIME_TENANT)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Case-insensitive comparison used for configuration entries.
	pub fn matches(&self, other: &str) -> bool {
		self.0.eq_ignore_ascii_case(other)
	}
}

impl From<&str> for TenantId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

impl fmt::Debug for TenantId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TenantId({})", self.0)
	}
}

impl fmt::Display for TenantId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
