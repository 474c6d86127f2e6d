use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::registrar::RegistrarRef;
use crate::tenant::TenantId;

/// Process-unique identity of a mapping.
///
/// Ids never repeat across registries, so a mapping handed to a registry that
/// did not create it cannot alias one of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MappingId(u64);

static NEXT_MAPPING_ID: AtomicU64 = AtomicU64::new(0);

impl MappingId {
	pub(crate) fn next() -> Self {
		Self(NEXT_MAPPING_ID.fetch_add(1, Ordering::Relaxed))
	}

	pub fn get(self) -> u64 {
		self.0
	}
}

/// A registered command: the aliases it claimed, its owner and its registrar.
///
/// Cheap to clone. Equality and hashing use the process-unique id, so two
/// registrations with identical aliases stay distinct.
#[derive(Clone)]
pub struct CommandMapping {
	inner: Arc<MappingInner>,
}

struct MappingInner {
	id: MappingId,
	primary_alias: Arc<str>,
	all_aliases: Vec<String>,
	tenant: TenantId,
	registrar: RegistrarRef,
}

impl CommandMapping {
	pub(crate) fn new(id: MappingId, primary_alias: &str, all_aliases: Vec<String>, tenant: TenantId, registrar: RegistrarRef) -> Self {
		Self {
			inner: Arc::new(MappingInner {
				id,
				primary_alias: primary_alias.into(),
				all_aliases,
				tenant,
				registrar,
			}),
		}
	}

	pub fn id(&self) -> MappingId {
		self.inner.id
	}

	/// Primary alias in the case it was registered with.
	pub fn primary_alias(&self) -> &str {
		&self.inner.primary_alias
	}

	/// Lower-cased aliases that survived collision resolution.
	pub fn all_aliases(&self) -> &[String] {
		&self.inner.all_aliases
	}

	pub fn tenant(&self) -> &TenantId {
		&self.inner.tenant
	}

	pub fn registrar(&self) -> &RegistrarRef {
		&self.inner.registrar
	}
}

impl PartialEq for CommandMapping {
	fn eq(&self, other: &Self) -> bool {
		self.inner.id == other.inner.id
	}
}

impl Eq for CommandMapping {}

impl Hash for CommandMapping {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.inner.id.hash(state);
	}
}

impl fmt::Debug for CommandMapping {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CommandMapping")
			.field("id", &self.inner.id.0)
			.field("primary_alias", &self.inner.primary_alias)
			.field("aliases", &self.inner.all_aliases)
			.field("tenant", &self.inner.tenant)
			.field("registrar", &self.inner.registrar.id())
			.finish()
	}
}
