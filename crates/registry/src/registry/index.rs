//! Immutable alias index snapshot.
//!
//! # Invariants
//!
//! - `alias_to_mapping[a] == m` iff `a` is in `mapping_to_aliases[m]`.
//! - Every mapping in `mapping_to_aliases` is in its tenant's set and vice
//!   versa; empty tenant sets are removed.
//! - Removal uses `shift_remove` so iteration order stays registration order.

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;

use crate::error::UnregisterError;
use crate::mapping::CommandMapping;
use crate::tenant::TenantId;

#[derive(Clone, Default)]
pub(crate) struct Indices {
	pub(crate) alias_to_mapping: IndexMap<String, CommandMapping>,
	pub(crate) mapping_to_aliases: FxHashMap<CommandMapping, IndexSet<String>>,
	pub(crate) tenant_to_mappings: IndexMap<TenantId, IndexSet<CommandMapping>>,
}

impl Indices {
	pub(crate) fn contains_alias(&self, alias: &str) -> bool {
		self.alias_to_mapping.contains_key(alias)
	}

	pub(crate) fn insert(&mut self, mapping: &CommandMapping) {
		let aliases: IndexSet<String> = mapping.all_aliases().iter().cloned().collect();
		for alias in &aliases {
			self.alias_to_mapping.insert(alias.clone(), mapping.clone());
		}
		self.mapping_to_aliases.insert(mapping.clone(), aliases);
		self.tenant_to_mappings.entry(mapping.tenant().clone()).or_default().insert(mapping.clone());
	}

	/// Aliases the inverse index holds for `mapping` that the mapping itself
	/// never recorded.
	pub(crate) fn check(&self, mapping: &CommandMapping) -> Result<(), UnregisterError> {
		let Some(indexed) = self.mapping_to_aliases.get(mapping) else {
			return Err(UnregisterError::not_registered(mapping));
		};
		let stray: Vec<String> = indexed.iter().filter(|alias| !mapping.all_aliases().contains(alias)).cloned().collect();
		if stray.is_empty() {
			Ok(())
		} else {
			Err(UnregisterError::Inconsistent {
				alias: mapping.primary_alias().to_string(),
				stray,
			})
		}
	}

	pub(crate) fn remove(&mut self, mapping: &CommandMapping) {
		if let Some(aliases) = self.mapping_to_aliases.remove(mapping) {
			for alias in &aliases {
				self.alias_to_mapping.shift_remove(alias);
			}
		}
		if let Some(mappings) = self.tenant_to_mappings.get_mut(mapping.tenant()) {
			mappings.shift_remove(mapping);
			if mappings.is_empty() {
				self.tenant_to_mappings.shift_remove(mapping.tenant());
			}
		}
	}

	#[cfg(test)]
	pub(crate) fn assert_consistent(&self) {
		for (alias, mapping) in &self.alias_to_mapping {
			let aliases = self.mapping_to_aliases.get(mapping).expect("mapping missing from inverse index");
			assert!(aliases.contains(alias), "{alias} missing from inverse index of {mapping:?}");
		}
		for (mapping, aliases) in &self.mapping_to_aliases {
			for alias in aliases {
				assert_eq!(self.alias_to_mapping.get(alias), Some(mapping), "{alias} does not resolve to {mapping:?}");
			}
			let owned = self.tenant_to_mappings.get(mapping.tenant()).expect("tenant missing");
			assert!(owned.contains(mapping));
		}
		for (tenant, mappings) in &self.tenant_to_mappings {
			assert!(!mappings.is_empty(), "empty tenant set for {tenant}");
			for mapping in mappings {
				assert_eq!(mapping.tenant(), tenant);
				assert!(self.mapping_to_aliases.contains_key(mapping));
			}
		}
	}
}
