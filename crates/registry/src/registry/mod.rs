//! Tenant-aware alias registry with atomic publication.
//!
//! # Role
//!
//! [`CommandRegistry`] maps lower-cased aliases to [`CommandMapping`]s and
//! dispatches input to the owning registrar. Every tenant's primary alias is
//! also claimable as `tenant:alias`; all other aliases are first-claimed-wins
//! and may be reserved for one tenant by configuration.
//!
//! # Invariants
//!
//! - The three indices live in one [`Indices`] snapshot behind an `ArcSwap`.
//!   Writers build a new snapshot under `write_lock` and publish it whole, so
//!   readers see either the old or the new state of all three.
//! - A failed registration publishes nothing.
//! - No lock is held while a registrar runs; commands may call back into the
//!   registry.
//! - Mappings owned by protected tenants are never unregistered individually.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use arc_swap::ArcSwap;
use herald_invocation::{CommandResult, panic_message};
use indexmap::IndexSet;
use parking_lot::Mutex;

use crate::cause::{AudienceRef, CauseStack};
use crate::command::Command;
use crate::config::{AliasOverrides, CommandsConfig};
use crate::error::{CommandError, RegistrationError, UnregisterError};
use crate::mapping::{CommandMapping, MappingId};
use crate::registrar::{ManagedRegistrar, RawRegistrar, RegistrarRef};
use crate::tenant::TenantId;

mod index;

use index::Indices;

/// Alias registry and dispatcher for every tenant's commands.
pub struct CommandRegistry {
	indices: ArcSwap<Indices>,
	write_lock: Mutex<()>,
	overrides: ArcSwap<AliasOverrides>,
	protected: Vec<TenantId>,
	causes: CauseStack,
	managed: Arc<ManagedRegistrar>,
	raw: Arc<RawRegistrar>,
}

/// Construction options for [`CommandRegistry`].
pub struct CommandRegistryBuilder {
	protected: Vec<TenantId>,
	overrides: AliasOverrides,
}

impl Default for CommandRegistryBuilder {
	fn default() -> Self {
		Self {
			protected: vec![TenantId::platform(), TenantId::runtime()],
			overrides: AliasOverrides::default(),
		}
	}
}

impl CommandRegistryBuilder {
	/// Adds a tenant whose mappings cannot be unregistered.
	pub fn protect(mut self, tenant: impl Into<TenantId>) -> Self {
		self.protected.push(tenant.into());
		self
	}

	/// Drops the default protected tenants.
	pub fn without_protection(mut self) -> Self {
		self.protected.clear();
		self
	}

	pub fn alias_overrides(mut self, overrides: AliasOverrides) -> Self {
		self.overrides = overrides;
		self
	}

	pub fn config(self, config: &CommandsConfig) -> Self {
		self.alias_overrides(config.alias_overrides().clone())
	}

	pub fn build(self) -> CommandRegistry {
		CommandRegistry {
			indices: ArcSwap::from_pointee(Indices::default()),
			write_lock: Mutex::new(()),
			overrides: ArcSwap::from_pointee(self.overrides),
			protected: self.protected,
			causes: CauseStack::new(),
			managed: Arc::new(ManagedRegistrar::new()),
			raw: Arc::new(RawRegistrar::new()),
		}
	}
}

impl Default for CommandRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl CommandRegistry {
	pub fn new() -> Self {
		Self::builder().build()
	}

	pub fn builder() -> CommandRegistryBuilder {
		CommandRegistryBuilder::default()
	}

	/// Registers `command` with the built-in registrar for its kind.
	pub fn register(&self, tenant: &TenantId, command: Command, primary: &str, secondary: &[&str]) -> Result<CommandMapping, RegistrationError> {
		match command {
			Command::Parameterized(command) => {
				let managed = Arc::clone(&self.managed);
				self.register_with(managed.clone(), tenant, primary, secondary, move |mapping| managed.bind(mapping, command))
			}
			Command::Raw(command) => {
				let raw = Arc::clone(&self.raw);
				self.register_with(raw.clone(), tenant, primary, secondary, move |mapping| raw.bind(mapping, command))
			}
		}
	}

	/// Claims aliases for a command owned by an external registrar.
	///
	/// The registrar is expected to already know how to run the command
	/// behind the returned mapping.
	pub fn register_alias(
		&self,
		registrar: RegistrarRef,
		tenant: &TenantId,
		primary: &str,
		secondary: &[&str],
	) -> Result<CommandMapping, RegistrationError> {
		self.register_with(registrar, tenant, primary, secondary, |_| {})
	}

	fn register_with(
		&self,
		registrar: RegistrarRef,
		tenant: &TenantId,
		primary: &str,
		secondary: &[&str],
		bind: impl FnOnce(&CommandMapping),
	) -> Result<CommandMapping, RegistrationError> {
		if let Some(alias) = std::iter::once(&primary).chain(secondary).find(|alias| !is_valid_alias(alias)) {
			return Err(RegistrationError::InvalidAlias { alias: alias.to_string() });
		}

		let primary_lower = primary.to_lowercase();
		let namespaced = format!("{}:{primary_lower}", tenant.as_str().to_lowercase());

		let _guard = self.write_lock.lock();
		let current = self.indices.load_full();

		if current.contains_alias(&namespaced) {
			tracing::warn!(tenant = %tenant, alias = %namespaced, "namespaced alias is already registered");
			return Err(RegistrationError::AlreadyRegistered { alias: namespaced });
		}

		let mut candidates = IndexSet::new();
		candidates.insert(primary_lower);
		candidates.insert(namespaced);
		candidates.extend(secondary.iter().map(|alias| alias.to_lowercase()));

		candidates.retain(|alias| {
			let taken = current.contains_alias(alias);
			if taken {
				tracing::debug!(tenant = %tenant, alias = %alias, "alias already claimed; dropping");
			}
			!taken
		});

		let overrides = self.overrides.load();
		candidates.retain(|alias| {
			let reserved = overrides.reserved_for_other(alias, tenant.as_str());
			if reserved {
				tracing::debug!(
					tenant = %tenant,
					alias = %alias,
					owner = overrides.tenant_for(alias).unwrap_or_default(),
					"alias reserved by config; dropping"
				);
			}
			!reserved
		});

		if candidates.is_empty() {
			tracing::warn!(tenant = %tenant, primary, "no aliases could be registered");
			return Err(RegistrationError::NoAliasesAvailable {
				tenant: tenant.clone(),
				primary: primary.to_string(),
			});
		}

		let mut next = Indices::clone(&current);
		let mapping = CommandMapping::new(MappingId::next(), primary, candidates.into_iter().collect(), tenant.clone(), registrar);
		next.insert(&mapping);
		bind(&mapping);
		self.indices.store(Arc::new(next));

		tracing::debug!(
			tenant = %tenant,
			primary,
			aliases = ?mapping.all_aliases(),
			registrar = mapping.registrar().id(),
			"registered command"
		);
		Ok(mapping)
	}

	/// Removes `mapping` from every index and notifies its registrar.
	pub fn try_unregister(&self, mapping: &CommandMapping) -> Result<CommandMapping, UnregisterError> {
		if self.is_protected(mapping.tenant()) {
			tracing::debug!(tenant = %mapping.tenant(), alias = mapping.primary_alias(), "refusing to unregister protected mapping");
			return Err(UnregisterError::Protected {
				tenant: mapping.tenant().clone(),
			});
		}

		{
			let _guard = self.write_lock.lock();
			let current = self.indices.load_full();
			if let Err(error) = current.check(mapping) {
				if matches!(error, UnregisterError::Inconsistent { .. }) {
					tracing::error!(%error, "alias index drift; leaving mapping registered");
				}
				return Err(error);
			}

			let mut next = Indices::clone(&current);
			next.remove(mapping);
			self.indices.store(Arc::new(next));
		}

		mapping.registrar().unregister(mapping);
		tracing::debug!(tenant = %mapping.tenant(), alias = mapping.primary_alias(), "unregistered command");
		Ok(mapping.clone())
	}

	/// Removes `mapping`, or returns `None` if it was protected, unknown or
	/// inconsistent with the indices.
	pub fn unregister(&self, mapping: &CommandMapping) -> Option<CommandMapping> {
		self.try_unregister(mapping).ok()
	}

	/// Unregisters every mapping owned by `tenant`, returning those removed.
	pub fn unregister_all(&self, tenant: &TenantId) -> Vec<CommandMapping> {
		self.mappings_of(tenant).iter().filter_map(|mapping| self.unregister(mapping)).collect()
	}

	/// Drops every mapping, protected ones included, and notifies registrars.
	pub fn clear(&self) {
		let previous = {
			let _guard = self.write_lock.lock();
			let current = self.indices.load_full();
			self.indices.store(Arc::new(Indices::default()));
			current
		};

		for mapping in previous.mapping_to_aliases.keys() {
			mapping.registrar().unregister(mapping);
		}
		tracing::debug!(removed = previous.mapping_to_aliases.len(), "cleared command registry");
	}

	/// Runs `input` as `head args`, where `head` is an alias.
	pub fn process(&self, input: &str) -> Result<CommandResult, CommandError> {
		let frame = self.causes.push_frame();
		frame.add_command(input);

		let (head, args) = split_input(input);
		let Some(mapping) = self.mapping(head) else {
			tracing::debug!(alias = head, "unknown command");
			return Err(CommandError::unknown(head));
		};

		let cause = self.causes.current_cause();
		tracing::trace!(alias = head, tenant = %mapping.tenant(), depth = frame.depth(), "dispatching command");
		mapping.registrar().process(&cause, &mapping, args)
	}

	/// Runs `input` on behalf of `subject`, sending output to `audience`.
	pub fn process_as(&self, subject: &str, audience: AudienceRef, input: &str) -> Result<CommandResult, CommandError> {
		let frame = self.causes.push_frame();
		frame.push_cause(subject);
		frame.add_subject(subject);
		frame.add_audience(audience);
		self.process(input)
	}

	/// Completions for `input`. Never fails; faults yield no suggestions.
	pub fn suggest(&self, input: &str) -> Vec<String> {
		match catch_unwind(AssertUnwindSafe(|| self.suggest_inner(input))) {
			Ok(suggestions) => suggestions,
			Err(payload) => {
				tracing::warn!(input, panic = %panic_message(payload.as_ref()), "suggestion provider panicked");
				Vec::new()
			}
		}
	}

	/// [`suggest`](Self::suggest) on behalf of `subject`.
	pub fn suggest_as(&self, subject: &str, audience: AudienceRef, input: &str) -> Vec<String> {
		let frame = self.causes.push_frame();
		frame.push_cause(subject);
		frame.add_subject(subject);
		frame.add_audience(audience);
		self.suggest(input)
	}

	fn suggest_inner(&self, input: &str) -> Vec<String> {
		let frame = self.causes.push_frame();
		frame.add_command(input);

		match input.split_once(' ') {
			Some((head, rest)) => {
				let Some(mapping) = self.mapping(head) else {
					return Vec::new();
				};
				let cause = self.causes.current_cause();
				mapping.registrar().suggestions(&cause, &mapping, rest)
			}
			None => {
				let prefix = input.to_lowercase();
				let snapshot = self.indices.load();
				snapshot.alias_to_mapping.keys().filter(|alias| alias.starts_with(&prefix)).cloned().collect()
			}
		}
	}

	/// Mapping an alias resolves to, compared case-insensitively.
	pub fn mapping(&self, alias: &str) -> Option<CommandMapping> {
		self.indices.load().alias_to_mapping.get(&alias.to_lowercase()).cloned()
	}

	pub fn is_registered(&self, mapping: &CommandMapping) -> bool {
		self.indices.load().mapping_to_aliases.contains_key(mapping)
	}

	/// Tenants owning at least one mapping, in first-registration order.
	pub fn tenants(&self) -> Vec<TenantId> {
		self.indices.load().tenant_to_mappings.keys().cloned().collect()
	}

	pub fn mappings(&self) -> Vec<CommandMapping> {
		self.indices.load().tenant_to_mappings.values().flatten().cloned().collect()
	}

	pub fn mappings_of(&self, tenant: &TenantId) -> Vec<CommandMapping> {
		self.indices
			.load()
			.tenant_to_mappings
			.get(tenant)
			.map(|mappings| mappings.iter().cloned().collect())
			.unwrap_or_default()
	}

	/// Every registered alias, in registration order.
	pub fn aliases(&self) -> Vec<String> {
		self.indices.load().alias_to_mapping.keys().cloned().collect()
	}

	/// Aliases currently resolving to `mapping`.
	pub fn aliases_of(&self, mapping: &CommandMapping) -> Vec<String> {
		self.indices
			.load()
			.mapping_to_aliases
			.get(mapping)
			.map(|aliases| aliases.iter().cloned().collect())
			.unwrap_or_default()
	}

	pub fn is_protected(&self, tenant: &TenantId) -> bool {
		self.protected.iter().any(|protected| protected.matches(tenant.as_str()))
	}

	/// Replaces the alias override table. Affects later registrations only.
	pub fn set_alias_overrides(&self, overrides: AliasOverrides) {
		tracing::debug!(overrides = overrides.len(), "updated alias overrides");
		self.overrides.store(Arc::new(overrides));
	}

	pub fn set_config(&self, config: &CommandsConfig) {
		self.set_alias_overrides(config.alias_overrides().clone());
	}

	pub fn alias_overrides(&self) -> Arc<AliasOverrides> {
		self.overrides.load_full()
	}

	/// Cause stack used for dispatch; commands may push their own frames.
	pub fn causes(&self) -> &CauseStack {
		&self.causes
	}

	pub fn managed_registrar(&self) -> &ManagedRegistrar {
		&self.managed
	}

	pub fn raw_registrar(&self) -> &RawRegistrar {
		&self.raw
	}
}

fn is_valid_alias(alias: &str) -> bool {
	!alias.is_empty() && !alias.chars().any(char::is_whitespace)
}

/// Splits on the first ASCII space; the remainder is kept verbatim.
fn split_input(input: &str) -> (&str, &str) {
	input.split_once(' ').unwrap_or((input, ""))
}
