//! Command alias registry and dispatch for herald.
//!
//! Tenants (plugins or modules) register commands under one or more aliases;
//! the [`CommandRegistry`] resolves the first token of an input line to a
//! [`CommandMapping`] and hands the rest to the mapping's registrar.
//!
//! - [`CommandRegistry`]: alias indices, collision rules, dispatch, completion.
//! - [`Command`]: argument-tree ([`ParameterizedCommand`]) or [`RawCommand`].
//! - [`CommandRegistrar`]: runs the commands behind mappings.
//! - [`CauseStack`]: who issued a command, threaded through execution.
//! - [`CommandsConfig`]: alias reservations loaded from TOML.

mod cause;
mod command;
pub mod config;
mod error;
mod mapping;
mod registrar;
mod registry;
mod tenant;

pub use cause::{Audience, AudienceRef, CauseFrame, CauseStack, CommandCause};
pub use command::{Command, ParameterizedCommand, RawCommand};
pub use config::{AliasOverrides, CommandsConfig, ConfigError};
pub use error::{CommandError, RegistrationError, UnregisterError};
pub use mapping::{CommandMapping, MappingId};
pub use registrar::{CommandRegistrar, ManagedRegistrar, RawRegistrar, RegistrarRef};
pub use registry::{CommandRegistry, CommandRegistryBuilder};
pub use tenant::{PLATFORM_TENANT, RUNTIME_TENANT, TenantId};
