//! Command configuration.
//!
//! The only setting is the alias override table, which reserves short
//! aliases for one tenant whether or not it has registered yet:
//!
//! ```toml
//! [commands.aliases]
//! tp = "minecraft"
//! home = "essentials"
//! ```

use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// The config file exists but could not be read.
	#[error("failed to read {path}: {source}")]
	Io {
		/// File being loaded.
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	/// The file is not valid TOML or has the wrong shape.
	#[error("invalid command config: {0}")]
	Parse(#[from] toml::de::Error),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level command configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
	pub commands: CommandsSection,
}

/// The `[commands]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommandsSection {
	pub aliases: AliasOverrides,
}

impl CommandsConfig {
	pub fn from_toml_str(content: &str) -> Result<Self> {
		Ok(toml::from_str(content)?)
	}

	/// Loads the config at `path`. A missing file yields the default config.
	pub fn load(path: &Path) -> Result<Self> {
		let content = match std::fs::read_to_string(path) {
			Ok(content) => content,
			Err(error) if error.kind() == io::ErrorKind::NotFound => {
				tracing::debug!(path = %path.display(), "no command config; using defaults");
				return Ok(Self::default());
			}
			Err(source) => {
				return Err(ConfigError::Io {
					path: path.to_path_buf(),
					source,
				});
			}
		};

		let config = Self::from_toml_str(&content)?;
		tracing::debug!(path = %path.display(), overrides = config.commands.aliases.len(), "loaded command config");
		Ok(config)
	}

	pub fn alias_overrides(&self) -> &AliasOverrides {
		&self.commands.aliases
	}
}

/// Alias to tenant reservations, keyed by lower-cased alias.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "IndexMap<String, String>")]
pub struct AliasOverrides {
	entries: IndexMap<String, String>,
}

impl AliasOverrides {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, alias: &str, tenant: impl Into<String>) -> &mut Self {
		self.entries.insert(alias.to_lowercase(), tenant.into());
		self
	}

	/// Tenant the alias is reserved for, if any.
	pub fn tenant_for(&self, alias: &str) -> Option<&str> {
		self.entries.get(&alias.to_lowercase()).map(String::as_str)
	}

	/// Whether `alias` is reserved for a tenant other than `tenant`.
	///
	/// Tenant ids compare ASCII case-insensitively.
	pub fn reserved_for_other(&self, alias: &str, tenant: &str) -> bool {
		self.tenant_for(alias).is_some_and(|owner| !owner.eq_ignore_ascii_case(tenant))
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries.iter().map(|(alias, tenant)| (alias.as_str(), tenant.as_str()))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl From<IndexMap<String, String>> for AliasOverrides {
	fn from(raw: IndexMap<String, String>) -> Self {
		raw.into_iter().collect()
	}
}

impl<A: AsRef<str>, T: Into<String>> FromIterator<(A, T)> for AliasOverrides {
	fn from_iter<I: IntoIterator<Item = (A, T)>>(iter: I) -> Self {
		let mut overrides = Self::new();
		for (alias, tenant) in iter {
			overrides.insert(alias.as_ref(), tenant);
		}
		overrides
	}
}

#[cfg(test)]
mod tests;
