use std::io::Write;

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn parses_alias_table_and_lowercases_keys() {
	let config = CommandsConfig::from_toml_str(
		r#"
		[commands.aliases]
		TP = "minecraft"
		home = "Essentials"
		"#,
	)
	.unwrap();

	let overrides = config.alias_overrides();
	assert_eq!(overrides.iter().collect::<Vec<_>>(), [("tp", "minecraft"), ("home", "Essentials")]);
	assert_eq!(overrides.tenant_for("Tp"), Some("minecraft"));
	assert!(!overrides.reserved_for_other("home", "essentials"));
	assert!(overrides.reserved_for_other("home", "worldedit"));
	assert!(!overrides.reserved_for_other("spawn", "worldedit"));
}

#[test]
fn empty_document_is_default() {
	assert_eq!(CommandsConfig::from_toml_str("").unwrap(), CommandsConfig::default());
	assert_eq!(CommandsConfig::from_toml_str("[commands]").unwrap(), CommandsConfig::default());
}

#[test]
fn wrong_shape_is_parse_error() {
	let err = CommandsConfig::from_toml_str("[commands]\naliases = 3").unwrap_err();
	assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn load_reads_file() {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	writeln!(file, "[commands.aliases]\nwarp = \"essentials\"").unwrap();

	let config = CommandsConfig::load(file.path()).unwrap();
	assert_eq!(config.alias_overrides().tenant_for("warp"), Some("essentials"));
}

#[test]
fn load_missing_file_is_default() {
	let dir = tempfile::tempdir().unwrap();
	let config = CommandsConfig::load(&dir.path().join("commands.toml")).unwrap();
	assert!(config.alias_overrides().is_empty());
}

#[test]
fn load_directory_is_io_error() {
	let dir = tempfile::tempdir().unwrap();
	let err = CommandsConfig::load(dir.path()).unwrap_err();
	assert!(matches!(err, ConfigError::Io { .. }));
}
