//! Driver configuration file.
//!
//! ```toml
//! [registry]
//! name = "objects"
//! label_prefix = "added from "
//!
//! [driver]
//! label = "object"
//! values = [42, 7]
//! ```

use std::path::{Path, PathBuf};

use keyward_registry::RegistryOptions;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	pub registry: RegistryOptions,
	pub driver: DriverSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverSection {
	pub label: Option<String>,
	pub values: Vec<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse {}: {source}", path.display())]
	Parse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},
}

impl Config {
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_owned(),
			source,
		})?;
		toml::from_str(&text).map_err(|source| ConfigError::Parse {
			path: path.to_owned(),
			source,
		})
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn test_load_full_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			"[registry]\nname = \"objects\"\nlabel_prefix = \"from \"\n\n[driver]\nlabel = \"obj\"\nvalues = [1, 2]"
		)
		.unwrap();

		let config = Config::load(file.path()).unwrap();
		assert_eq!(
			config,
			Config {
				registry: RegistryOptions {
					name: "objects".to_owned(),
					label_prefix: "from ".to_owned(),
				},
				driver: DriverSection {
					label: Some("obj".to_owned()),
					values: vec![1, 2],
				},
			}
		);
	}

	#[test]
	fn test_missing_sections_use_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[registry]\nname = \"only-name\"").unwrap();

		let config = Config::load(file.path()).unwrap();
		assert_eq!(config.registry.name, "only-name");
		assert_eq!(config.registry.label_prefix, "added from ");
		assert_eq!(config.driver, DriverSection::default());
	}

	#[test]
	fn test_unknown_field_is_rejected() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[registry]\nlabel_prefx = \"typo\"").unwrap();

		assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse { .. })));
	}

	#[test]
	fn test_missing_file_is_io_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = Config::load(&dir.path().join("absent.toml")).unwrap_err();
		assert!(matches!(err, ConfigError::Io { .. }));
		assert!(err.to_string().contains("absent.toml"));
	}
}
