//! Loader for configurations split across several files.
//!
//! A main file may pull in others with `include`. Every top-level section
//! must come from exactly one file, so secrets can live in a separate file
//! without any merge rules. Included files cannot include further files.

use crate::{resolve_env_vars, Config, ConfigError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use toml::value::Table;

/// One parsed file and the tables it contributes.
struct Fragment {
	origin: PathBuf,
	sections: Table,
}

pub struct ConfigLoader {
	root: PathBuf,
	seen: HashSet<PathBuf>,
}

impl ConfigLoader {
	/// Relative paths, including those of includes, resolve against `root`.
	pub fn new(root: impl AsRef<Path>) -> Self {
		Self {
			root: root.as_ref().to_path_buf(),
			seen: HashSet::new(),
		}
	}

	/// Loads a configuration file and all of its includes, then validates.
	pub async fn load_config(&mut self, path: impl AsRef<Path>) -> Result<Config, ConfigError> {
		let mut main = self.read_fragment(path.as_ref()).await?;
		let includes = match main.sections.remove("include") {
			Some(value) => include_paths(value)?,
			None => Vec::new(),
		};

		let mut fragments = Vec::with_capacity(includes.len());
		for include in &includes {
			let fragment = self.read_fragment(include).await?;
			if fragment.sections.contains_key("include") {
				return Err(ConfigError::Validation(format!(
					"Nested include in {} is not supported",
					fragment.origin.display()
				)));
			}
			fragments.push(fragment);
		}

		let merged = merge(main, fragments)?;
		tracing::debug!(files = self.seen.len(), "Loaded configuration files");
		let config: Config = toml::Value::Table(merged).try_into()?;
		config.validate()?;
		Ok(config)
	}

	async fn read_fragment(&mut self, path: &Path) -> Result<Fragment, ConfigError> {
		let joined = if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.root.join(path)
		};
		let origin = tokio::fs::canonicalize(&joined).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Configuration file {} not readable: {}", joined.display(), e),
			))
		})?;
		if !self.seen.insert(origin.clone()) {
			return Err(ConfigError::Validation(format!(
				"{} was already loaded, includes must not form a cycle",
				origin.display()
			)));
		}

		let raw = tokio::fs::read_to_string(&origin).await?;
		let sections: Table = toml::from_str(&resolve_env_vars(&raw)?)?;
		Ok(Fragment { origin, sections })
	}
}

fn include_paths(value: toml::Value) -> Result<Vec<PathBuf>, ConfigError> {
	match value {
		toml::Value::String(path) => Ok(vec![PathBuf::from(path)]),
		toml::Value::Array(items) => items
			.into_iter()
			.map(|item| match item {
				toml::Value::String(path) => Ok(PathBuf::from(path)),
				other => Err(ConfigError::Validation(format!(
					"include entries must be strings, found {}",
					other.type_str()
				))),
			})
			.collect(),
		other => Err(ConfigError::Validation(format!(
			"include must be a string or a list of strings, found {}",
			other.type_str()
		))),
	}
}

/// Joins all fragments into one table. A section defined twice is an error.
fn merge(main: Fragment, fragments: Vec<Fragment>) -> Result<Table, ConfigError> {
	let mut owners: Vec<(String, PathBuf)> = main
		.sections
		.keys()
		.map(|key| (key.clone(), main.origin.clone()))
		.collect();
	let mut merged = main.sections;

	for fragment in fragments {
		for (key, value) in fragment.sections {
			if let Some((_, owner)) = owners.iter().find(|(section, _)| *section == key) {
				return Err(ConfigError::Validation(format!(
					"Duplicate section '{}' in {} (already set by {})",
					key,
					fragment.origin.display(),
					owner.display()
				)));
			}
			owners.push((key.clone(), fragment.origin.clone()));
			merged.insert(key, value);
		}
	}
	Ok(merged)
}

#[cfg(test)]
mod tests {
	use super::*;
	use payout_sealed_box::RecipientKeyPair;
	use std::fs;
	use tempfile::TempDir;

	const SIGNER_AND_TOKEN: &str = r#"
[signer]
id = "payout-signer"
permit_validity_seconds = 600

[token]
token_address = "0xe91D153E0b41518A2Ce8Dd3D7944Fa863463a97d"
decimals = 18
chain_id = 100
permit_contract_name = "Wrapped XDAI"
permit_contract_version = "1"
"#;

	fn keys_section() -> String {
		let recipient = RecipientKeyPair::generate();
		let sealed = payout_sealed_box::seal(&[3u8; 32], recipient.public_key()).unwrap();
		format!(
			"[keys]\nrecipient_secret_key = \"{}\"\nencrypted_wallet_seed = \"{}\"\n",
			payout_types::hex::encode(recipient.secret_key().expose_secret()),
			sealed.to_hex()
		)
	}

	#[tokio::test]
	async fn test_single_file_config() {
		let temp_dir = TempDir::new().unwrap();
		let config_path = temp_dir.path().join("config.toml");
		fs::write(&config_path, format!("{}\n{}", SIGNER_AND_TOKEN, keys_section())).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let config = loader.load_config(&config_path).await.unwrap();

		assert_eq!(config.signer.id, "payout-signer");
		assert_eq!(config.signer.permit_validity_seconds, 600);
	}

	#[tokio::test]
	async fn test_from_file_with_includes() {
		let temp_dir = TempDir::new().unwrap();
		let main = format!("include = [\"keys.toml\"]\n{}", SIGNER_AND_TOKEN);
		fs::write(temp_dir.path().join("main.toml"), main).unwrap();
		fs::write(temp_dir.path().join("keys.toml"), keys_section()).unwrap();

		let path = temp_dir.path().join("main.toml");
		let config = Config::from_file(path.to_str().unwrap()).await.unwrap();

		assert_eq!(config.token.chain_id, 100);
		assert!(config.recipient_keypair().is_ok());
	}

	#[tokio::test]
	async fn test_duplicate_section_error() {
		let temp_dir = TempDir::new().unwrap();
		let main = format!("include = \"dup.toml\"\n{}\n{}", SIGNER_AND_TOKEN, keys_section());
		fs::write(temp_dir.path().join("main.toml"), main).unwrap();
		fs::write(temp_dir.path().join("dup.toml"), "[signer]\nid = \"other\"\n").unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let err = loader.load_config("main.toml").await.unwrap_err();
		assert!(err.to_string().contains("Duplicate section 'signer'"));
	}

	#[tokio::test]
	async fn test_self_include_detection() {
		let temp_dir = TempDir::new().unwrap();
		fs::write(
			temp_dir.path().join("self.toml"),
			"include = [\"self.toml\"]\n[signer]\nid = \"s\"\n",
		)
		.unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let err = loader.load_config("self.toml").await.unwrap_err();
		assert!(err.to_string().contains("already loaded"));
	}

	#[tokio::test]
	async fn test_nested_include_rejected() {
		let temp_dir = TempDir::new().unwrap();
		fs::write(temp_dir.path().join("main.toml"), "include = \"a.toml\"\n").unwrap();
		fs::write(temp_dir.path().join("a.toml"), "include = \"b.toml\"\n").unwrap();
		fs::write(temp_dir.path().join("b.toml"), SIGNER_AND_TOKEN).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let err = loader.load_config("main.toml").await.unwrap_err();
		assert!(err.to_string().contains("Nested include"));
	}

	#[tokio::test]
	async fn test_env_values_are_resolved_once() {
		let temp_dir = TempDir::new().unwrap();
		let main = SIGNER_AND_TOKEN.replace(
			"id = \"payout-signer\"",
			"id = \"${PAYOUT_LOADER_SIGNER_ID}\"",
		);
		fs::write(temp_dir.path().join("main.toml"), format!("{}\n{}", main, keys_section())).unwrap();
		std::env::set_var("PAYOUT_LOADER_SIGNER_ID", "id-${PAYOUT_LOADER_UNSET}");

		let mut loader = ConfigLoader::new(temp_dir.path());
		let config = loader.load_config("main.toml").await.unwrap();
		assert_eq!(config.signer.id, "id-${PAYOUT_LOADER_UNSET}");
	}

	#[tokio::test]
	async fn test_missing_file() {
		let temp_dir = TempDir::new().unwrap();
		let mut loader = ConfigLoader::new(temp_dir.path());
		let err = loader.load_config("absent.toml").await.unwrap_err();
		assert!(matches!(err, ConfigError::Io(_)));
	}
}
