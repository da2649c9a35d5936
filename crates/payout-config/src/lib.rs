//! Configuration module for the payout signer.
//!
//! The signer is configured from a TOML file. Values may reference environment
//! variables as `${VAR}` or `${VAR:-default}`, which is how the recipient key
//! and the sealed wallet seed are normally supplied.
//!
//! A file may list others with `include = ["keys.toml"]`. Sections are not
//! merged: each top-level table comes from exactly one file.

mod loader;

use payout_sealed_box::RecipientKeyPair;
use payout_types::{EncryptedSecret, SecretString, TokenConfig};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or checking a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// The file is not valid TOML or does not match [`Config`].
	#[error("Configuration error: {0}")]
	Parse(String),
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the input dump, which may hold keys
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the payout signer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to the signer instance.
	pub signer: SignerConfig,
	/// Recipient key and sealed wallet seed.
	pub keys: KeysConfig,
	/// Token and permit domain metadata.
	pub token: TokenConfig,
	/// Optional HTTP listener settings.
	pub api: Option<ApiConfig>,
}

/// Configuration specific to the signer instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignerConfig {
	/// Identifier used in logs.
	pub id: String,
	/// Seconds from signing until a permit expires.
	#[serde(default = "default_permit_validity_seconds")]
	pub permit_validity_seconds: u64,
}

fn default_permit_validity_seconds() -> u64 {
	3600
}

/// Longest permit validity accepted (one year).
const MAX_PERMIT_VALIDITY_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Key material, both kept hex-encoded until use.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeysConfig {
	/// X25519 secret key the wallet seed was sealed to.
	pub recipient_secret_key: SecretString,
	/// Sealed box (`epk || tag || ciphertext`) holding the wallet seed.
	pub encrypted_wallet_seed: SecretString,
}

/// HTTP listener settings. An absent `[api]` table means the defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	#[serde(default = "default_api_enabled")]
	pub enabled: bool,
	#[serde(default = "default_api_host")]
	pub host: String,
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Largest accepted request body, in bytes.
	#[serde(default = "default_max_request_size")]
	pub max_request_size: usize,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			enabled: default_api_enabled(),
			host: default_api_host(),
			port: default_api_port(),
			max_request_size: default_max_request_size(),
		}
	}
}

fn default_api_enabled() -> bool {
	true
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

/// Signing requests are small JSON objects.
fn default_max_request_size() -> usize {
	16 * 1024
}

/// Substitutes `${NAME}` and `${NAME:-fallback}` references with values from
/// the process environment.
///
/// Input strings are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)));
				},
			},
		};

		result.push_str(&input[last..full_match.start()]);
		result.push_str(&value);
		last = full_match.end();
	}
	result.push_str(&input[last..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, resolving includes and environment
	/// variables.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Validates the configuration.
	///
	/// Both keys are decoded here so that malformed key material is reported
	/// at load time. Token metadata gets the same checks the permit builder
	/// applies.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.signer.id.is_empty() {
			return Err(ConfigError::Validation("Signer ID cannot be empty".into()));
		}
		if self.signer.permit_validity_seconds == 0 {
			return Err(ConfigError::Validation(
				"permit_validity_seconds must be greater than 0".into(),
			));
		}
		if self.signer.permit_validity_seconds > MAX_PERMIT_VALIDITY_SECONDS {
			return Err(ConfigError::Validation(format!(
				"permit_validity_seconds cannot exceed {}",
				MAX_PERMIT_VALIDITY_SECONDS
			)));
		}

		self.recipient_keypair()?;
		self.encrypted_wallet_seed()?;

		if self.token.token_address.is_zero() {
			return Err(ConfigError::Validation(
				"token_address must not be the zero address".into(),
			));
		}
		if self.token.chain_id == 0 {
			return Err(ConfigError::Validation("Unsupported chain id 0".into()));
		}
		if self.token.permit_contract_name.is_empty() {
			return Err(ConfigError::Validation(
				"permit_contract_name cannot be empty".into(),
			));
		}
		if self.token.permit_contract_version.is_empty() {
			return Err(ConfigError::Validation(
				"permit_contract_version cannot be empty".into(),
			));
		}

		if let Some(ref api) = self.api {
			if api.enabled && api.max_request_size == 0 {
				return Err(ConfigError::Validation(
					"api.max_request_size must be greater than 0".into(),
				));
			}
		}

		Ok(())
	}

	/// The recipient X25519 key pair.
	pub fn recipient_keypair(&self) -> Result<RecipientKeyPair, ConfigError> {
		let secret = self.keys.recipient_secret_key.to_bytes32().map_err(|e| {
			ConfigError::Validation(format!("Invalid recipient_secret_key: {}", e))
		})?;
		Ok(RecipientKeyPair::from_secret(secret))
	}

	/// The sealed wallet seed.
	pub fn encrypted_wallet_seed(&self) -> Result<EncryptedSecret, ConfigError> {
		EncryptedSecret::from_hex(self.keys.encrypted_wallet_seed.expose_secret()).map_err(|e| {
			ConfigError::Validation(format!("Invalid encrypted_wallet_seed: {}", e))
		})
	}

	pub fn permit_validity(&self) -> Duration {
		Duration::from_secs(self.signer.permit_validity_seconds)
	}
}

/// Parse a TOML string into a Config with validation.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
