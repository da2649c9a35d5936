//! Wrappers for secret material.
//!
//! `SecretString` holds sensitive configuration values (hex-encoded keys) and
//! `SecretBytes32` holds raw 32-byte keys and seeds. Both zero their memory on
//! drop and render as a redaction marker in `Debug`, `Display` and serde output.

use crate::utils::formatting::without_0x_prefix;
use crate::ParseError;
use alloy_primitives::hex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, Zeroizing};

const REDACTED: &str = "***REDACTED***";

/// A string that is zeroed on drop and never printed.
#[derive(Clone)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
	pub fn new(s: String) -> Self {
		Self(Zeroizing::new(s))
	}

	/// Exposes the secret string as a string slice.
	///
	/// # Security Warning
	/// The returned slice must not be logged or copied into long-lived storage.
	pub fn expose_secret(&self) -> &str {
		&self.0
	}

	/// Decodes the secret as 32 hex-encoded bytes, with or without `0x`.
	pub fn to_bytes32(&self) -> Result<SecretBytes32, ParseError> {
		SecretBytes32::from_hex(self.expose_secret())
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretString({})", REDACTED)
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl From<&str> for SecretString {
	fn from(s: &str) -> Self {
		Self::new(s.to_string())
	}
}

impl From<String> for SecretString {
	fn from(s: String) -> Self {
		Self::new(s)
	}
}

impl Serialize for SecretString {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(REDACTED)
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		Ok(SecretString::new(s))
	}
}

/// 32 bytes of secret key material (an X25519 secret or a wallet seed).
#[derive(Clone, PartialEq, Eq)]
pub struct SecretBytes32(Zeroizing<[u8; 32]>);

impl SecretBytes32 {
	pub fn new(bytes: [u8; 32]) -> Self {
		Self(Zeroizing::new(bytes))
	}

	/// Copies 32 bytes out of a slice; any other length is rejected.
	pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseError> {
		if bytes.len() != 32 {
			return Err(ParseError::InvalidLength {
				expected: 32,
				actual: bytes.len(),
			});
		}
		let mut out = Zeroizing::new([0u8; 32]);
		out.copy_from_slice(bytes);
		Ok(Self(out))
	}

	/// Decodes 64 hex characters, with or without a `0x` prefix.
	pub fn from_hex(s: &str) -> Result<Self, ParseError> {
		let mut decoded = hex::decode(without_0x_prefix(s.trim())).map_err(|_| ParseError::InvalidHex)?;
		let result = Self::from_slice(&decoded);
		decoded.zeroize();
		result
	}

	pub fn expose_secret(&self) -> &[u8; 32] {
		&self.0
	}
}

impl fmt::Debug for SecretBytes32 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretBytes32({})", REDACTED)
	}
}
