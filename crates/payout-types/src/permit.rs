//! Permit data model.
//!
//! Requests, token metadata, the typed permit message and the packed
//! signature that is returned to the beneficiary.

use crate::utils::{decode_hex, with_0x_prefix, ParseError};
use crate::DecimalAmount;
use alloy_primitives::{hex, Address, B256, U256};
use serde::{Deserialize, Serialize};

/// A validated payout request.
///
/// `user_id` and `issue_id` identify the payout for logging and
/// configuration lookups; they are not part of the signed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermitRequest {
	pub beneficiary: Address,
	pub amount: DecimalAmount,
	pub user_id: String,
	pub issue_id: String,
}

/// ERC-20 token and permit domain metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct TokenConfig {
	/// Token contract; also the EIP-712 verifying contract.
	pub token_address: Address,
	pub decimals: u8,
	pub chain_id: u64,
	/// EIP-712 domain `name`, as returned by the token's `name()`.
	pub permit_contract_name: String,
	/// EIP-712 domain `version`.
	#[serde(default = "default_permit_version")]
	pub permit_contract_version: String,
}

fn default_permit_version() -> String {
	"1".to_string()
}

/// ERC-2612 `Permit` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermitMessage {
	/// Address derived from the signing key.
	pub owner: Address,
	/// The beneficiary allowed to pull the tokens.
	pub spender: Address,
	/// Amount in the token's smallest units.
	pub value: U256,
	pub nonce: U256,
	/// UNIX timestamp after which the permit is void.
	pub deadline: U256,
}

/// A recoverable secp256k1 signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
	pub r: B256,
	pub s: B256,
	/// Recovery byte, 27 or 28.
	pub v: u8,
}

impl Signature {
	pub const PACKED_LEN: usize = 65;

	/// Parses a packed `r || s || v` signature.
	pub fn from_packed(bytes: &[u8]) -> Result<Self, ParseError> {
		if bytes.len() != Self::PACKED_LEN {
			return Err(ParseError::InvalidLength {
				expected: Self::PACKED_LEN,
				actual: bytes.len(),
			});
		}
		Ok(Self {
			r: B256::from_slice(&bytes[..32]),
			s: B256::from_slice(&bytes[32..64]),
			v: bytes[64],
		})
	}

	/// Serialises as `r || s || v`.
	pub fn to_packed(&self) -> [u8; 65] {
		let mut out = [0u8; 65];
		out[..32].copy_from_slice(self.r.as_slice());
		out[32..64].copy_from_slice(self.s.as_slice());
		out[64] = self.v;
		out
	}

	/// `0x`-prefixed hex of the packed signature.
	pub fn to_hex(&self) -> String {
		with_0x_prefix(&hex::encode(self.to_packed()))
	}
}

/// A NaCl sealed box: the sender's ephemeral X25519 public key followed by
/// the authenticated ciphertext (16-byte Poly1305 tag || encrypted body).
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedSecret {
	pub ephemeral_public_key: [u8; 32],
	pub ciphertext: Vec<u8>,
}

impl EncryptedSecret {
	pub const EPHEMERAL_KEY_LEN: usize = 32;
	pub const TAG_LEN: usize = 16;

	/// Splits the output of libsodium's `crypto_box_seal`.
	pub fn from_sealed(bytes: &[u8]) -> Result<Self, ParseError> {
		let min = Self::EPHEMERAL_KEY_LEN + Self::TAG_LEN;
		if bytes.len() < min {
			return Err(ParseError::InvalidLength {
				expected: min,
				actual: bytes.len(),
			});
		}
		let mut ephemeral_public_key = [0u8; 32];
		ephemeral_public_key.copy_from_slice(&bytes[..Self::EPHEMERAL_KEY_LEN]);
		Ok(Self {
			ephemeral_public_key,
			ciphertext: bytes[Self::EPHEMERAL_KEY_LEN..].to_vec(),
		})
	}

	pub fn from_hex(s: &str) -> Result<Self, ParseError> {
		Self::from_sealed(&decode_hex(s)?)
	}

	/// Re-joins the ephemeral key and ciphertext into sealed-box wire form.
	pub fn to_sealed_bytes(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(Self::EPHEMERAL_KEY_LEN + self.ciphertext.len());
		out.extend_from_slice(&self.ephemeral_public_key);
		out.extend_from_slice(&self.ciphertext);
		out
	}

	pub fn to_hex(&self) -> String {
		with_0x_prefix(&hex::encode(self.to_sealed_bytes()))
	}
}

impl std::fmt::Debug for EncryptedSecret {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EncryptedSecret")
			.field("ephemeral_public_key", &hex::encode(self.ephemeral_public_key))
			.field("ciphertext_len", &self.ciphertext.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_signature_packing() {
		let sig = Signature {
			r: B256::repeat_byte(0x11),
			s: B256::repeat_byte(0x22),
			v: 27,
		};
		let packed = sig.to_packed();
		assert_eq!(packed[0], 0x11);
		assert_eq!(packed[32], 0x22);
		assert_eq!(packed[64], 27);
		assert_eq!(Signature::from_packed(&packed).unwrap(), sig);

		let hex = sig.to_hex();
		assert_eq!(hex.len(), 2 + 130);
		assert!(hex.starts_with("0x1111"));
		assert!(hex.ends_with("1b"));
	}

	#[test]
	fn test_signature_rejects_wrong_length() {
		assert!(Signature::from_packed(&[0u8; 64]).is_err());
	}

	#[test]
	fn test_encrypted_secret_split() {
		let mut wire = vec![7u8; 32];
		wire.extend_from_slice(&[9u8; 48]);
		let sealed = EncryptedSecret::from_sealed(&wire).unwrap();
		assert_eq!(sealed.ephemeral_public_key, [7u8; 32]);
		assert_eq!(sealed.ciphertext.len(), 48);
		assert_eq!(sealed.to_sealed_bytes(), wire);
		assert_eq!(EncryptedSecret::from_hex(&sealed.to_hex()).unwrap(), sealed);
	}

	#[test]
	fn test_encrypted_secret_too_short() {
		assert!(matches!(
			EncryptedSecret::from_sealed(&[0u8; 47]),
			Err(ParseError::InvalidLength { expected: 48, actual: 47 })
		));
	}

	#[test]
	fn test_token_config_default_version() {
		let token: TokenConfig = serde_json::from_str(
			r#"{
				"token_address": "0xe91D153E0b41518A2Ce8Dd3D7944Fa863463a97d",
				"decimals": 18,
				"chain_id": 100,
				"permit_contract_name": "Wrapped XDAI"
			}"#,
		)
		.unwrap();
		assert_eq!(token.permit_contract_version, "1");
	}
}
