use crate::AccountError;
use alloy_primitives::{Address, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use payout_types::{SecretBytes32, Signature};
use std::fmt;

/// A secp256k1 signing key derived from a 32-byte wallet seed.
///
/// The seed is used directly as the private scalar, so the same seed always
/// yields the same address. The underlying k256 key zeroes itself on drop.
pub struct KeyMaterial {
	signer: PrivateKeySigner,
}

impl KeyMaterial {
	/// Builds the signing key for `seed`.
	///
	/// Fails if the seed is zero or not below the curve order.
	pub fn from_seed(seed: &SecretBytes32) -> Result<Self, AccountError> {
		let signer = PrivateKeySigner::from_slice(seed.expose_secret()).map_err(|_| {
			AccountError::InvalidKey("seed is not a valid secp256k1 scalar".to_string())
		})?;
		Ok(Self { signer })
	}

	/// The Ethereum address of the key.
	pub fn address(&self) -> Address {
		self.signer.address()
	}

	/// Signs a 32-byte prehash with an RFC 6979 deterministic nonce.
	pub fn sign_hash(&self, hash: &B256) -> Result<Signature, AccountError> {
		let signature = self
			.signer
			.sign_hash_sync(hash)
			.map_err(|e| AccountError::SigningFailed(e.to_string()))?;
		Signature::from_packed(&signature.as_bytes())
			.map_err(|e| AccountError::SigningFailed(e.to_string()))
	}

	/// Drops the key, zeroing its scalar.
	pub fn discard(self) {
		drop(self);
	}
}

impl fmt::Debug for KeyMaterial {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("KeyMaterial")
			.field("address", &self.address())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{address, hex};

	#[test]
	fn test_from_seed_derives_known_address() {
		let seed = SecretBytes32::from_hex(
			"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
		)
		.unwrap();
		let key = KeyMaterial::from_seed(&seed).unwrap();
		assert_eq!(
			key.address(),
			address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
		);
	}

	#[test]
	fn test_from_seed_is_deterministic() {
		let seed = SecretBytes32::new([0x01; 32]);
		let a = KeyMaterial::from_seed(&seed).unwrap();
		let b = KeyMaterial::from_seed(&seed).unwrap();
		assert_eq!(a.address(), b.address());
		a.discard();
	}

	#[test]
	fn test_rejects_invalid_scalars() {
		assert!(matches!(
			KeyMaterial::from_seed(&SecretBytes32::new([0u8; 32])),
			Err(AccountError::InvalidKey(_))
		));
		assert!(KeyMaterial::from_seed(&SecretBytes32::new([0xff; 32])).is_err());
	}

	#[test]
	fn test_debug_shows_only_address() {
		let seed_hex = "0101010101010101010101010101010101010101010101010101010101010101";
		let key = KeyMaterial::from_seed(&SecretBytes32::from_hex(seed_hex).unwrap()).unwrap();
		let debug = format!("{:?}", key);
		assert!(debug.to_lowercase().contains(&hex::encode(key.address())));
		assert!(!debug.contains(seed_hex));
	}

	#[test]
	fn test_sign_hash_is_deterministic() {
		let key = KeyMaterial::from_seed(&SecretBytes32::new([0x01; 32])).unwrap();
		let hash = B256::repeat_byte(0x5a);
		let a = key.sign_hash(&hash).unwrap();
		let b = key.sign_hash(&hash).unwrap();
		assert_eq!(a, b);
		assert!(a.v == 27 || a.v == 28);
		assert_ne!(a, key.sign_hash(&B256::repeat_byte(0x5b)).unwrap());
	}
}
