//! ERC-2612 permit signing and signature recovery.

use crate::{AccountError, KeyMaterial};
use alloy_primitives::{Address, B256};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use payout_types::utils::permit_digest;
use payout_types::{PermitMessage, Signature};

/// Signs permit messages with a [`KeyMaterial`].
pub struct PermitSigner;

impl PermitSigner {
	/// Signs the EIP-712 digest of `message` under `domain_separator`.
	///
	/// The message is checked before any cryptographic operation: the owner
	/// must be the signing key's address, and spender and value must be set.
	pub fn sign(
		message: &PermitMessage,
		domain_separator: &B256,
		key: &KeyMaterial,
	) -> Result<Signature, AccountError> {
		if message.owner != key.address() {
			return Err(AccountError::SigningFailed(
				"permit owner does not match the signing key".to_string(),
			));
		}
		if message.spender.is_zero() {
			return Err(AccountError::SigningFailed("permit spender is the zero address".to_string()));
		}
		if message.value.is_zero() {
			return Err(AccountError::SigningFailed("permit value is zero".to_string()));
		}
		if message.deadline.is_zero() {
			return Err(AccountError::SigningFailed("permit deadline is unset".to_string()));
		}

		let digest = permit_digest(domain_separator, message);
		let signature = key.sign_hash(&digest)?;
		tracing::debug!(
			owner = %message.owner,
			spender = %message.spender,
			nonce = %message.nonce,
			"Signed permit"
		);
		Ok(signature)
	}
}

/// Recovers the address that produced `signature` over `digest`.
pub fn recover_signer(signature: &Signature, digest: &B256) -> Result<Address, AccountError> {
	let packed = signature.to_packed();
	let ecdsa = EcdsaSignature::from_slice(&packed[..64])
		.map_err(|_| AccountError::SigningFailed("malformed signature".to_string()))?;
	let recovery_id = signature
		.v
		.checked_sub(27)
		.and_then(RecoveryId::from_byte)
		.ok_or_else(|| AccountError::SigningFailed(format!("invalid recovery byte {}", signature.v)))?;
	let verifying_key = VerifyingKey::recover_from_prehash(digest.as_slice(), &ecdsa, recovery_id)
		.map_err(|_| AccountError::SigningFailed("signature does not recover".to_string()))?;
	Ok(Address::from_public_key(&verifying_key))
}
