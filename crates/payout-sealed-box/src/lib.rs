//! Sealed-box codec for the payout signer.
//!
//! Implements libsodium's `crypto_box_seal` construction so secrets sealed by
//! any NaCl-compatible producer can be opened here:
//!
//! 1. The sealed box starts with the sender's ephemeral X25519 public key.
//! 2. X25519(recipient secret, ephemeral public) gives the shared secret.
//! 3. HSalsa20(shared, 0^16) expands it into the XSalsa20-Poly1305 key.
//! 4. The nonce is Blake2b-192(ephemeral public || recipient public).
//! 5. The remainder is a `crypto_secretbox` (16-byte tag, then ciphertext).
//!
//! The tag is checked before any plaintext is returned and every
//! intermediate key is zeroed once the operation finishes.

use blake2::{digest::consts::U24, Blake2b, Digest};
use crypto_secretbox::aead::{self, Aead, KeyInit};
use crypto_secretbox::XSalsa20Poly1305;
use payout_types::{EncryptedSecret, SecretBytes32};
use rand::rngs::OsRng;
use salsa20::cipher::{consts::U10, generic_array::GenericArray};
use thiserror::Error;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::{Zeroize, Zeroizing};

mod keys;

pub use keys::RecipientKeyPair;

type Blake2b192 = Blake2b<U24>;
type SealNonce = aead::Nonce<XSalsa20Poly1305>;

/// Errors that can occur while sealing or opening a box.
///
/// Messages never include key bytes, shared secrets or nonces.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SealedBoxError {
	/// Authentication failed: forged or corrupted ciphertext, or the wrong key.
	#[error("Sealed box authentication failed")]
	DecryptionFailure,
	/// The ciphertext is shorter than the authentication tag.
	#[error("Sealed box is truncated")]
	Truncated,
	/// The peer key produced an all-zero shared secret.
	#[error("Sealed box carries a low-order public key")]
	WeakKey,
	/// The box opened but did not hold a 32-byte secret.
	#[error("Sealed secret has unexpected length {0}")]
	UnexpectedLength(usize),
	#[error("Sealing failed")]
	EncryptionFailure,
}

/// Opens a sealed box and returns the 32-byte secret it carries.
pub fn open(
	sealed: &EncryptedSecret,
	recipient: &RecipientKeyPair,
) -> Result<SecretBytes32, SealedBoxError> {
	let plaintext = open_bytes(sealed, recipient)?;
	SecretBytes32::from_slice(&plaintext)
		.map_err(|_| SealedBoxError::UnexpectedLength(plaintext.len()))
}

/// Opens a sealed box holding a plaintext of any length.
pub fn open_bytes(
	sealed: &EncryptedSecret,
	recipient: &RecipientKeyPair,
) -> Result<Zeroizing<Vec<u8>>, SealedBoxError> {
	if sealed.ciphertext.len() < EncryptedSecret::TAG_LEN {
		return Err(SealedBoxError::Truncated);
	}

	let ephemeral = PublicKey::from(sealed.ephemeral_public_key);
	let cipher = box_cipher(&recipient.static_secret(), &ephemeral)?;
	let nonce = seal_nonce(&sealed.ephemeral_public_key, recipient.public_key());

	let plaintext = cipher
		.decrypt(&nonce, sealed.ciphertext.as_slice())
		.map_err(|_| SealedBoxError::DecryptionFailure)?;
	tracing::trace!(len = plaintext.len(), "Opened sealed box");
	Ok(Zeroizing::new(plaintext))
}

/// Seals `plaintext` to `recipient_public_key` under a fresh ephemeral key.
///
/// The output is byte-compatible with libsodium's `crypto_box_seal`.
pub fn seal(
	plaintext: &[u8],
	recipient_public_key: &[u8; 32],
) -> Result<EncryptedSecret, SealedBoxError> {
	let ephemeral = StaticSecret::random_from_rng(OsRng);
	let ephemeral_public = PublicKey::from(&ephemeral);
	let cipher = box_cipher(&ephemeral, &PublicKey::from(*recipient_public_key))?;
	let nonce = seal_nonce(ephemeral_public.as_bytes(), recipient_public_key);

	let ciphertext = cipher
		.encrypt(&nonce, plaintext)
		.map_err(|_| SealedBoxError::EncryptionFailure)?;
	Ok(EncryptedSecret {
		ephemeral_public_key: ephemeral_public.to_bytes(),
		ciphertext,
	})
}

/// `crypto_box_beforenm`: X25519 followed by HSalsa20 key expansion.
fn box_cipher(secret: &StaticSecret, peer: &PublicKey) -> Result<XSalsa20Poly1305, SealedBoxError> {
	let shared = secret.diffie_hellman(peer);
	if !shared.was_contributory() {
		return Err(SealedBoxError::WeakKey);
	}
	let mut key = salsa20::hsalsa::<U10>(
		GenericArray::from_slice(shared.as_bytes()),
		&GenericArray::default(),
	);
	let cipher = XSalsa20Poly1305::new(&key);
	key.as_mut_slice().zeroize();
	Ok(cipher)
}

/// Blake2b-192 over the ephemeral and recipient public keys.
fn seal_nonce(ephemeral_public: &[u8; 32], recipient_public: &[u8; 32]) -> SealNonce {
	let mut hasher = Blake2b192::new();
	hasher.update(ephemeral_public);
	hasher.update(recipient_public);
	SealNonce::clone_from_slice(&hasher.finalize())
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn recipient() -> RecipientKeyPair {
		RecipientKeyPair::from_secret(SecretBytes32::new([0x42; 32]))
	}

	#[test]
	fn test_seal_open_round_trip() {
		let recipient = recipient();
		let seed = [0x01u8; 32];
		let sealed = seal(&seed, recipient.public_key()).unwrap();
		assert_eq!(sealed.ciphertext.len(), 32 + EncryptedSecret::TAG_LEN);

		let opened = open(&sealed, &recipient).unwrap();
		assert_eq!(opened.expose_secret(), &seed);
		// Opening is pure.
		assert_eq!(open(&sealed, &recipient).unwrap(), opened);
	}

	#[test]
	fn test_opens_libsodium_compatible_box() {
		let recipient = recipient();
		let sodium_recipient = crypto_box::PublicKey::from(*recipient.public_key());
		let seed = [0x01u8; 32];
		let wire = sodium_recipient.seal(&mut OsRng, &seed).unwrap();

		let sealed = EncryptedSecret::from_sealed(&wire).unwrap();
		assert_eq!(open(&sealed, &recipient).unwrap().expose_secret(), &seed);
	}

	#[test]
	fn test_sealed_output_opens_with_libsodium_construction() {
		let recipient = recipient();
		let sealed = seal(b"wallet seed bytes", recipient.public_key()).unwrap();

		let sodium_secret = crypto_box::SecretKey::from(*recipient.secret_key().expose_secret());
		let opened = sodium_secret.unseal(&sealed.to_sealed_bytes()).unwrap();
		assert_eq!(opened, b"wallet seed bytes");
	}

	#[test]
	fn test_every_bit_flip_is_rejected() {
		let recipient = recipient();
		let sealed = seal(&[0x01u8; 32], recipient.public_key()).unwrap();

		for byte in 0..sealed.ciphertext.len() {
			for bit in 0..8 {
				let mut tampered = sealed.clone();
				tampered.ciphertext[byte] ^= 1 << bit;
				assert_eq!(
					open(&tampered, &recipient),
					Err(SealedBoxError::DecryptionFailure),
					"flip at byte {} bit {} was accepted",
					byte,
					bit
				);
			}
		}
	}

	#[test]
	fn test_ephemeral_key_tampering_is_rejected() {
		let recipient = recipient();
		let sealed = seal(&[0x01u8; 32], recipient.public_key()).unwrap();

		for byte in 0..32 {
			let mut tampered = sealed.clone();
			tampered.ephemeral_public_key[byte] ^= 0x01;
			assert!(open(&tampered, &recipient).is_err());
		}
	}

	#[test]
	fn test_wrong_recipient_fails() {
		let sealed = seal(&[0x01u8; 32], recipient().public_key()).unwrap();
		let other = RecipientKeyPair::from_secret(SecretBytes32::new([0x43; 32]));
		assert_eq!(open(&sealed, &other), Err(SealedBoxError::DecryptionFailure));
	}

	#[test]
	fn test_truncated_box_fails() {
		let recipient = recipient();
		let mut sealed = seal(&[0x01u8; 32], recipient.public_key()).unwrap();
		sealed.ciphertext.truncate(EncryptedSecret::TAG_LEN - 1);
		assert_eq!(open(&sealed, &recipient), Err(SealedBoxError::Truncated));

		let mut tag_only = seal(&[0x01u8; 32], recipient.public_key()).unwrap();
		tag_only.ciphertext.truncate(EncryptedSecret::TAG_LEN);
		assert_eq!(open(&tag_only, &recipient), Err(SealedBoxError::DecryptionFailure));
	}

	#[test]
	fn test_low_order_ephemeral_key_fails() {
		let sealed = EncryptedSecret {
			ephemeral_public_key: [0u8; 32],
			ciphertext: vec![0u8; 48],
		};
		assert_eq!(open(&sealed, &recipient()), Err(SealedBoxError::WeakKey));
	}

	#[test]
	fn test_non_seed_plaintext_is_rejected() {
		let recipient = recipient();
		let sealed = seal(&[0x01u8; 31], recipient.public_key()).unwrap();
		assert_eq!(open(&sealed, &recipient), Err(SealedBoxError::UnexpectedLength(31)));
		assert_eq!(open_bytes(&sealed, &recipient).unwrap().as_slice(), &[0x01u8; 31]);
	}

	proptest! {
		#[test]
		fn prop_round_trip_any_seed(seed in any::<[u8; 32]>(), secret in any::<[u8; 32]>()) {
			let recipient = RecipientKeyPair::from_secret(SecretBytes32::new(secret));
			let sealed = seal(&seed, recipient.public_key()).unwrap();
			let opened = open(&sealed, &recipient).unwrap();
			prop_assert_eq!(opened.expose_secret(), &seed);
		}
	}
}
