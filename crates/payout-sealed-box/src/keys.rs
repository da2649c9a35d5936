//! X25519 recipient keys for sealed boxes.

use payout_types::{hex, with_0x_prefix, SecretBytes32};
use rand::rngs::OsRng;
use std::fmt;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroize;

/// The long-lived keypair sealed boxes are addressed to.
///
/// Loaded once by the caller and lent to each signing run; the secret half
/// is zeroed when the pair is dropped.
#[derive(Clone)]
pub struct RecipientKeyPair {
	public_key: [u8; 32],
	secret_key: SecretBytes32,
}

impl RecipientKeyPair {
	/// Derives the public key from a 32-byte X25519 secret.
	pub fn from_secret(secret_key: SecretBytes32) -> Self {
		let public_key = PublicKey::from(&to_static_secret(&secret_key)).to_bytes();
		Self {
			public_key,
			secret_key,
		}
	}

	/// Generates a fresh keypair from the operating system RNG.
	pub fn generate() -> Self {
		let secret = StaticSecret::random_from_rng(OsRng);
		Self::from_secret(SecretBytes32::new(secret.to_bytes()))
	}

	pub fn public_key(&self) -> &[u8; 32] {
		&self.public_key
	}

	/// Exposes the secret half, for writing it out in `keygen`.
	pub fn secret_key(&self) -> &SecretBytes32 {
		&self.secret_key
	}

	pub(crate) fn static_secret(&self) -> StaticSecret {
		to_static_secret(&self.secret_key)
	}
}

fn to_static_secret(secret: &SecretBytes32) -> StaticSecret {
	let mut bytes = *secret.expose_secret();
	let static_secret = StaticSecret::from(bytes);
	bytes.zeroize();
	static_secret
}

impl fmt::Debug for RecipientKeyPair {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RecipientKeyPair")
			.field("public_key", &with_0x_prefix(&hex::encode(self.public_key)))
			.field("secret_key", &self.secret_key)
			.finish()
	}
}
