//! Account management module for the payout signer.
//!
//! Turns a recovered wallet seed into a secp256k1 signing key and signs
//! ERC-2612 permits with it. Signing keys are never persisted: a
//! [`KeyMaterial`] lives for one signing run and its scalar is zeroed when it
//! is dropped or explicitly discarded.

use thiserror::Error;

mod key;
mod signer;

pub use key::KeyMaterial;
pub use signer::{recover_signer, PermitSigner};

/// Errors that can occur during account operations.
///
/// Messages are safe to log; they never contain key material.
#[derive(Debug, Error)]
pub enum AccountError {
	/// The seed is not a valid secp256k1 private key.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// The message or signature is malformed, or the signer failed.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
}
