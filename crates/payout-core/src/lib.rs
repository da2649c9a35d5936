//! Core signing engine for the payout signer.
//!
//! This crate ties the sealed-box codec, key derivation, permit building and
//! signing into a single [`SigningPipeline`] run per request, and wraps it in a
//! [`PermitService`] that awaits the external nonce and deadline collaborators
//! before the synchronous pipeline starts.

use payout_account::AccountError;
use payout_permit::PermitError;
use payout_sealed_box::SealedBoxError;
use payout_types::APIError;
use thiserror::Error;

pub mod collaborators;
pub mod pipeline;
pub mod service;
pub mod state;

pub use collaborators::{
	CollaboratorError, DeadlineSource, FixedDeadline, FixedNonceSource, MemoryNonceSource,
	NonceSource, RelativeDeadline,
};
pub use pipeline::SigningPipeline;
pub use service::PermitService;
pub use state::{FailureKind, PipelineState};

/// Errors surfaced by a signing run.
///
/// Every message is safe to return to a caller: none carries key bytes,
/// shared secrets or derived nonces.
#[derive(Debug, Error)]
pub enum PipelineError {
	/// The sealed secret could not be opened with the recipient key.
	#[error("Decryption failure: {0}")]
	DecryptionFailure(String),
	/// The request cannot be turned into a valid permit.
	#[error("Validation error: {0}")]
	ValidationError(String),
	/// The permit could not be signed.
	#[error("Signing failure: {0}")]
	SigningFailure(String),
	/// Token metadata or collaborators are missing or unusable.
	#[error("Configuration error: {0}")]
	ConfigurationError(String),
	/// A pipeline was driven out of order.
	#[error("Invalid state transition from {from} to {to}")]
	InvalidTransition { from: PipelineState, to: PipelineState },
}

impl PipelineError {
	/// The failure state this error moves a pipeline into.
	pub fn kind(&self) -> FailureKind {
		match self {
			PipelineError::DecryptionFailure(_) => FailureKind::Decryption,
			PipelineError::ValidationError(_) => FailureKind::Validation,
			PipelineError::SigningFailure(_) | PipelineError::InvalidTransition { .. } => {
				FailureKind::Signing
			},
			PipelineError::ConfigurationError(_) => FailureKind::Configuration,
		}
	}
}

impl From<SealedBoxError> for PipelineError {
	fn from(err: SealedBoxError) -> Self {
		PipelineError::DecryptionFailure(err.to_string())
	}
}

impl From<AccountError> for PipelineError {
	fn from(err: AccountError) -> Self {
		PipelineError::SigningFailure(err.to_string())
	}
}

impl From<PermitError> for PipelineError {
	fn from(err: PermitError) -> Self {
		match err {
			PermitError::Configuration(msg) => PipelineError::ConfigurationError(msg),
			other => PipelineError::ValidationError(other.to_string()),
		}
	}
}

impl From<CollaboratorError> for PipelineError {
	fn from(err: CollaboratorError) -> Self {
		PipelineError::ConfigurationError(err.to_string())
	}
}

impl From<PipelineError> for APIError {
	fn from(err: PipelineError) -> Self {
		match err {
			PipelineError::ValidationError(message) => APIError::BadRequest {
				error_type: "VALIDATION_ERROR".to_string(),
				message,
			},
			PipelineError::ConfigurationError(_) => APIError::ServiceUnavailable {
				error_type: "CONFIGURATION_ERROR".to_string(),
				message: "Signer is not configured for this request".to_string(),
			},
			PipelineError::DecryptionFailure(_)
			| PipelineError::SigningFailure(_)
			| PipelineError::InvalidTransition { .. } => APIError::InternalServerError {
				error_type: "SIGNING_ERROR".to_string(),
				message: "Permit could not be signed".to_string(),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use payout_types::AmountError;

	#[test]
	fn test_permit_errors_map_to_taxonomy() {
		let config: PipelineError = PermitError::Configuration("no token".into()).into();
		assert_eq!(config.kind(), FailureKind::Configuration);

		let amount: PipelineError = PermitError::InvalidAmount(AmountError::Overflow).into();
		assert_eq!(amount.kind(), FailureKind::Validation);

		let sealed: PipelineError = SealedBoxError::Truncated.into();
		assert_eq!(sealed.kind(), FailureKind::Decryption);
	}

	#[test]
	fn test_api_error_hides_crypto_details() {
		let err = APIError::from(PipelineError::DecryptionFailure(
			"Sealed box authentication failed".into(),
		));
		assert_eq!(err.status_code(), 500);
		let body = err.to_error_response();
		assert!(!body.message.contains("Sealed box"));

		let validation = APIError::from(PipelineError::ValidationError("Amount must be greater than zero".into()));
		assert_eq!(validation.status_code(), 400);

		let config = APIError::from(PipelineError::ConfigurationError("nonce source down".into()));
		assert_eq!(config.status_code(), 503);
	}
}
