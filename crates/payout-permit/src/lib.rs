//! Permit message construction for the payout signer.
//!
//! A [`PermitMessageBuilder`] is bound to one [`TokenConfig`]. It validates
//! payout requests against the token's decimals, converts amounts into
//! smallest units with exact integer arithmetic and holds the token's EIP-712
//! domain separator, which is computed once per token.

use alloy_primitives::{Address, B256, U256};
use payout_types::utils::{compute_domain_hash, permit_digest, permit_struct_hash};
use payout_types::{AmountError, PermitMessage, PermitRequest, TokenConfig};
use thiserror::Error;

mod cache;

pub use cache::DomainCache;

/// Errors that can occur while building a permit message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermitError {
	/// The token configuration cannot produce a usable domain.
	#[error("Configuration error: {0}")]
	Configuration(String),
	#[error("Invalid beneficiary: {0}")]
	InvalidBeneficiary(String),
	#[error("Amount must be greater than zero")]
	ZeroAmount,
	#[error("Invalid amount: {0}")]
	InvalidAmount(#[from] AmountError),
	#[error("Permit owner must not be the zero address")]
	InvalidOwner,
	#[error("Permit deadline must be set")]
	InvalidDeadline,
}

/// Builds ERC-2612 permit messages for a single token.
#[derive(Debug, Clone)]
pub struct PermitMessageBuilder {
	token: TokenConfig,
	domain_separator: B256,
}

impl PermitMessageBuilder {
	/// Validates `token` and computes its domain separator.
	pub fn new(token: TokenConfig) -> Result<Self, PermitError> {
		if token.token_address.is_zero() {
			return Err(PermitError::Configuration(
				"token_address must not be the zero address".to_string(),
			));
		}
		if token.chain_id == 0 {
			return Err(PermitError::Configuration("unsupported chain id 0".to_string()));
		}
		if token.permit_contract_name.is_empty() {
			return Err(PermitError::Configuration(
				"permit_contract_name cannot be empty".to_string(),
			));
		}
		if token.permit_contract_version.is_empty() {
			return Err(PermitError::Configuration(
				"permit_contract_version cannot be empty".to_string(),
			));
		}

		let domain_separator = compute_domain_hash(
			&token.permit_contract_name,
			&token.permit_contract_version,
			token.chain_id,
			&token.token_address,
		);
		tracing::debug!(
			chain_id = token.chain_id,
			token = %token.token_address,
			domain_separator = %domain_separator,
			"Computed permit domain"
		);
		Ok(Self {
			token,
			domain_separator,
		})
	}

	pub fn token(&self) -> &TokenConfig {
		&self.token
	}

	/// The token's EIP-712 domain separator.
	pub fn domain_separator(&self) -> B256 {
		self.domain_separator
	}

	/// Builds the permit authorising `request.beneficiary` to pull
	/// `request.amount` from `owner`.
	pub fn build(
		&self,
		request: &PermitRequest,
		owner: Address,
		current_nonce: U256,
		deadline: U256,
	) -> Result<PermitMessage, PermitError> {
		if request.beneficiary.is_zero() {
			return Err(PermitError::InvalidBeneficiary(
				"beneficiary must not be the zero address".to_string(),
			));
		}
		if request.amount.is_negative() {
			return Err(PermitError::InvalidAmount(AmountError::Negative));
		}
		if request.amount.is_zero() {
			return Err(PermitError::ZeroAmount);
		}
		if owner.is_zero() {
			return Err(PermitError::InvalidOwner);
		}
		if deadline.is_zero() {
			return Err(PermitError::InvalidDeadline);
		}

		let value = request.amount.to_smallest_units(self.token.decimals)?;

		Ok(PermitMessage {
			owner,
			spender: request.beneficiary,
			value,
			nonce: current_nonce,
			deadline,
		})
	}

	/// The `Permit` struct hash of `message`.
	pub fn struct_hash(&self, message: &PermitMessage) -> B256 {
		permit_struct_hash(message)
	}

	/// The digest a wallet signs for `message` under this token's domain.
	pub fn digest(&self, message: &PermitMessage) -> B256 {
		permit_digest(&self.domain_separator, message)
	}
}
