//! Permit signing service.
//!
//! [`PermitService`] owns the long-lived inputs of every signing run: the
//! recipient key pair, the sealed wallet seed, the token configuration and the
//! nonce and deadline collaborators. Each call to [`PermitService::sign`]
//! gathers the collaborator values asynchronously, then runs a fresh
//! [`SigningPipeline`] to completion without awaiting.

use crate::collaborators::{DeadlineSource, NonceSource};
use crate::pipeline::SigningPipeline;
use crate::PipelineError;
use alloy_primitives::{Address, U256};
use payout_account::KeyMaterial;
use payout_permit::DomainCache;
use payout_sealed_box::RecipientKeyPair;
use payout_types::utils::current_timestamp;
use payout_types::{truncate_id, EncryptedSecret, PermitRequest, Signature, TokenConfig};
use std::sync::Arc;

/// Signs payout permits for one token and one sealed wallet.
pub struct PermitService {
	recipient: RecipientKeyPair,
	sealed_seed: EncryptedSecret,
	token: TokenConfig,
	domains: DomainCache,
	nonces: Arc<dyn NonceSource>,
	deadlines: Arc<dyn DeadlineSource>,
	owner: Address,
}

impl PermitService {
	/// Builds the service, checking the configuration end to end.
	///
	/// The sealed seed is opened once so that a wrong recipient key or a
	/// corrupt secret is reported at startup, and the wallet address is
	/// recorded. The key itself is dropped immediately.
	pub fn new(
		recipient: RecipientKeyPair,
		sealed_seed: EncryptedSecret,
		token: TokenConfig,
		nonces: Arc<dyn NonceSource>,
		deadlines: Arc<dyn DeadlineSource>,
	) -> Result<Self, PipelineError> {
		let domains = DomainCache::new();
		domains.get_or_build(&token)?;

		let owner = {
			let seed = payout_sealed_box::open(&sealed_seed, &recipient)?;
			let key = KeyMaterial::from_seed(&seed)?;
			let owner = key.address();
			key.discard();
			owner
		};
		tracing::info!(
			owner = %owner,
			token = %token.token_address,
			chain_id = token.chain_id,
			"Permit signer ready"
		);

		Ok(Self {
			recipient,
			sealed_seed,
			token,
			domains,
			nonces,
			deadlines,
			owner,
		})
	}

	/// Address of the wallet whose permits this service signs.
	pub fn owner(&self) -> Address {
		self.owner
	}

	pub fn token(&self) -> &TokenConfig {
		&self.token
	}

	/// Signs a permit for `request`.
	///
	/// The request and deadline are checked before a nonce is reserved, and
	/// the nonce is released again if the signing run fails.
	pub async fn sign(&self, request: &PermitRequest) -> Result<Signature, PipelineError> {
		let builder = self.domains.get_or_build(&self.token)?;
		let deadline = self.deadlines.deadline().await?;
		if deadline <= U256::from(current_timestamp()) {
			return Err(PipelineError::ValidationError(
				"Permit deadline is not in the future".to_string(),
			));
		}
		builder.build(request, self.owner, U256::ZERO, deadline)?;

		let nonce = self.nonces.next_nonce(self.owner).await?;
		let mut pipeline = SigningPipeline::new(&self.recipient, &builder);
		match pipeline.run(&self.sealed_seed, request, nonce, deadline) {
			Ok(signature) => {
				tracing::info!(
					user_id = %truncate_id(&request.user_id),
					issue_id = %truncate_id(&request.issue_id),
					beneficiary = %request.beneficiary,
					nonce = %nonce,
					"Signed payout permit"
				);
				Ok(signature)
			},
			Err(err) => {
				tracing::warn!(
					user_id = %truncate_id(&request.user_id),
					issue_id = %truncate_id(&request.issue_id),
					state = %pipeline.state(),
					error = %err,
					"Permit signing failed"
				);
				if let Err(release_err) = self.nonces.release(self.owner, nonce).await {
					tracing::warn!(nonce = %nonce, error = %release_err, "Failed to release nonce");
				}
				Err(err)
			},
		}
	}
}

impl std::fmt::Debug for PermitService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PermitService")
			.field("owner", &self.owner)
			.field("token", &self.token)
			.finish_non_exhaustive()
	}
}
