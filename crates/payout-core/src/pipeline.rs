//! One signing run: open the sealed seed, derive the key, build and sign the
//! permit, then discard the key.

use crate::state::PipelineState;
use crate::PipelineError;
use alloy_primitives::U256;
use payout_account::{KeyMaterial, PermitSigner};
use payout_permit::PermitMessageBuilder;
use payout_sealed_box::RecipientKeyPair;
use payout_types::{EncryptedSecret, PermitRequest, Signature};

/// Drives a single request through the signing states.
///
/// A pipeline is used once. Whatever the outcome, the derived [`KeyMaterial`]
/// is dropped before [`SigningPipeline::run`] returns, and the decrypted seed
/// never outlives the key derivation step.
pub struct SigningPipeline<'a> {
	recipient: &'a RecipientKeyPair,
	builder: &'a PermitMessageBuilder,
	state: PipelineState,
	history: Vec<PipelineState>,
	key: Option<KeyMaterial>,
}

impl<'a> SigningPipeline<'a> {
	pub fn new(recipient: &'a RecipientKeyPair, builder: &'a PermitMessageBuilder) -> Self {
		Self {
			recipient,
			builder,
			state: PipelineState::Received,
			history: vec![PipelineState::Received],
			key: None,
		}
	}

	pub fn state(&self) -> PipelineState {
		self.state
	}

	/// Every state the pipeline has been in, oldest first.
	pub fn history(&self) -> &[PipelineState] {
		&self.history
	}

	/// Whether key material is currently held.
	pub fn holds_key(&self) -> bool {
		self.key.is_some()
	}

	/// Signs a permit for `request` using the wallet seed sealed in `sealed`.
	///
	/// `nonce` and `deadline` come from the caller's collaborators and are
	/// signed as given.
	pub fn run(
		&mut self,
		sealed: &EncryptedSecret,
		request: &PermitRequest,
		nonce: U256,
		deadline: U256,
	) -> Result<Signature, PipelineError> {
		if self.state != PipelineState::Received {
			return Err(PipelineError::InvalidTransition {
				from: self.state,
				to: PipelineState::Decrypted,
			});
		}

		let result = self.execute(sealed, request, nonce, deadline);

		if let Some(key) = self.key.take() {
			key.discard();
		}

		match result {
			Ok(signature) => {
				self.transition(PipelineState::Complete)?;
				Ok(signature)
			},
			Err(err) => {
				self.fail(&err);
				Err(err)
			},
		}
	}

	fn execute(
		&mut self,
		sealed: &EncryptedSecret,
		request: &PermitRequest,
		nonce: U256,
		deadline: U256,
	) -> Result<Signature, PipelineError> {
		let key = {
			let seed = payout_sealed_box::open(sealed, self.recipient)?;
			self.transition(PipelineState::Decrypted)?;
			KeyMaterial::from_seed(&seed)?
		};
		let owner = key.address();
		self.key = Some(key);
		self.transition(PipelineState::KeyDerived)?;

		let message = self.builder.build(request, owner, nonce, deadline)?;
		self.transition(PipelineState::MessageBuilt)?;

		let key = self.key.as_ref().ok_or_else(|| {
			PipelineError::SigningFailure("key material missing".to_string())
		})?;
		let signature = PermitSigner::sign(&message, &self.builder.domain_separator(), key)?;
		self.transition(PipelineState::Signed)?;

		Ok(signature)
	}

	fn transition(&mut self, next: PipelineState) -> Result<(), PipelineError> {
		if !self.state.can_transition_to(&next) {
			return Err(PipelineError::InvalidTransition {
				from: self.state,
				to: next,
			});
		}
		tracing::debug!(from = %self.state, to = %next, "Pipeline transition");
		self.state = next;
		self.history.push(next);
		Ok(())
	}

	fn fail(&mut self, err: &PipelineError) {
		let failed = PipelineState::Failed(err.kind());
		if self.state.can_transition_to(&failed) {
			tracing::debug!(from = %self.state, to = %failed, "Pipeline transition");
			self.state = failed;
			self.history.push(failed);
		}
	}
}

impl Drop for SigningPipeline<'_> {
	fn drop(&mut self) {
		if let Some(key) = self.key.take() {
			key.discard();
		}
	}
}
