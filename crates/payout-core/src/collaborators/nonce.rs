//! In-process nonce sources.

use super::{CollaboratorError, NonceSource};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Per-owner counter held in memory.
///
/// Each call reserves the current value and advances the counter, so
/// concurrent callers always receive distinct nonces. Counters start at the
/// value seeded with [`MemoryNonceSource::set_next`] (or zero) and are lost on
/// restart.
#[derive(Debug, Default, Clone)]
pub struct MemoryNonceSource {
	counters: Arc<RwLock<HashMap<Address, U256>>>,
}

impl MemoryNonceSource {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the next nonce handed out for `owner`, e.g. from an on-chain read.
	pub async fn set_next(&self, owner: Address, nonce: U256) {
		self.counters.write().await.insert(owner, nonce);
	}

	/// The nonce the next call for `owner` would return.
	pub async fn peek(&self, owner: Address) -> U256 {
		self.counters
			.read()
			.await
			.get(&owner)
			.copied()
			.unwrap_or(U256::ZERO)
	}
}

#[async_trait]
impl NonceSource for MemoryNonceSource {
	async fn next_nonce(&self, owner: Address) -> Result<U256, CollaboratorError> {
		let mut counters = self.counters.write().await;
		let slot = counters.entry(owner).or_insert(U256::ZERO);
		let nonce = *slot;
		*slot = nonce
			.checked_add(U256::from(1u8))
			.ok_or_else(|| CollaboratorError::NonceUnavailable("nonce space exhausted".to_string()))?;
		Ok(nonce)
	}

	/// Rewinds the counter when `nonce` is the latest reservation. If a later
	/// nonce was handed out in the meantime the counter is left alone.
	async fn release(&self, owner: Address, nonce: U256) -> Result<(), CollaboratorError> {
		let mut counters = self.counters.write().await;
		match counters.get_mut(&owner) {
			Some(slot) if nonce.checked_add(U256::from(1u8)) == Some(*slot) => {
				*slot = nonce;
				Ok(())
			},
			_ => {
				tracing::warn!(owner = %owner, nonce = %nonce, "Released nonce is not the latest reservation");
				Ok(())
			},
		}
	}
}

/// Always returns the same nonce. Useful when the caller already read it.
#[derive(Debug, Clone, Copy)]
pub struct FixedNonceSource(pub U256);

#[async_trait]
impl NonceSource for FixedNonceSource {
	async fn next_nonce(&self, _owner: Address) -> Result<U256, CollaboratorError> {
		Ok(self.0)
	}
}
