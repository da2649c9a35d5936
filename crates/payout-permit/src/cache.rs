//! Per-token cache of permit builders.

use crate::{PermitError, PermitMessageBuilder};
use dashmap::DashMap;
use payout_types::TokenConfig;
use std::sync::Arc;

/// Shares one [`PermitMessageBuilder`] (and its domain separator) per token
/// configuration across concurrent requests.
#[derive(Debug, Default)]
pub struct DomainCache {
	builders: DashMap<TokenConfig, Arc<PermitMessageBuilder>>,
}

impl DomainCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the cached builder for `token`, building it on first use.
	pub fn get_or_build(&self, token: &TokenConfig) -> Result<Arc<PermitMessageBuilder>, PermitError> {
		if let Some(builder) = self.builders.get(token) {
			return Ok(Arc::clone(builder.value()));
		}
		let builder = Arc::new(PermitMessageBuilder::new(token.clone())?);
		let entry = self
			.builders
			.entry(token.clone())
			.or_insert_with(|| Arc::clone(&builder));
		Ok(Arc::clone(entry.value()))
	}

	pub fn len(&self) -> usize {
		self.builders.len()
	}

	pub fn is_empty(&self) -> bool {
		self.builders.is_empty()
	}
}
