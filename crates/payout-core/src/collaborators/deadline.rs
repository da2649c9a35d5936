//! Deadline sources.

use super::{CollaboratorError, DeadlineSource};
use alloy_primitives::U256;
use async_trait::async_trait;
use payout_types::utils::current_timestamp;
use std::time::Duration;

/// Deadline a fixed validity window after the current time.
#[derive(Debug, Clone, Copy)]
pub struct RelativeDeadline {
	pub validity: Duration,
}

impl RelativeDeadline {
	pub fn new(validity: Duration) -> Self {
		Self { validity }
	}
}

#[async_trait]
impl DeadlineSource for RelativeDeadline {
	async fn deadline(&self) -> Result<U256, CollaboratorError> {
		let now = current_timestamp();
		if now == 0 {
			return Err(CollaboratorError::DeadlineUnavailable(
				"system clock is before the UNIX epoch".to_string(),
			));
		}
		Ok(U256::from(now.saturating_add(self.validity.as_secs())))
	}
}

/// A constant deadline.
#[derive(Debug, Clone, Copy)]
pub struct FixedDeadline(pub U256);

#[async_trait]
impl DeadlineSource for FixedDeadline {
	async fn deadline(&self) -> Result<U256, CollaboratorError> {
		Ok(self.0)
	}
}
