//! External collaborators consulted before a signing run.
//!
//! The pipeline itself never fetches nonces or computes deadlines. Callers
//! obtain them through these traits, which may await I/O or retry; the
//! implementations here cover in-process use and tests.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use thiserror::Error;

mod deadline;
mod nonce;

pub use deadline::{FixedDeadline, RelativeDeadline};
pub use nonce::{FixedNonceSource, MemoryNonceSource};

/// Errors returned by nonce and deadline collaborators.
#[derive(Debug, Error)]
pub enum CollaboratorError {
	#[error("Nonce unavailable: {0}")]
	NonceUnavailable(String),
	#[error("Deadline unavailable: {0}")]
	DeadlineUnavailable(String),
}

/// Supplies the permit nonce for an owner.
///
/// Implementations must hand out each nonce at most once per owner so that
/// two concurrent permits never share one.
#[async_trait]
pub trait NonceSource: Send + Sync {
	/// Reserves the next nonce for `owner`.
	async fn next_nonce(&self, owner: Address) -> Result<U256, CollaboratorError>;

	/// Returns a reserved nonce whose permit was never signed.
	///
	/// On-chain nonces are consumed in order, so a nonce that is skipped
	/// makes every later permit unclaimable.
	async fn release(&self, _owner: Address, _nonce: U256) -> Result<(), CollaboratorError> {
		Ok(())
	}
}

/// Supplies the UNIX timestamp after which a new permit expires.
#[async_trait]
pub trait DeadlineSource: Send + Sync {
	async fn deadline(&self) -> Result<U256, CollaboratorError>;
}
