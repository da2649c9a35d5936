//! Signing pipeline state machine.
//!
//! A run moves through Received -> Decrypted -> KeyDerived -> MessageBuilt ->
//! Signed -> Complete, and can fail from any non-terminal state.

use std::fmt;

/// Why a pipeline run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
	Decryption,
	Validation,
	Signing,
	Configuration,
}

/// Lifecycle state of a [`crate::SigningPipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
	Received,
	Decrypted,
	KeyDerived,
	MessageBuilt,
	Signed,
	Complete,
	Failed(FailureKind),
}

impl PipelineState {
	/// Checks if a state transition is valid.
	pub fn can_transition_to(&self, next: &PipelineState) -> bool {
		use PipelineState::*;

		match (self, next) {
			(Complete, _) | (Failed(_), _) => false,
			(_, Failed(_)) => true,
			(Received, Decrypted)
			| (Decrypted, KeyDerived)
			| (KeyDerived, MessageBuilt)
			| (MessageBuilt, Signed)
			| (Signed, Complete) => true,
			_ => false,
		}
	}

	pub fn is_terminal(&self) -> bool {
		matches!(self, PipelineState::Complete | PipelineState::Failed(_))
	}
}

impl fmt::Display for PipelineState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PipelineState::Failed(kind) => write!(f, "Failed({:?})", kind),
			other => write!(f, "{:?}", other),
		}
	}
}
