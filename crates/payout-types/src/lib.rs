//! Common types module for the payout signer.
//!
//! This module defines the core data types shared by the signer crates:
//! exact decimal amounts, permit requests and messages, token metadata,
//! sealed secrets, secret wrappers and the HTTP API bodies.

/// Exact fixed-point decimal amounts.
pub mod amount;
/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Permit requests, messages, signatures and sealed secrets.
pub mod permit;
/// Zeroizing, redacted containers for key material.
pub mod secret;
/// Utility functions for common type conversions.
pub mod utils;

pub use alloy_primitives::{hex, Address, B256, U256};
pub use amount::{AmountError, DecimalAmount};
pub use api::{APIError, ErrorResponse, RequestError, SignRequest, SignResponse};
pub use permit::{EncryptedSecret, PermitMessage, PermitRequest, Signature, TokenConfig};
pub use secret::{SecretBytes32, SecretString};
pub use utils::{truncate_id, with_0x_prefix, without_0x_prefix, ParseError};
