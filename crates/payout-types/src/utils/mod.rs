//! Utility functions for common type conversions and transformations.
//!
//! This module provides helpers for decoding hex and addresses, EIP-712
//! hashing, string formatting and timestamps used throughout the signer.

pub mod conversion;
pub mod eip712;
pub mod formatting;
pub mod helpers;

pub use conversion::{decode_hex, parse_address, parse_nonzero_address, ParseError};
pub use eip712::{
	compute_domain_hash, compute_final_digest, permit_digest, permit_struct_hash,
	Eip712AbiEncoder, EIP712_DOMAIN_TYPE, PERMIT_TYPE,
};
pub use formatting::{truncate_id, with_0x_prefix, without_0x_prefix};
pub use helpers::current_timestamp;
