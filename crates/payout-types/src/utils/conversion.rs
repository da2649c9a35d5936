//! Conversion utilities for addresses and hex-encoded byte strings.

use super::formatting::without_0x_prefix;
use alloy_primitives::{hex, Address};
use thiserror::Error;

/// Errors produced while decoding externally supplied values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
	#[error("Invalid hex encoding")]
	InvalidHex,
	#[error("Invalid length: expected {expected} bytes, got {actual}")]
	InvalidLength { expected: usize, actual: usize },
	#[error("Invalid address: {0}")]
	InvalidAddress(String),
	#[error("Address must not be the zero address")]
	ZeroAddress,
}

/// Parses a 20-byte hex address, with or without `0x`.
///
/// Mixed-case input is accepted without enforcing the EIP-55 checksum, the
/// same as the addresses the payout requests carry.
pub fn parse_address(s: &str) -> Result<Address, ParseError> {
	let trimmed = without_0x_prefix(s.trim());
	if trimmed.len() != 40 {
		return Err(ParseError::InvalidAddress(format!(
			"expected 40 hex characters, got {}",
			trimmed.len()
		)));
	}
	let bytes = hex::decode(trimmed)
		.map_err(|_| ParseError::InvalidAddress("not a hex string".to_string()))?;
	Ok(Address::from_slice(&bytes))
}

/// Like [`parse_address`] but also rejects the zero address.
pub fn parse_nonzero_address(s: &str) -> Result<Address, ParseError> {
	let address = parse_address(s)?;
	if address.is_zero() {
		return Err(ParseError::ZeroAddress);
	}
	Ok(address)
}

/// Decodes a hex string of any length, with or without `0x`.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, ParseError> {
	hex::decode(without_0x_prefix(s.trim())).map_err(|_| ParseError::InvalidHex)
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	#[test]
	fn test_parse_address() {
		let expected = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
		assert_eq!(
			parse_address("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap(),
			expected
		);
		assert_eq!(
			parse_address("f39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap(),
			expected
		);
	}

	#[test]
	fn test_parse_address_rejects_malformed() {
		// 39 hex characters
		assert!(matches!(
			parse_address("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb9226"),
			Err(ParseError::InvalidAddress(_))
		));
		assert!(parse_address("0xg39Fd6e51aad88F6F4ce6aB8827279cffFb92266").is_err());
		assert!(parse_address("").is_err());
	}

	#[test]
	fn test_parse_nonzero_address() {
		assert_eq!(
			parse_nonzero_address("0x0000000000000000000000000000000000000000"),
			Err(ParseError::ZeroAddress)
		);
	}
}
