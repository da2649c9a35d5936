//! EIP-712 utilities for ERC-2612 permits.
//!
//! A permit is signed over `keccak256(0x1901 || domainSeparator || structHash)`.
//! Every field the permit and its domain use is a static 32-byte word once
//! strings are replaced by their hashes, so [`Eip712AbiEncoder`] only has to
//! concatenate words.

use crate::PermitMessage;
use alloy_primitives::{keccak256, Address, B256, U256};

pub const EIP712_DOMAIN_TYPE: &str =
	"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";
pub const PERMIT_TYPE: &str =
	"Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)";

/// The token's EIP-712 domain separator.
pub fn compute_domain_hash(
	name: &str,
	version: &str,
	chain_id: u64,
	verifying_contract: &Address,
) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&keccak256(EIP712_DOMAIN_TYPE.as_bytes()));
	enc.push_string_hash(name);
	enc.push_string_hash(version);
	enc.push_u256(U256::from(chain_id));
	enc.push_address(verifying_contract);
	keccak256(enc.finish())
}

/// Hash of the `Permit` struct per the typed-data encoding rules.
pub fn permit_struct_hash(message: &PermitMessage) -> B256 {
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&keccak256(PERMIT_TYPE.as_bytes()));
	enc.push_address(&message.owner);
	enc.push_address(&message.spender);
	enc.push_u256(message.value);
	enc.push_u256(message.nonce);
	enc.push_u256(message.deadline);
	keccak256(enc.finish())
}

/// Prefixes the domain and struct hashes with `0x1901` and hashes the result.
pub fn compute_final_digest(domain_hash: &B256, struct_hash: &B256) -> B256 {
	let mut preimage = [0u8; 66];
	preimage[..2].copy_from_slice(&[0x19, 0x01]);
	preimage[2..34].copy_from_slice(domain_hash.as_slice());
	preimage[34..].copy_from_slice(struct_hash.as_slice());
	keccak256(preimage)
}

/// Digest a permit signer signs for the given domain.
pub fn permit_digest(domain_separator: &B256, message: &PermitMessage) -> B256 {
	compute_final_digest(domain_separator, &permit_struct_hash(message))
}

/// Concatenates left-padded 32-byte ABI words.
pub struct Eip712AbiEncoder {
	buf: Vec<u8>,
}

impl Default for Eip712AbiEncoder {
	fn default() -> Self {
		Self::new()
	}
}

impl Eip712AbiEncoder {
	pub fn new() -> Self {
		Self { buf: Vec::new() }
	}

	pub fn push_b256(&mut self, v: &B256) {
		self.buf.extend_from_slice(v.as_slice());
	}

	pub fn push_address(&mut self, addr: &Address) {
		let mut word = [0u8; 32];
		word[12..].copy_from_slice(addr.as_slice());
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u256(&mut self, v: U256) {
		let word: [u8; 32] = v.to_be_bytes::<32>();
		self.buf.extend_from_slice(&word);
	}

	/// Dynamic `string` members are encoded as the keccak256 of their bytes.
	pub fn push_string_hash(&mut self, s: &str) {
		self.push_b256(&keccak256(s.as_bytes()));
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{address, b256};

	#[test]
	fn test_type_hashes_match_published_constants() {
		assert_eq!(
			keccak256(EIP712_DOMAIN_TYPE.as_bytes()),
			b256!("8b73c3c69bb8fe3d512ecc4cf759cc79239f7b179b0ffacaa9a75d522b39400f")
		);
		assert_eq!(
			keccak256(PERMIT_TYPE.as_bytes()),
			b256!("6e71edae12b1b97f4d1f60370fef10105fa2faae0126114a169c64845d6126c9")
		);
	}

	#[test]
	fn test_domain_hash_binds_every_field() {
		let token = address!("e91D153E0b41518A2Ce8Dd3D7944Fa863463a97d");
		let base = compute_domain_hash("Token", "1", 100, &token);
		assert_ne!(base, compute_domain_hash("Token2", "1", 100, &token));
		assert_ne!(base, compute_domain_hash("Token", "2", 100, &token));
		assert_ne!(base, compute_domain_hash("Token", "1", 1, &token));
		assert_ne!(base, compute_domain_hash("Token", "1", 100, &Address::ZERO));
		assert_eq!(base, compute_domain_hash("Token", "1", 100, &token));
	}

	#[test]
	fn test_encoder_word_layout() {
		let mut enc = Eip712AbiEncoder::new();
		enc.push_address(&address!("00000000000000000000000000000000000000ff"));
		enc.push_u256(U256::from(1u8));
		let buf = enc.finish();
		assert_eq!(buf.len(), 64);
		assert_eq!(buf[31], 0xff);
		assert!(buf[..31].iter().all(|b| *b == 0));
		assert_eq!(buf[63], 1);
	}
}
