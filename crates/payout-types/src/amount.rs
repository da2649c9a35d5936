//! Exact base-10 fixed-point amounts.
//!
//! `DecimalAmount` carries a sign, an unscaled 256-bit integer and a scale
//! (the number of digits after the decimal point). Amounts are parsed from
//! their decimal text form and converted to a token's smallest units with
//! integer arithmetic only, so a value either converts exactly or is rejected.

use alloy_primitives::U256;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest exponent magnitude accepted in scientific notation.
const MAX_EXPONENT: i64 = 1024;

/// Errors that can occur while parsing or converting an amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
	/// The input is not a decimal number.
	#[error("Malformed amount: {0}")]
	Malformed(String),
	/// The amount is below zero where only non-negative values are allowed.
	#[error("Amount must not be negative")]
	Negative,
	/// The amount has more fractional digits than the token supports.
	#[error("Amount has {scale} decimal places but the token supports only {decimals}")]
	PrecisionLoss { scale: u32, decimals: u8 },
	/// The amount does not fit in an unsigned 256-bit integer.
	#[error("Amount exceeds the 256-bit integer range")]
	Overflow,
}

/// An exact decimal value: `(-1)^negative * unscaled * 10^-scale`.
///
/// Values are kept normalised: the fractional part has no trailing zeros and
/// zero is always non-negative with scale 0. Equality is therefore numeric
/// equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecimalAmount {
	negative: bool,
	unscaled: U256,
	scale: u32,
}

impl DecimalAmount {
	/// The value zero.
	pub const ZERO: Self = Self {
		negative: false,
		unscaled: U256::ZERO,
		scale: 0,
	};

	/// Creates a normalised amount from its parts.
	pub fn new(negative: bool, unscaled: U256, scale: u32) -> Self {
		let ten = U256::from(10u8);
		let mut unscaled = unscaled;
		let mut scale = scale;
		while scale > 0 && !unscaled.is_zero() && (unscaled % ten).is_zero() {
			unscaled /= ten;
			scale -= 1;
		}
		if unscaled.is_zero() {
			return Self::ZERO;
		}
		Self {
			negative,
			unscaled,
			scale,
		}
	}

	/// Reconstructs an amount from an integer count of smallest units.
	pub fn from_smallest_units(units: U256, decimals: u8) -> Self {
		Self::new(false, units, u32::from(decimals))
	}

	/// Converts the amount into smallest units for a token with `decimals`
	/// decimal places.
	///
	/// Computes `unscaled * 10^(decimals - scale)`. Negative values, values
	/// needing more than `decimals` fractional digits and results above
	/// `U256::MAX` are rejected rather than rounded or truncated.
	pub fn to_smallest_units(&self, decimals: u8) -> Result<U256, AmountError> {
		if self.negative {
			return Err(AmountError::Negative);
		}
		let decimals_u32 = u32::from(decimals);
		if self.scale > decimals_u32 {
			return Err(AmountError::PrecisionLoss {
				scale: self.scale,
				decimals,
			});
		}
		let factor = pow10(decimals_u32 - self.scale).ok_or(AmountError::Overflow)?;
		self.unscaled
			.checked_mul(factor)
			.ok_or(AmountError::Overflow)
	}

	pub fn is_zero(&self) -> bool {
		self.unscaled.is_zero()
	}

	pub fn is_negative(&self) -> bool {
		self.negative
	}

	/// The unscaled integer magnitude.
	pub fn unscaled(&self) -> U256 {
		self.unscaled
	}

	/// Number of digits after the decimal point.
	pub fn scale(&self) -> u32 {
		self.scale
	}
}

impl Default for DecimalAmount {
	fn default() -> Self {
		Self::ZERO
	}
}

impl From<u64> for DecimalAmount {
	fn from(value: u64) -> Self {
		Self::new(false, U256::from(value), 0)
	}
}

fn pow10(exp: u32) -> Option<U256> {
	let ten = U256::from(10u8);
	(0..exp).try_fold(U256::from(1u8), |acc, _| acc.checked_mul(ten))
}

fn push_digits(acc: U256, digits: &str) -> Result<U256, AmountError> {
	let ten = U256::from(10u8);
	digits.bytes().try_fold(acc, |acc, b| {
		acc.checked_mul(ten)
			.and_then(|v| v.checked_add(U256::from(b - b'0')))
			.ok_or(AmountError::Overflow)
	})
}

impl FromStr for DecimalAmount {
	type Err = AmountError;

	/// Parses plain (`"12.50"`) and scientific (`"1.25e1"`) decimal notation.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let input = s.trim();
		let malformed = |reason: &str| AmountError::Malformed(reason.to_string());

		let (negative, body) = match input.as_bytes().first() {
			Some(b'-') => (true, &input[1..]),
			Some(b'+') => (false, &input[1..]),
			Some(_) => (false, input),
			None => return Err(malformed("empty input")),
		};

		let (mantissa, exponent) = match body.find(['e', 'E']) {
			Some(pos) => {
				let exp_str = &body[pos + 1..];
				let exp_digits = exp_str
					.strip_prefix('-')
					.or_else(|| exp_str.strip_prefix('+'))
					.unwrap_or(exp_str);
				if exp_digits.is_empty() || !exp_digits.bytes().all(|b| b.is_ascii_digit()) {
					return Err(malformed("invalid exponent"));
				}
				let exp: i64 = exp_str
					.parse()
					.map_err(|_| malformed("exponent out of range"))?;
				if exp.abs() > MAX_EXPONENT {
					return Err(malformed("exponent out of range"));
				}
				(&body[..pos], exp)
			},
			None => (body, 0),
		};

		let (int_part, frac_part) = match mantissa.split_once('.') {
			Some((i, f)) => (i, f),
			None => (mantissa, ""),
		};
		if int_part.is_empty() && frac_part.is_empty() {
			return Err(malformed("no digits"));
		}
		if !int_part.bytes().all(|b| b.is_ascii_digit())
			|| !frac_part.bytes().all(|b| b.is_ascii_digit())
		{
			return Err(malformed("unexpected character"));
		}

		// Zeros that the scale would divide out again are dropped before
		// accumulating, so a large but representable value cannot overflow.
		let frac_part = frac_part.trim_end_matches('0');
		let mut scale = frac_part.len() as i64 - exponent;
		let mut digits = format!("{}{}", int_part.trim_start_matches('0'), frac_part);
		while scale > 0 && digits.ends_with('0') {
			digits.pop();
			scale -= 1;
		}
		let unscaled = push_digits(U256::ZERO, digits.trim_start_matches('0'))?;

		if unscaled.is_zero() {
			return Ok(Self::ZERO);
		}
		if scale >= 0 {
			let scale = u32::try_from(scale).map_err(|_| malformed("scale out of range"))?;
			Ok(Self::new(negative, unscaled, scale))
		} else {
			let shift = u32::try_from(-scale).map_err(|_| AmountError::Overflow)?;
			let factor = pow10(shift).ok_or(AmountError::Overflow)?;
			let unscaled = unscaled.checked_mul(factor).ok_or(AmountError::Overflow)?;
			Ok(Self::new(negative, unscaled, 0))
		}
	}
}

impl fmt::Display for DecimalAmount {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let sign = if self.negative { "-" } else { "" };
		let digits = self.unscaled.to_string();
		let scale = self.scale as usize;
		if scale == 0 {
			return write!(f, "{}{}", sign, digits);
		}
		let padded = format!("{:0>width$}", digits, width = scale + 1);
		let (int_part, frac_part) = padded.split_at(padded.len() - scale);
		write!(f, "{}{}.{}", sign, int_part, frac_part)
	}
}

impl Serialize for DecimalAmount {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for DecimalAmount {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		struct AmountVisitor;

		impl de::Visitor<'_> for AmountVisitor {
			type Value = DecimalAmount;

			fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str("a decimal amount as a string or integer")
			}

			fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
				v.parse().map_err(E::custom)
			}

			fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
				Ok(DecimalAmount::from(v))
			}

			fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
				Ok(DecimalAmount::new(
					v < 0,
					U256::from(v.unsigned_abs()),
					0,
				))
			}

			// Binary floats never enter the amount path.
			fn visit_f64<E: de::Error>(self, _v: f64) -> Result<Self::Value, E> {
				Err(E::custom("fractional amounts must be given as strings"))
			}
		}

		deserializer.deserialize_any(AmountVisitor)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn amount(s: &str) -> DecimalAmount {
		s.parse().unwrap()
	}

	#[test]
	fn test_parse_plain_and_scientific() {
		assert_eq!(amount("1000"), DecimalAmount::from(1000));
		assert_eq!(amount("1.5e3"), DecimalAmount::from(1500));
		assert_eq!(amount("25E-2"), amount("0.25"));
		assert_eq!(amount("+3"), DecimalAmount::from(3));
		assert_eq!(amount(".5").scale(), 1);
		assert_eq!(amount("5.").scale(), 0);
		assert!(amount("-3").is_negative());
	}

	#[test]
	fn test_normalises_trailing_zeros() {
		let a = amount("1.500000");
		assert_eq!(a.unscaled(), U256::from(15));
		assert_eq!(a.scale(), 1);
		assert_eq!(amount("000.000"), DecimalAmount::ZERO);
		assert!(!amount("-0.0").is_negative());
	}

	#[test]
	fn test_rejects_malformed_input() {
		for bad in ["", "-", "abc", "1.2.3", "1e", "1e+", "0x10", "1_000", "1,5", "NaN"] {
			assert!(
				matches!(bad.parse::<DecimalAmount>(), Err(AmountError::Malformed(_))),
				"accepted {:?}",
				bad
			);
		}
		assert!(matches!(
			"1e5000".parse::<DecimalAmount>(),
			Err(AmountError::Malformed(_))
		));
	}

	#[test]
	fn test_to_smallest_units() {
		assert_eq!(
			amount("1000").to_smallest_units(18).unwrap(),
			U256::from(1000u64) * U256::from(10u64).pow(U256::from(18u64))
		);
		assert_eq!(amount("1.5").to_smallest_units(6).unwrap(), U256::from(1_500_000u64));
		assert_eq!(amount("0.000001").to_smallest_units(6).unwrap(), U256::from(1u64));
		assert_eq!(amount("42").to_smallest_units(0).unwrap(), U256::from(42u64));
	}

	#[test]
	fn test_rejects_precision_loss() {
		let err = amount("0.0000001").to_smallest_units(6).unwrap_err();
		assert_eq!(err, AmountError::PrecisionLoss { scale: 7, decimals: 6 });
		assert!(amount("1.5").to_smallest_units(0).is_err());
	}

	#[test]
	fn test_rejects_negative_and_overflow() {
		assert_eq!(amount("-1").to_smallest_units(18), Err(AmountError::Negative));
		// 2^256 is 78 digits long; 10^60 * 10^18 overflows.
		assert_eq!(amount("1e60").to_smallest_units(18), Err(AmountError::Overflow));
		let max = U256::MAX.to_string();
		assert_eq!(amount(&max).to_smallest_units(0), Ok(U256::MAX));
		assert_eq!(amount(&max).to_smallest_units(1), Err(AmountError::Overflow));
		assert_eq!(
			format!("{}0", max).parse::<DecimalAmount>(),
			Err(AmountError::Overflow)
		);
	}

	#[test]
	fn test_negative_exponent_cancels_trailing_zeros() {
		let long = format!("1{}e-70", "0".repeat(80));
		assert_eq!(amount(&long), DecimalAmount::from(10_000_000_000u64));
		let fractional = format!("25{}.0e-81", "0".repeat(79));
		assert_eq!(amount(&fractional).to_string(), "0.25");
	}

	#[test]
	fn test_display() {
		assert_eq!(amount("1000").to_string(), "1000");
		assert_eq!(amount("0.05").to_string(), "0.05");
		assert_eq!(amount("-12.340").to_string(), "-12.34");
		assert_eq!(amount("1.5e-3").to_string(), "0.0015");
		assert_eq!(DecimalAmount::ZERO.to_string(), "0");
	}

	#[test]
	fn test_serde_accepts_strings_and_integers() {
		let a: DecimalAmount = serde_json::from_str("\"12.5\"").unwrap();
		assert_eq!(a, amount("12.5"));
		let b: DecimalAmount = serde_json::from_str("1000").unwrap();
		assert_eq!(b, DecimalAmount::from(1000));
		assert!(serde_json::from_str::<DecimalAmount>("12.5").is_err());
		assert_eq!(serde_json::to_string(&a).unwrap(), "\"12.5\"");
	}

	proptest! {
		#[test]
		fn prop_smallest_units_round_trip(units in any::<u128>(), decimals in 0u8..=36) {
			let a = DecimalAmount::from_smallest_units(U256::from(units), decimals);
			let back = a.to_smallest_units(decimals).unwrap();
			prop_assert_eq!(back, U256::from(units));
			prop_assert_eq!(DecimalAmount::from_smallest_units(back, decimals), a);
		}

		#[test]
		fn prop_parse_display_round_trip(int in any::<u64>(), frac in 0u32..1_000_000, places in 0usize..=6) {
			let text = if places == 0 {
				int.to_string()
			} else {
				format!("{}.{:0>width$}", int, frac % 10u32.pow(places as u32), width = places)
			};
			let a: DecimalAmount = text.parse().unwrap();
			let units = a.to_smallest_units(6).unwrap();
			prop_assert_eq!(DecimalAmount::from_smallest_units(units, 6), a);
			prop_assert_eq!(a.to_string().parse::<DecimalAmount>().unwrap(), a);
		}

		#[test]
		fn prop_excess_precision_rejected(unscaled in 1u64.., extra in 1u32..10, decimals in 0u8..18) {
			// Ensure the last digit is non-zero so the scale cannot normalise away.
			let unscaled = unscaled - unscaled % 10 + 1;
			let a = DecimalAmount::new(false, U256::from(unscaled), u32::from(decimals) + extra);
			let rejected = matches!(a.to_smallest_units(decimals), Err(AmountError::PrecisionLoss { .. }));
			prop_assert!(rejected);
		}
	}
}
