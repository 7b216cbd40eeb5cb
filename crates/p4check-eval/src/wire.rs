//! Canonical byte-string decoding for runtime integers.

use crate::value::Integer;
use num_bigint::{BigInt, Sign};
use num_traits::One;

/// Decode a canonical big-endian byte string into an integer.
///
/// Per the runtime byte-string rules: most significant byte first,
/// leading zero bytes tolerated, zero length decodes to 0, negative
/// values are not representable. Whether the value fits a declared
/// bitwidth is the binder's check, via [`fits_bitwidth`].
pub fn decode_wire_integer(bytes: &[u8]) -> Integer {
    BigInt::from_bytes_be(Sign::Plus, bytes)
}

/// Check that a non-negative value is representable in `bitwidth` bits.
pub fn fits_bitwidth(value: &Integer, bitwidth: u32) -> bool {
    value.bits() <= u64::from(bitwidth)
}

/// The all-ones mask of a `bitwidth`-bit key, `2^w - 1`.
pub fn all_ones(bitwidth: u32) -> Integer {
    (BigInt::one() << bitwidth) - 1
}
