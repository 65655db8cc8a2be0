//! Canonical 32-byte word encoding of the primitive solidity types, and the strict parsers
//! used at the boundaries to turn textual input into typed values.

use primitive_types::U256;

use crate::{keccak_256, AddressError, EthBytes, EthString, EthereumAddress};

/// The size of a single encoded slot.
pub const WORD_SIZE: usize = 32;

/// An encoding failure of a single primitive value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    /// The value can not be interpreted as a 20-byte address.
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),
    /// The integer is negative or does not fit into 256 bits.
    #[error("integer out of range for uint256: {0}")]
    IntegerOutOfRange(String),
    /// The integer literal is malformed.
    #[error("invalid integer literal: {0:?}")]
    InvalidInteger(String),
    /// A fixed-size byte value has a wrong length.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// The required length.
        expected: usize,
        /// The length that was provided.
        actual: usize,
    },
    /// The kind of the value does not fit the declared type.
    #[error("expected a value of type {expected}, got {found}")]
    ValueMismatch {
        /// The declared type.
        expected: String,
        /// The kind of the provided value.
        found: &'static str,
    },
}

/// Encode an address as a left-zero-padded word.
pub fn address_word(address: &EthereumAddress) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

/// Encode an unsigned integer as a big-endian word.
pub fn uint_word(value: &U256) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    value.to_big_endian(&mut word);
    word
}

/// Encode a boolean as the `uint256` `0` or `1`.
pub fn bool_word(value: bool) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - 1] = u8::from(value);
    word
}

/// Use a fixed 32-byte value verbatim, checking its length.
pub fn fixed_bytes_word(value: &[u8]) -> Result<[u8; WORD_SIZE], CodecError> {
    value.try_into().map_err(|_| CodecError::InvalidLength {
        expected: WORD_SIZE,
        actual: value.len(),
    })
}

/// Dynamic `string` values are hashed, never inlined.
pub fn string_word(value: &EthString) -> [u8; WORD_SIZE] {
    keccak_256(value.as_bytes())
}

/// Dynamic `bytes` values are hashed, never inlined.
pub fn bytes_word(value: &EthBytes) -> [u8; WORD_SIZE] {
    keccak_256(value)
}

/// Parse a `uint256` literal.
///
/// Accepts decimal digits, or `0x`-prefixed hex digits. A negative value or a value above
/// `2^256 - 1` is reported as [`CodecError::IntegerOutOfRange`]; `-0` is zero.
pub fn parse_uint256(input: &str) -> Result<U256, CodecError> {
    let invalid = || CodecError::InvalidInteger(input.to_owned());
    let out_of_range = || CodecError::IntegerOutOfRange(input.to_owned());

    if let Some(digits) = input.strip_prefix('-') {
        return if !is_decimal(digits) {
            Err(invalid())
        } else if digits.bytes().all(|b| b == b'0') {
            Ok(U256::zero())
        } else {
            Err(out_of_range())
        };
    }

    if let Some(digits) = input.strip_prefix("0x") {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let significant = digits.trim_start_matches('0');
        if significant.len() > WORD_SIZE * 2 {
            return Err(out_of_range());
        }
        let padded = format!("{significant:0>64}");
        let mut word = [0u8; WORD_SIZE];
        hex::decode_to_slice(padded, &mut word).map_err(|_| invalid())?;
        return Ok(U256::from_big_endian(&word));
    }

    if !is_decimal(input) {
        return Err(invalid());
    }
    U256::from_dec_str(input).map_err(|_| out_of_range())
}

/// Parse an EIP-155 chain id: a `uint256` literal that also fits into 64 bits.
pub fn parse_chain_id(input: &str) -> Result<u64, CodecError> {
    let value = parse_uint256(input)?;
    if value > U256::from(u64::MAX) {
        return Err(CodecError::IntegerOutOfRange(input.to_owned()));
    }
    Ok(value.low_u64())
}

/// Whether the input is a non-empty run of ASCII decimal digits.
fn is_decimal(input: &str) -> bool {
    !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit())
}
