//! Encoding of the primitive field values into their 32-byte slots.

use eip712_common::{
    address_word, bool_word, bytes_word, fixed_bytes_word, string_word, uint_word, CodecError,
    EthereumAddress, U256, WORD_SIZE,
};

use crate::{PrimitiveType, Value};

/// Encode a primitive value into its slot in the struct encoding.
///
/// Dynamic types (`string` and `bytes`) are hashed; all other types are encoded in place.
pub fn encode_primitive(ty: PrimitiveType, value: &Value) -> Result<[u8; WORD_SIZE], CodecError> {
    match ty {
        PrimitiveType::Address => encode_address(value),
        PrimitiveType::Uint256 => encode_uint256(value),
        PrimitiveType::String => encode_string(value),
        PrimitiveType::Bytes => encode_bytes(value),
        PrimitiveType::Bytes32 => encode_bytes32(value),
        PrimitiveType::Bool => encode_bool(value),
    }
}

/// The error for a value that does not fit the declared type.
fn mismatch(ty: PrimitiveType, value: &Value) -> CodecError {
    CodecError::ValueMismatch {
        expected: ty.canonical_name().to_owned(),
        found: value.kind(),
    }
}

/// `address`: 20 bytes, left-padded.
fn encode_address(value: &Value) -> Result<[u8; WORD_SIZE], CodecError> {
    let address = match value {
        Value::Address(bytes) => EthereumAddress::from_slice(bytes)?,
        Value::AddressHex(hex) => hex.parse::<EthereumAddress>()?,
        other => return Err(mismatch(PrimitiveType::Address, other)),
    };
    Ok(address_word(&address))
}

/// `uint256`: big-endian, negative values rejected.
fn encode_uint256(value: &Value) -> Result<[u8; WORD_SIZE], CodecError> {
    let number = match value {
        Value::Uint(number) => *number,
        Value::Int(number) => {
            let unsigned = u128::try_from(*number)
                .map_err(|_| CodecError::IntegerOutOfRange(number.to_string()))?;
            U256::from(unsigned)
        }
        other => return Err(mismatch(PrimitiveType::Uint256, other)),
    };
    Ok(uint_word(&number))
}

/// `string`: keccak256 of the UTF-8 bytes.
fn encode_string(value: &Value) -> Result<[u8; WORD_SIZE], CodecError> {
    match value {
        Value::String(text) => Ok(string_word(text)),
        other => Err(mismatch(PrimitiveType::String, other)),
    }
}

/// `bytes`: keccak256 of the raw bytes.
fn encode_bytes(value: &Value) -> Result<[u8; WORD_SIZE], CodecError> {
    match value {
        Value::Bytes(bytes) => Ok(bytes_word(bytes)),
        other => Err(mismatch(PrimitiveType::Bytes, other)),
    }
}

/// `bytes32`: used verbatim.
fn encode_bytes32(value: &Value) -> Result<[u8; WORD_SIZE], CodecError> {
    match value {
        Value::Bytes(bytes) => fixed_bytes_word(bytes),
        other => Err(mismatch(PrimitiveType::Bytes32, other)),
    }
}

/// `bool`: as `uint256` `0` or `1`.
fn encode_bool(value: &Value) -> Result<[u8; WORD_SIZE], CodecError> {
    match value {
        Value::Bool(flag) => Ok(bool_word(*flag)),
        other => Err(mismatch(PrimitiveType::Bool, other)),
    }
}
