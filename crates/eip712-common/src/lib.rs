//! Common primitives for EIP-712 typed data hashing: the Keccak digest, the EIP-191 framing of
//! the final message and the canonical 32-byte word encoding of the primitive solidity types.

use sha3::Digest;

mod ethereum_address;
mod word;

pub use ethereum_address::*;
pub use primitive_types::U256;
pub use word::*;

/// A type alias representing a `string` solidity type.
pub type EthString = str;
/// A type alias representing a `uint256` solidity type in its encoded form.
pub type EthUint256 = [u8; 32];
/// A type alias representing an `address` solidity type.
pub type EthAddress = [u8; 20];
/// A type alias representing the `bytes` solidity type.
pub type EthBytes = [u8];

/// A first number of an EIP191 message.
const EIP191_MAGIC_BYTE: u8 = 0x19;
/// The EIP191 version for the EIP-712 structured data.
const EIP191_VERSION_STRUCTURED_DATA: u8 = 0x01;

/// Compute the Keccak-256 digest of the given data.
///
/// This is the original Keccak padding used across Ethereum, not the FIPS-202 SHA3-256.
pub fn keccak_256(data: &[u8]) -> [u8; 32] {
    sha3::Keccak256::digest(data).into()
}

/// Prepare a hash for the whole EIP-712 message.
///
/// The result is `keccak256(0x19 || 0x01 || domain_separator || payload_hash)`.
pub fn make_message_hash(domain_separator: &[u8; 32], payload_hash: &[u8; 32]) -> [u8; 32] {
    let mut msg: [u8; 66] = [0; 66];
    msg[0] = EIP191_MAGIC_BYTE;
    msg[1] = EIP191_VERSION_STRUCTURED_DATA;
    msg[2..34].copy_from_slice(domain_separator);
    msg[34..66].copy_from_slice(payload_hash);
    keccak_256(&msg)
}

/// Render a digest as a lowercase `0x`-prefixed hex string.
pub fn format_digest(digest: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(digest))
}
