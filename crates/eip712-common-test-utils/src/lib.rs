//! Common test utils for cross-checking the EIP-712 hashes against an independent encoder.

use ethers_core::types::transaction::eip712::{Eip712, TypedData};

/// The reference EIP-712 encoder, backed by the `ethers` typed data implementation.
pub struct ReferenceEncoder {
    /// The parsed typed data.
    typed_data: TypedData,
}

impl ReferenceEncoder {
    /// Load the `eth_signTypedData_v4` JSON document.
    pub fn from_json(type_data_json: &str) -> Self {
        let typed_data: TypedData = serde_json::from_str(type_data_json).unwrap();
        Self { typed_data }
    }

    /// The domain separator.
    pub fn domain_separator(&self) -> [u8; 32] {
        self.typed_data.domain.separator()
    }

    /// The struct hash of the message.
    pub fn struct_hash(&self) -> [u8; 32] {
        self.typed_data.struct_hash().unwrap()
    }

    /// The final signable digest.
    pub fn digest(&self) -> [u8; 32] {
        self.typed_data.encode_eip712().unwrap()
    }
}

/// Compute the signable digest of the given EIP-712 typed data JSON.
pub fn typed_data_digest(type_data_json: &str) -> [u8; 32] {
    ReferenceEncoder::from_json(type_data_json).digest()
}
