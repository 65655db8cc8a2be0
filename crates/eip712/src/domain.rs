//! The EIP-712 domain and the final message digest.

use eip712_common::{make_message_hash, EthereumAddress};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{Encoder, Error, Registry, StructValue, TypeDescriptor, TypeTag};

/// The `EIP712Domain` type.
///
/// Only the `name`, `version`, `chainId` and `verifyingContract` fields are supported, all of them
/// always present.
pub static EIP712_DOMAIN: Lazy<TypeDescriptor> = Lazy::new(|| {
    TypeDescriptor::new("EIP712Domain")
        .field("name", TypeTag::STRING)
        .field("version", TypeTag::STRING)
        .field("chainId", TypeTag::UINT256)
        .field("verifyingContract", TypeTag::ADDRESS)
});

/// The domain type references no other types.
static DOMAIN_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// The parameters of the signing domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainParameters {
    /// The user readable name of signing domain, i.e. the name of the DApp or the protocol.
    pub name: String,
    /// The current major version of the signing domain.
    /// Signatures from different versions are not compatible.
    pub version: String,
    /// The EIP-155 chain id.
    pub chain_id: u64,
    /// The Ethereum address of the contract that will verify the resulting signature.
    pub verifying_contract: EthereumAddress,
}

impl DomainParameters {
    /// The domain as a value of the [`EIP712_DOMAIN`] type.
    pub fn to_value(&self) -> StructValue {
        StructValue::new()
            .with("name", self.name.as_str())
            .with("version", self.version.as_str())
            .with("chainId", self.chain_id)
            .with("verifyingContract", self.verifying_contract)
    }
}

/// Compute the domain separator, i.e. the struct hash of the domain.
pub fn domain_separator(params: &DomainParameters) -> Result<[u8; 32], Error> {
    Encoder::new(&DOMAIN_REGISTRY).struct_hash(&EIP712_DOMAIN, &params.to_value())
}

impl<'r> Encoder<'r> {
    /// Compute the signable digest of the `value` of the `descriptor` type in the given domain.
    pub fn message_digest(
        &self,
        params: &DomainParameters,
        descriptor: &TypeDescriptor,
        value: &StructValue,
    ) -> Result<[u8; 32], Error> {
        let domain_separator = domain_separator(params)?;
        let payload_hash = self.struct_hash(descriptor, value)?;
        Ok(make_message_hash(&domain_separator, &payload_hash))
    }
}

/// Compute the signable digest with a lenient encoder:
/// `keccak256(0x19 || 0x01 || domain_separator || struct_hash)`.
pub fn message_digest(
    params: &DomainParameters,
    descriptor: &TypeDescriptor,
    value: &StructValue,
    registry: &Registry,
) -> Result<[u8; 32], Error> {
    Encoder::new(registry).message_digest(params, descriptor, value)
}
