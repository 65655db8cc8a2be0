//! The EIP-2612 `Permit` typed data.

use eip712::{DomainParameters, Encoder, Error, Registry, StructValue, TypeDescriptor, TypeTag};
use eip712_common::{EthereumAddress, U256};
use hex_literal::hex;
use once_cell::sync::Lazy;

/// Permit typehash, i.e.
/// `keccak256("Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)")`.
pub const PERMIT_TYPEHASH: [u8; 32] =
    hex!("6e71edae12b1b97f4d1f60370fef10105fa2faae0126114a169c64845d6126c9");

/// The `Permit` type.
pub static PERMIT_TYPE: Lazy<TypeDescriptor> = Lazy::new(|| {
    TypeDescriptor::new("Permit")
        .field("owner", TypeTag::ADDRESS)
        .field("spender", TypeTag::ADDRESS)
        .field("value", TypeTag::UINT256)
        .field("nonce", TypeTag::UINT256)
        .field("deadline", TypeTag::UINT256)
});

/// The `Permit` type has no struct references.
static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// The `Permit` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permit {
    /// The token owner.
    pub owner: EthereumAddress,
    /// The account allowed to spend the tokens.
    pub spender: EthereumAddress,
    /// The allowance.
    pub value: U256,
    /// The owner's permit nonce.
    pub nonce: U256,
    /// The timestamp after which the permit is no longer valid.
    pub deadline: U256,
}

impl Permit {
    /// The permit as a value of the [`PERMIT_TYPE`].
    pub fn to_value(&self) -> StructValue {
        StructValue::new()
            .with("owner", self.owner)
            .with("spender", self.spender)
            .with("value", self.value)
            .with("nonce", self.nonce)
            .with("deadline", self.deadline)
    }
}

/// Make the struct hash of the `Permit`, without the domain.
pub fn permit_hash(permit: &Permit) -> Result<[u8; 32], Error> {
    Encoder::new(&REGISTRY)
        .strict()
        .struct_hash(&PERMIT_TYPE, &permit.to_value())
}

/// Make the signable digest of the `Permit` in the given domain.
pub fn permit_digest(domain: &DomainParameters, permit: &Permit) -> Result<[u8; 32], Error> {
    Encoder::new(&REGISTRY)
        .strict()
        .message_digest(domain, &PERMIT_TYPE, &permit.to_value())
}
