//! The EIP-712 typed structured data hashing.
//!
//! The flow is:
//! 1. describe the struct types with [`TypeDescriptor`]s and collect them in a [`Registry`];
//! 2. compute the [`type_hash`] of a type from its canonical signature, see [`encode_type`];
//! 3. compute the [`struct_hash`] of a [`StructValue`] of that type;
//! 4. combine it with the [`domain_separator`] into the final [`message_digest`].

use eip712_common::CodecError;

mod codec;
mod domain;
mod encoder;
mod resolver;
pub mod typed_data;
mod types;

pub use codec::encode_primitive;
pub use domain::{domain_separator, message_digest, DomainParameters, EIP712_DOMAIN};
pub use eip712_common;
pub use encoder::{encode_struct, struct_hash, Encoder, FieldPolicy};
pub use resolver::{encode_type, type_hash};
pub use types::{
    FieldDescriptor, PrimitiveType, Registry, StructValue, TypeDescriptor, TypeTag, Value,
};

/// An error that can occur while encoding the types or the values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A field value does not fit the declared field type.
    #[error("invalid value for field `{field}` of `{type_name}`: {source}")]
    InvalidField {
        /// The type that declares the field.
        type_name: String,
        /// The field name.
        field: String,
        /// The underlying failure.
        source: CodecError,
    },
    /// A field references a struct type that is not in the registry.
    #[error("type `{type_name}` referenced by `{referenced_by}` is not defined")]
    UnknownTypeReference {
        /// The missing type.
        type_name: String,
        /// The type (or the value path) the reference comes from.
        referenced_by: String,
    },
    /// The type references form a cycle.
    #[error("type `{type_name}` references itself")]
    CyclicTypeReference {
        /// A type on the cycle.
        type_name: String,
    },
    /// A declared field is absent from the value.
    #[error("missing value for field `{field}` of `{type_name}`")]
    MissingField {
        /// The type that declares the field.
        type_name: String,
        /// The field name.
        field: String,
    },
    /// The value has a field the type does not declare.
    #[error("unexpected field `{field}` for `{type_name}`")]
    UnexpectedField {
        /// The type of the value.
        type_name: String,
        /// The field name.
        field: String,
    },
    /// The type name denotes a solidity type the encoder does not support.
    #[error("unsupported type `{0}`")]
    UnsupportedType(String),
}
