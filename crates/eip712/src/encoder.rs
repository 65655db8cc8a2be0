//! Struct encoding and struct hashes.

use eip712_common::{format_digest, keccak_256, WORD_SIZE};

use crate::{
    codec::encode_primitive, resolver::type_hash, Error, FieldDescriptor, Registry, StructValue,
    TypeDescriptor, TypeTag, Value,
};

/// What to do with the value fields that the type does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Extra fields are ignored. This is the behaviour of the common typed data encoders.
    #[default]
    IgnoreExtra,
    /// Extra fields are rejected with [`Error::UnexpectedField`].
    RejectExtra,
}

/// The struct encoder, bound to a registry of types.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'r> {
    /// The types the references are resolved against.
    registry: &'r Registry,
    /// The extra fields handling.
    policy: FieldPolicy,
}

impl<'r> Encoder<'r> {
    /// Create a lenient encoder.
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            policy: FieldPolicy::default(),
        }
    }

    /// Switch to the strict mode, where the extra value fields are rejected.
    pub fn strict(self) -> Self {
        self.with_policy(FieldPolicy::RejectExtra)
    }

    /// Set the extra fields handling.
    pub fn with_policy(self, policy: FieldPolicy) -> Self {
        Self { policy, ..self }
    }

    /// Encode the struct value: the type hash followed by one 32-byte slot per field,
    /// in the declaration order.
    pub fn encode_struct(
        &self,
        descriptor: &TypeDescriptor,
        value: &StructValue,
    ) -> Result<Vec<u8>, Error> {
        if self.policy == FieldPolicy::RejectExtra {
            reject_extra_fields(descriptor, value)?;
        }

        let mut buf = Vec::with_capacity(WORD_SIZE * (descriptor.fields().len() + 1));
        buf.extend_from_slice(&type_hash(descriptor, self.registry)?);

        for field in descriptor.fields() {
            let field_value = value.get(field.name()).ok_or_else(|| Error::MissingField {
                type_name: descriptor.name().to_owned(),
                field: field.name().to_owned(),
            })?;
            buf.extend_from_slice(&self.encode_field(descriptor, field, field_value)?);
        }

        Ok(buf)
    }

    /// Compute the struct hash: the keccak256 of the struct encoding.
    pub fn struct_hash(
        &self,
        descriptor: &TypeDescriptor,
        value: &StructValue,
    ) -> Result<[u8; 32], Error> {
        let hash = keccak_256(&self.encode_struct(descriptor, value)?);
        tracing::debug!(
            message = "computed struct hash",
            type_name = descriptor.name(),
            struct_hash = %format_digest(&hash),
        );
        Ok(hash)
    }

    /// Encode a single field slot.
    ///
    /// Nested structs, like the dynamic types, are hashed rather than inlined.
    fn encode_field(
        &self,
        owner: &TypeDescriptor,
        field: &FieldDescriptor,
        value: &Value,
    ) -> Result<[u8; WORD_SIZE], Error> {
        match field.ty() {
            TypeTag::Primitive(primitive) => {
                encode_primitive(*primitive, value).map_err(|source| Error::InvalidField {
                    type_name: owner.name().to_owned(),
                    field: field.name().to_owned(),
                    source,
                })
            }
            TypeTag::Struct(type_name) => {
                let nested =
                    self.registry
                        .get(type_name)
                        .ok_or_else(|| Error::UnknownTypeReference {
                            type_name: type_name.clone(),
                            referenced_by: owner.name().to_owned(),
                        })?;
                let Value::Struct(nested_value) = value else {
                    return Err(Error::InvalidField {
                        type_name: owner.name().to_owned(),
                        field: field.name().to_owned(),
                        source: eip712_common::CodecError::ValueMismatch {
                            expected: type_name.clone(),
                            found: value.kind(),
                        },
                    });
                };
                self.struct_hash(nested, nested_value)
            }
        }
    }
}

/// Fail on the first value field the type does not declare.
fn reject_extra_fields(descriptor: &TypeDescriptor, value: &StructValue) -> Result<(), Error> {
    let unexpected = value.field_names().find(|name| {
        !descriptor
            .fields()
            .iter()
            .any(|field| field.name() == *name)
    });
    match unexpected {
        Some(field) => Err(Error::UnexpectedField {
            type_name: descriptor.name().to_owned(),
            field: field.to_owned(),
        }),
        None => Ok(()),
    }
}

/// Encode the struct value with a lenient encoder.
pub fn encode_struct(
    descriptor: &TypeDescriptor,
    value: &StructValue,
    registry: &Registry,
) -> Result<Vec<u8>, Error> {
    Encoder::new(registry).encode_struct(descriptor, value)
}

/// Compute the struct hash with a lenient encoder.
pub fn struct_hash(
    descriptor: &TypeDescriptor,
    value: &StructValue,
    registry: &Registry,
) -> Result<[u8; 32], Error> {
    Encoder::new(registry).struct_hash(descriptor, value)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use eip712_common::{AddressError, CodecError, EthereumAddress, U256};
    use hex_literal::hex;
    use tracing_test::traced_test;

    use super::*;

    fn registry() -> Registry {
        Registry::new()
            .with(
                TypeDescriptor::new("Person")
                    .field("name", TypeTag::STRING)
                    .field("wallet", TypeTag::ADDRESS),
            )
            .with(
                TypeDescriptor::new("Mail")
                    .field("from", TypeTag::reference("Person"))
                    .field("to", TypeTag::reference("Person"))
                    .field("contents", TypeTag::STRING),
            )
    }

    fn person(name: &str, wallet: [u8; 20]) -> StructValue {
        StructValue::new()
            .with("name", name)
            .with("wallet", EthereumAddress(wallet))
    }

    fn sample_mail() -> StructValue {
        StructValue::new()
            .with(
                "from",
                person("Cow", hex!("CD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826")),
            )
            .with(
                "to",
                person("Bob", hex!("bBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB")),
            )
            .with("contents", "Hello, Bob!")
    }

    #[test]
    fn ether_mail_struct_hash() {
        // See https://github.com/ethereum/EIPs/blob/fcaec3dc70e758fe80abd86f0c70bbbedbec6e61/assets/eip-712/Example.sol
        let registry = registry();
        let mail = registry.get("Mail").unwrap();

        assert_eq!(
            struct_hash(mail, &sample_mail(), &registry).unwrap(),
            hex!("c52c0ee5d84264471806290a3f2c4cecfc5490626bf912d01f240d7a274b371e")
        );
    }

    #[test]
    fn encoding_layout() {
        let registry = registry();
        let mail = registry.get("Mail").unwrap();
        let person_type = registry.get("Person").unwrap();

        let encoded = encode_struct(mail, &sample_mail(), &registry).unwrap();
        assert_eq!(encoded.len(), 4 * WORD_SIZE);
        assert_eq!(encoded[..32], type_hash(mail, &registry).unwrap());
        assert_eq!(
            encoded[32..64],
            struct_hash(
                person_type,
                &person("Cow", hex!("CD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826")),
                &registry
            )
            .unwrap()
        );
        assert_eq!(encoded[96..], keccak_256(b"Hello, Bob!"));
    }

    #[test]
    fn deterministic() {
        let registry = registry();
        let mail = registry.get("Mail").unwrap();
        let first = struct_hash(mail, &sample_mail(), &registry).unwrap();
        let second = struct_hash(mail, &sample_mail(), &registry).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn every_field_value_matters() {
        let registry = registry();
        let mail = registry.get("Mail").unwrap();
        let original = struct_hash(mail, &sample_mail(), &registry).unwrap();

        let variants = [
            sample_mail().with("contents", "Hello, Bob?"),
            sample_mail().with(
                "to",
                person("Rob", hex!("bBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB")),
            ),
            sample_mail().with(
                "from",
                person("Cow", hex!("CD2a3d9F938E13CD947Ec05AbC7FE734Df8DD827")),
            ),
        ];
        for variant in variants {
            assert_ne!(struct_hash(mail, &variant, &registry).unwrap(), original);
        }
    }

    #[test]
    fn extra_fields_are_ignored_by_default() {
        let registry = registry();
        let mail = registry.get("Mail").unwrap();
        let with_extra = sample_mail().with("cc", "Alice");

        assert_eq!(
            struct_hash(mail, &with_extra, &registry).unwrap(),
            struct_hash(mail, &sample_mail(), &registry).unwrap()
        );
    }

    #[test]
    fn extra_fields_are_rejected_in_strict_mode() {
        let registry = registry();
        let mail = registry.get("Mail").unwrap();
        let with_extra = sample_mail().with("cc", "Alice");

        assert_matches!(
            Encoder::new(&registry).strict().struct_hash(mail, &with_extra),
            Err(Error::UnexpectedField { ref type_name, ref field })
                if type_name == "Mail" && field == "cc"
        );
        assert!(Encoder::new(&registry)
            .strict()
            .struct_hash(mail, &sample_mail())
            .is_ok());
    }

    #[test]
    fn strict_mode_applies_to_nested_values() {
        let registry = registry();
        let mail = registry.get("Mail").unwrap();
        let sloppy_person =
            person("Bob", hex!("bBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB")).with("age", 42u64);
        let value = sample_mail().with("to", sloppy_person);

        assert_matches!(
            Encoder::new(&registry).strict().struct_hash(mail, &value),
            Err(Error::UnexpectedField { ref type_name, ref field })
                if type_name == "Person" && field == "age"
        );
    }

    #[test]
    fn missing_field() {
        let registry = registry();
        let person_type = registry.get("Person").unwrap();
        let value = StructValue::new().with("name", "Bob");

        assert_matches!(
            struct_hash(person_type, &value, &registry),
            Err(Error::MissingField { ref type_name, ref field })
                if type_name == "Person" && field == "wallet"
        );
    }

    #[test]
    fn invalid_nested_address() {
        let registry = registry();
        let mail = registry.get("Mail").unwrap();
        let bad_person = StructValue::new()
            .with("name", "Bob")
            .with("wallet", Value::Address(vec![0xbb; 19]));
        let value = sample_mail().with("to", bad_person);

        assert_matches!(
            struct_hash(mail, &value, &registry),
            Err(Error::InvalidField {
                ref type_name,
                ref field,
                source: CodecError::InvalidAddress(AddressError::BadLength(19)),
            }) if type_name == "Person" && field == "wallet"
        );
    }

    #[test]
    fn negative_integer() {
        let registry = Registry::new();
        let descriptor = TypeDescriptor::new("Amount").field("value", TypeTag::UINT256);
        let value = StructValue::new().with("value", Value::Int(-5));

        assert_matches!(
            struct_hash(&descriptor, &value, &registry),
            Err(Error::InvalidField {
                source: CodecError::IntegerOutOfRange(_),
                ..
            })
        );
    }

    #[test]
    fn struct_field_requires_struct_value() {
        let registry = registry();
        let mail = registry.get("Mail").unwrap();
        let value = sample_mail().with("to", "Bob");

        assert_matches!(
            struct_hash(mail, &value, &registry),
            Err(Error::InvalidField {
                ref field,
                source: CodecError::ValueMismatch { ref expected, found: "string" },
                ..
            }) if field == "to" && expected == "Person"
        );
    }

    #[test]
    fn unknown_nested_type() {
        let registry = Registry::new();
        let descriptor = TypeDescriptor::new("Wrapper").field("inner", TypeTag::reference("Gone"));
        let value = StructValue::new().with("inner", StructValue::new());

        assert_matches!(
            struct_hash(&descriptor, &value, &registry),
            Err(Error::UnknownTypeReference { ref type_name, .. }) if type_name == "Gone"
        );
    }

    #[test]
    fn all_primitive_types() {
        let registry = Registry::new();
        let descriptor = TypeDescriptor::new("Everything")
            .field("flag", TypeTag::BOOL)
            .field("blob", TypeTag::BYTES)
            .field("word", TypeTag::BYTES32)
            .field("amount", TypeTag::UINT256);
        let value = StructValue::new()
            .with("flag", true)
            .with("blob", Value::Bytes(vec![1, 2, 3]))
            .with("word", Value::Bytes(vec![7; 32]))
            .with("amount", U256::MAX);

        let encoded = encode_struct(&descriptor, &value, &registry).unwrap();
        assert_eq!(encoded.len(), 5 * WORD_SIZE);
        assert_eq!(encoded[63], 1);
        assert_eq!(encoded[64..96], keccak_256(&[1, 2, 3]));
        assert_eq!(encoded[96..128], [7; 32]);
        assert_eq!(encoded[128..], [0xff; 32]);
    }

    #[traced_test]
    #[test]
    fn struct_hash_is_logged() {
        let registry = registry();
        let person_type = registry.get("Person").unwrap();
        let value = person("Bob", hex!("bBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"));

        struct_hash(person_type, &value, &registry).unwrap();

        assert!(logs_contain("computed struct hash"));
        assert!(logs_contain("Person(string name,address wallet)"));
    }
}
