//! Typed data documents, in the `eth_signTypedData_v4` JSON format.

use std::collections::BTreeMap;

use eip712_common::{parse_chain_id, parse_uint256, CodecError, EthereumAddress};
use serde::Deserialize;
use serde_json::{Map, Value as Json};

use crate::{
    domain::{domain_separator, DomainParameters, EIP712_DOMAIN},
    resolver, Encoder, FieldDescriptor, PrimitiveType, Registry, StructValue, TypeDescriptor,
    TypeTag, Value,
};

/// An error that can occur while loading or hashing a typed data document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document is not valid JSON or does not have the expected shape.
    #[error("malformed typed data document: {0}")]
    Json(#[from] serde_json::Error),
    /// The primary type is not declared in the `types`.
    #[error("unknown primary type `{0}`")]
    UnknownPrimaryType(String),
    /// The document declares an `EIP712Domain` type other than the supported one.
    #[error(
        "unsupported `EIP712Domain` type: expected \
         (string name,string version,uint256 chainId,address verifyingContract)"
    )]
    UnsupportedDomainType,
    /// The domain `chainId` is not a valid 64-bit chain id.
    #[error("invalid domain chain id: {0}")]
    ChainId(#[source] CodecError),
    /// A message value does not fit its declared type.
    #[error("field `{path}`: {source}")]
    Field {
        /// The dotted path of the offending field.
        path: String,
        /// The underlying failure.
        #[source]
        source: CodecError,
    },
    /// A `bytes`/`bytes32` message value is not valid hex.
    #[error("field `{path}`: invalid hex: {source}")]
    Hex {
        /// The dotted path of the offending field.
        path: String,
        /// The underlying failure.
        #[source]
        source: hex::FromHexError,
    },
    /// The types or the message can not be encoded.
    #[error(transparent)]
    Encoding(#[from] crate::Error),
}

/// The raw document, as found in JSON.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    /// The type declarations.
    types: BTreeMap<String, Vec<DocumentField>>,
    /// The type of the message.
    primary_type: String,
    /// The signing domain.
    domain: DocumentDomain,
    /// The message.
    message: Map<String, Json>,
}

/// A field declaration.
#[derive(Debug, Deserialize)]
struct DocumentField {
    /// The field name.
    name: String,
    /// The field type name.
    #[serde(rename = "type")]
    ty: String,
}

/// The signing domain, with the chain id left unparsed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentDomain {
    /// See [`DomainParameters::name`].
    name: String,
    /// See [`DomainParameters::version`].
    version: String,
    /// A JSON number, a decimal string or a `0x` hex string.
    chain_id: Json,
    /// See [`DomainParameters::verifying_contract`].
    verifying_contract: EthereumAddress,
}

/// A loaded typed data document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedData {
    /// All the declared types except `EIP712Domain`.
    pub registry: Registry,
    /// The name of the message type.
    pub primary_type: String,
    /// The signing domain.
    pub domain: DomainParameters,
    /// The message.
    pub message: StructValue,
}

impl TypedData {
    /// Load the document from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let document: Document = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    /// Convert the raw document.
    fn from_document(document: Document) -> Result<Self, Error> {
        let mut registry = Registry::new();
        for (type_name, fields) in document.types {
            let fields = fields
                .into_iter()
                .map(|field| Ok(FieldDescriptor::new(field.name, field.ty.parse()?)))
                .collect::<Result<Vec<_>, crate::Error>>()?;
            let descriptor = TypeDescriptor::with_fields(type_name, fields);

            if descriptor.name() == EIP712_DOMAIN.name() {
                if descriptor != *EIP712_DOMAIN {
                    return Err(Error::UnsupportedDomainType);
                }
                continue;
            }
            registry.insert(descriptor);
        }

        let primary = registry
            .get(&document.primary_type)
            .ok_or_else(|| Error::UnknownPrimaryType(document.primary_type.clone()))?;
        let message = struct_from_json(primary, &document.message, &registry, "")?;

        let domain = DomainParameters {
            name: document.domain.name,
            version: document.domain.version,
            chain_id: chain_id_from_json(&document.domain.chain_id).map_err(Error::ChainId)?,
            verifying_contract: document.domain.verifying_contract,
        };

        tracing::debug!(
            message = "loaded typed data",
            primary_type = %document.primary_type,
            types = registry.iter().count(),
        );

        Ok(Self {
            registry,
            primary_type: document.primary_type,
            domain,
            message,
        })
    }

    /// The message type.
    pub fn primary(&self) -> Result<&TypeDescriptor, Error> {
        self.registry
            .get(&self.primary_type)
            .ok_or_else(|| Error::UnknownPrimaryType(self.primary_type.clone()))
    }

    /// The canonical signature of the message type.
    pub fn type_signature(&self) -> Result<String, Error> {
        Ok(resolver::encode_type(self.primary()?, &self.registry)?)
    }

    /// The type hash of the message type.
    pub fn type_hash(&self) -> Result<[u8; 32], Error> {
        Ok(resolver::type_hash(self.primary()?, &self.registry)?)
    }

    /// The domain separator.
    pub fn domain_separator(&self) -> Result<[u8; 32], Error> {
        Ok(domain_separator(&self.domain)?)
    }

    /// The struct hash of the message.
    pub fn struct_hash(&self) -> Result<[u8; 32], Error> {
        Ok(Encoder::new(&self.registry).struct_hash(self.primary()?, &self.message)?)
    }

    /// The final signable digest.
    pub fn digest(&self) -> Result<[u8; 32], Error> {
        Ok(Encoder::new(&self.registry).message_digest(
            &self.domain,
            self.primary()?,
            &self.message,
        )?)
    }
}

/// Parse the chain id.
fn chain_id_from_json(json: &Json) -> Result<u64, CodecError> {
    match json {
        Json::Number(number) => match number.as_u64() {
            Some(chain_id) => Ok(chain_id),
            None => parse_chain_id(&integer_literal(number)?),
        },
        Json::String(text) => parse_chain_id(text),
        other => Err(CodecError::ValueMismatch {
            expected: "uint256".to_owned(),
            found: json_kind(other),
        }),
    }
}

/// The decimal literal of an integral JSON number, including the ones that only fit
/// into a float, like `1e20`.
fn integer_literal(number: &serde_json::Number) -> Result<String, CodecError> {
    if let Some(signed) = number.as_i64() {
        return Ok(signed.to_string());
    }
    match number.as_f64() {
        Some(float) if float.is_finite() && float.fract() == 0.0 => Ok(format!("{float:.0}")),
        _ => Err(CodecError::InvalidInteger(number.to_string())),
    }
}

/// Convert a JSON object into a struct value of the `descriptor` type.
///
/// Only the declared fields are converted. Missing fields are left out for the encoder
/// to report.
fn struct_from_json(
    descriptor: &TypeDescriptor,
    object: &Map<String, Json>,
    registry: &Registry,
    path: &str,
) -> Result<StructValue, Error> {
    let mut value = StructValue::new();
    for field in descriptor.fields() {
        let Some(json) = object.get(field.name()) else {
            continue;
        };
        let field_path = if path.is_empty() {
            field.name().to_owned()
        } else {
            format!("{path}.{}", field.name())
        };
        let field_value = value_from_json(field.ty(), json, registry, &field_path)?;
        value.insert(field.name(), field_value);
    }
    Ok(value)
}

/// Convert a JSON value into a value of the given type.
fn value_from_json(
    ty: &TypeTag,
    json: &Json,
    registry: &Registry,
    path: &str,
) -> Result<Value, Error> {
    let field_error = |source| Error::Field {
        path: path.to_owned(),
        source,
    };
    let mismatch = || {
        field_error(CodecError::ValueMismatch {
            expected: ty.to_string(),
            found: json_kind(json),
        })
    };

    let primitive = match ty {
        TypeTag::Primitive(primitive) => *primitive,
        TypeTag::Struct(type_name) => {
            let nested = registry
                .get(type_name)
                .ok_or_else(|| crate::Error::UnknownTypeReference {
                    type_name: type_name.clone(),
                    referenced_by: path.to_owned(),
                })?;
            let Json::Object(object) = json else {
                return Err(mismatch());
            };
            return Ok(Value::Struct(struct_from_json(
                nested, object, registry, path,
            )?));
        }
    };

    let value = match (primitive, json) {
        (PrimitiveType::Address, Json::String(text)) => Value::AddressHex(text.clone()),
        (PrimitiveType::Uint256, Json::String(text)) => {
            Value::Uint(parse_uint256(text).map_err(field_error)?)
        }
        (PrimitiveType::Uint256, Json::Number(number)) => {
            if let Some(unsigned) = number.as_u64() {
                Value::Uint(unsigned.into())
            } else if let Some(signed) = number.as_i64() {
                Value::Int(signed.into())
            } else {
                let literal = integer_literal(number).map_err(field_error)?;
                Value::Uint(parse_uint256(&literal).map_err(field_error)?)
            }
        }
        (PrimitiveType::String, Json::String(text)) => Value::String(text.clone()),
        (PrimitiveType::Bytes | PrimitiveType::Bytes32, Json::String(text)) => {
            let digits = text.strip_prefix("0x").unwrap_or(text);
            let bytes = hex::decode(digits).map_err(|source| Error::Hex {
                path: path.to_owned(),
                source,
            })?;
            Value::Bytes(bytes)
        }
        (PrimitiveType::Bool, Json::Bool(flag)) => Value::Bool(*flag),
        _ => return Err(mismatch()),
    };
    Ok(value)
}

/// A short name of the JSON value kind, for error reporting.
fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
