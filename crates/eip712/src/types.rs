//! The typed data model: type tags, type descriptors, the type registry and the values.

use std::{collections::BTreeMap, fmt, str::FromStr};

use eip712_common::{EthereumAddress, U256};

use crate::Error;

/// A primitive solidity type supported by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// `address`.
    Address,
    /// `uint256`.
    Uint256,
    /// `string`, a dynamic type.
    String,
    /// `bytes`, a dynamic type.
    Bytes,
    /// `bytes32`.
    Bytes32,
    /// `bool`.
    Bool,
}

impl PrimitiveType {
    /// The canonical name used in the type signatures.
    pub const fn canonical_name(self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::Uint256 => "uint256",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Bytes32 => "bytes32",
            Self::Bool => "bool",
        }
    }
}

/// The type of a struct field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// One of the primitive types.
    Primitive(PrimitiveType),
    /// A reference to another named struct type.
    Struct(String),
}

impl TypeTag {
    /// `address`.
    pub const ADDRESS: Self = Self::Primitive(PrimitiveType::Address);
    /// `uint256`.
    pub const UINT256: Self = Self::Primitive(PrimitiveType::Uint256);
    /// `string`.
    pub const STRING: Self = Self::Primitive(PrimitiveType::String);
    /// `bytes`.
    pub const BYTES: Self = Self::Primitive(PrimitiveType::Bytes);
    /// `bytes32`.
    pub const BYTES32: Self = Self::Primitive(PrimitiveType::Bytes32);
    /// `bool`.
    pub const BOOL: Self = Self::Primitive(PrimitiveType::Bool);

    /// A reference to the struct type with the given name.
    pub fn reference(type_name: impl Into<String>) -> Self {
        Self::Struct(type_name.into())
    }

    /// The name of the type as it appears in the type signatures.
    pub fn canonical_name(&self) -> &str {
        match self {
            Self::Primitive(primitive) => primitive.canonical_name(),
            Self::Struct(type_name) => type_name,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

impl FromStr for TypeTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primitive = match s {
            "address" => PrimitiveType::Address,
            "uint256" => PrimitiveType::Uint256,
            "string" => PrimitiveType::String,
            "bytes" => PrimitiveType::Bytes,
            "bytes32" => PrimitiveType::Bytes32,
            "bool" => PrimitiveType::Bool,
            other if is_struct_name(other) => return Ok(Self::reference(other)),
            other => return Err(Error::UnsupportedType(other.to_owned())),
        };
        Ok(Self::Primitive(primitive))
    }
}

/// Whether the name can denote a struct type, rather than an unsupported solidity type
/// like `uint8`, `int256`, `bytes4` or an array.
fn is_struct_name(name: &str) -> bool {
    let mut chars = name.chars();
    let valid_identifier = chars
        .next()
        .map_or(false, |first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_identifier {
        return false;
    }

    let sized_primitive = ["uint", "int", "bytes"].iter().any(|prefix| {
        name.strip_prefix(prefix)
            .map_or(false, |size| size.bytes().all(|b| b.is_ascii_digit()))
    });
    !sized_primitive
}

/// A named and typed field of a struct type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    /// The field name.
    name: String,
    /// The field type.
    ty: TypeTag,
}

impl FieldDescriptor {
    /// Create a new field descriptor.
    pub fn new(name: impl Into<String>, ty: TypeTag) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// The field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field type.
    pub fn ty(&self) -> &TypeTag {
        &self.ty
    }
}

/// A named struct type with the ordered list of its fields.
///
/// The field order is significant: it defines both the type signature and the encoding order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    /// The type name.
    name: String,
    /// The fields in declaration order.
    fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    /// Create a new type descriptor without fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Create a new type descriptor from a list of fields.
    pub fn with_fields(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = FieldDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            fields: fields.into_iter().collect(),
        }
    }

    /// Append a field.
    pub fn field(mut self, name: impl Into<String>, ty: TypeTag) -> Self {
        self.fields.push(FieldDescriptor::new(name, ty));
        self
    }

    /// The type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Names of the struct types referenced directly by the fields, in declaration order.
    pub fn referenced_types(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(|field| match field.ty() {
            TypeTag::Struct(type_name) => Some(type_name.as_str()),
            TypeTag::Primitive(_) => None,
        })
    }

    /// The signature of this type alone, i.e. `Name(type1 name1,type2 name2)`,
    /// without the referenced types appended.
    pub fn own_signature(&self) -> String {
        let fields = self
            .fields
            .iter()
            .map(|field| format!("{} {}", field.ty(), field.name()))
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({})", self.name, fields)
    }
}

/// The set of known struct types, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    /// The types.
    types: BTreeMap<String, TypeDescriptor>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type, returning the registry.
    pub fn with(mut self, descriptor: TypeDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    /// Add a type, returning the previous type registered under the same name.
    pub fn insert(&mut self, descriptor: TypeDescriptor) -> Option<TypeDescriptor> {
        self.types.insert(descriptor.name.clone(), descriptor)
    }

    /// Look up a type by name.
    pub fn get(&self, type_name: &str) -> Option<&TypeDescriptor> {
        self.types.get(type_name)
    }

    /// Iterate over the types in the name order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }
}

impl FromIterator<TypeDescriptor> for Registry {
    fn from_iter<T: IntoIterator<Item = TypeDescriptor>>(iter: T) -> Self {
        let mut registry = Self::new();
        for descriptor in iter {
            registry.insert(descriptor);
        }
        registry
    }
}

/// A value to be encoded according to a field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Raw address bytes; must be exactly 20 bytes long.
    Address(Vec<u8>),
    /// An address in hex; must be exactly 40 hex digits, optionally `0x`-prefixed.
    AddressHex(String),
    /// An unsigned integer.
    Uint(U256),
    /// A signed integer; only non-negative values can be encoded.
    Int(i128),
    /// A text string.
    String(String),
    /// A byte sequence, for `bytes` and `bytes32`.
    Bytes(Vec<u8>),
    /// A boolean.
    Bool(bool),
    /// A nested struct value.
    Struct(StructValue),
}

impl Value {
    /// A short name of the value kind, for error reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Address(_) | Self::AddressHex(_) => "address",
            Self::Uint(_) | Self::Int(_) => "integer",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Bool(_) => "bool",
            Self::Struct(_) => "struct",
        }
    }
}

impl From<EthereumAddress> for Value {
    fn from(value: EthereumAddress) -> Self {
        Self::Address(value.0.to_vec())
    }
}

impl From<U256> for Value {
    fn from(value: U256) -> Self {
        Self::Uint(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Uint(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<StructValue> for Value {
    fn from(value: StructValue) -> Self {
        Self::Struct(value)
    }
}

/// A struct value: the field values by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructValue(BTreeMap<String, Value>);

impl StructValue {
    /// Create an empty struct value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, returning the struct value.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field, returning the previous value of the field.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Get a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The names of the present fields, in the name order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for StructValue {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        )
    }
}
