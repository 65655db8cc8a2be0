//! Ethereum address.

use core::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::EthAddress;

/// An Ethereum address (i.e. 20 bytes, used to represent an Ethereum account).
///
/// This gets displayed and serialized to the lowercase 0x-prefixed hex representation.
/// Parsing is case-insensitive and does not enforce the EIP-55 checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EthereumAddress(pub EthAddress);

/// An error that can occur when constructing an [`EthereumAddress`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AddressError {
    /// The raw bytes are not exactly 20 bytes long.
    #[error("expected 20 bytes, got {0}")]
    BadLength(usize),
    /// The hex representation does not have exactly 40 digits.
    #[error("expected 40 hex digits, got {0}")]
    BadHexLength(usize),
    /// The hex representation contains non-hex characters.
    #[error("invalid hex: {0}")]
    BadHex(#[from] hex::FromHexError),
}

impl EthereumAddress {
    /// Construct the address from a raw byte slice, which must be exactly 20 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let inner: EthAddress = bytes
            .try_into()
            .map_err(|_| AddressError::BadLength(bytes.len()))?;
        Ok(Self(inner))
    }

    /// The raw address bytes.
    pub fn as_bytes(&self) -> &EthAddress {
        &self.0
    }
}

impl From<EthAddress> for EthereumAddress {
    fn from(value: EthAddress) -> Self {
        Self(value)
    }
}

impl fmt::Display for EthereumAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for EthereumAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != 40 {
            return Err(AddressError::BadHexLength(digits.len()));
        }
        let mut inner = [0u8; 20];
        hex::decode_to_slice(digits, &mut inner)?;
        Ok(Self(inner))
    }
}

impl Serialize for EthereumAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EthereumAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let base_string = String::deserialize(deserializer)?;
        base_string.parse().map_err(de::Error::custom)
    }
}
