//! The subcommands.

use std::{
    io::Read,
    path::{Path, PathBuf},
};

use eip712::{domain_separator, typed_data::TypedData, DomainParameters};
use eip712_common::{
    format_digest, parse_chain_id, parse_uint256, CodecError, EthereumAddress, U256,
};
use eip712_permit::{permit_digest, permit_hash, Permit};

use crate::Error;

/// Parse an address argument: 40 hex digits, optionally `0x`-prefixed.
pub fn parse_address(input: &str) -> Result<EthereumAddress, CodecError> {
    Ok(input.parse()?)
}

/// The `domain-separator` command.
#[derive(Debug, Clone, clap::Args)]
pub struct DomainSeparatorCmd {
    /// The address of the contract that verifies the signatures.
    #[arg(value_parser = parse_address)]
    pub verifying_contract: EthereumAddress,

    /// The name of the signing domain.
    pub name: String,

    /// The version of the signing domain.
    #[arg(default_value = "1")]
    pub version: String,

    /// The EIP-155 chain id, decimal or `0x` hex.
    #[arg(default_value = "1", value_parser = parse_chain_id, allow_negative_numbers = true)]
    pub chain_id: u64,
}

impl DomainSeparatorCmd {
    /// Run the command.
    pub fn run(&self) -> Result<String, Error> {
        let domain = DomainParameters {
            name: self.name.clone(),
            version: self.version.clone(),
            chain_id: self.chain_id,
            verifying_contract: self.verifying_contract,
        };
        Ok(format_digest(&domain_separator(&domain)?))
    }
}

/// The `permit-hash` and `permit-digest` commands.
#[derive(Debug, Clone, clap::Args)]
pub struct PermitCmd {
    /// The address of the token contract.
    #[arg(value_parser = parse_address)]
    pub verifying_contract: EthereumAddress,

    /// The name of the token, as used in its signing domain.
    pub name: String,

    /// The token owner.
    #[arg(value_parser = parse_address)]
    pub owner: EthereumAddress,

    /// The account allowed to spend the tokens.
    #[arg(value_parser = parse_address)]
    pub spender: EthereumAddress,

    /// The allowance.
    #[arg(value_parser = parse_uint256, allow_negative_numbers = true)]
    pub value: U256,

    /// The owner's permit nonce.
    #[arg(value_parser = parse_uint256, allow_negative_numbers = true)]
    pub nonce: U256,

    /// The timestamp after which the permit is no longer valid.
    #[arg(value_parser = parse_uint256, allow_negative_numbers = true)]
    pub deadline: U256,

    /// The version of the signing domain.
    #[arg(default_value = "1")]
    pub version: String,

    /// The EIP-155 chain id, decimal or `0x` hex.
    #[arg(default_value = "1", value_parser = parse_chain_id, allow_negative_numbers = true)]
    pub chain_id: u64,
}

impl PermitCmd {
    /// The permit payload.
    fn permit(&self) -> Permit {
        Permit {
            owner: self.owner,
            spender: self.spender,
            value: self.value,
            nonce: self.nonce,
            deadline: self.deadline,
        }
    }

    /// The token signing domain.
    fn domain(&self) -> DomainParameters {
        DomainParameters {
            name: self.name.clone(),
            version: self.version.clone(),
            chain_id: self.chain_id,
            verifying_contract: self.verifying_contract,
        }
    }

    /// Run the `permit-hash` command: the bare struct hash, without the domain.
    pub fn run_hash(&self) -> Result<String, Error> {
        Ok(format_digest(&permit_hash(&self.permit())?))
    }

    /// Run the `permit-digest` command: the signable digest.
    pub fn run_digest(&self) -> Result<String, Error> {
        Ok(format_digest(&permit_digest(&self.domain(), &self.permit())?))
    }
}

/// The `type-hash` command.
#[derive(Debug, Clone, clap::Args)]
pub struct TypeHashCmd {
    /// The typed data JSON document, or `-` for stdin.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,
}

impl TypeHashCmd {
    /// Run the command, producing the type signature and the type hash on separate lines.
    pub fn run(&self) -> Result<String, Error> {
        let typed_data = TypedData::from_json(&read_input(&self.input)?)?;
        Ok(format!(
            "{}\n{}",
            typed_data.type_signature()?,
            format_digest(&typed_data.type_hash()?)
        ))
    }
}

/// The `typed-data-hash` command.
#[derive(Debug, Clone, clap::Args)]
pub struct TypedDataHashCmd {
    /// The typed data JSON document, or `-` for stdin.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Print the struct hash of the message instead of the signable digest.
    #[arg(long)]
    pub struct_hash: bool,
}

impl TypedDataHashCmd {
    /// Run the command.
    pub fn run(&self) -> Result<String, Error> {
        let typed_data = TypedData::from_json(&read_input(&self.input)?)?;
        let hash = if self.struct_hash {
            typed_data.struct_hash()?
        } else {
            typed_data.digest()?
        };
        Ok(format_digest(&hash))
    }
}

/// Read the whole input document; `-` stands for stdin.
fn read_input(path: &Path) -> Result<String, Error> {
    let read_error = |source| Error::Read {
        path: path.to_owned(),
        source,
    };

    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(read_error)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).map_err(read_error)
}
