//! The EIP-712 hashing command line tool.
//!
//! Every command prints a single `0x`-prefixed lowercase hex digest to stdout (the `type-hash`
//! command prints the type signature on the line before it). Logs go to stderr.

use std::{ffi::OsString, path::PathBuf};

use clap::{
    error::{ContextKind, ContextValue, ErrorKind},
    Parser,
};

mod command;
pub mod logger;

pub use command::*;

/// Compute EIP-712 domain separators, struct hashes and signable digests.
#[derive(Debug, clap::Parser)]
#[command(name = "eip712", version)]
pub struct Cli {
    /// Increase the log verbosity; can be repeated.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// The log filter directives, in the `RUST_LOG` syntax; take precedence over `--verbose`.
    #[arg(long, value_name = "FILTER", global = true)]
    pub log_filter: Option<String>,

    /// The command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// The commands.
#[derive(Debug, Clone, clap::Subcommand)]
pub enum Command {
    /// Compute the domain separator.
    #[command(visible_alias = "ds")]
    DomainSeparator(DomainSeparatorCmd),

    /// Compute the `Permit` struct hash, without the domain.
    #[command(visible_alias = "permit")]
    PermitHash(PermitCmd),

    /// Compute the signable `Permit` digest.
    PermitDigest(PermitCmd),

    /// Compute the type signature and the type hash of a typed data document's primary type.
    TypeHash(TypeHashCmd),

    /// Compute the signable digest of a typed data document.
    TypedDataHash(TypedDataHashCmd),
}

impl Command {
    /// The command name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DomainSeparator(_) => "domain-separator",
            Self::PermitHash(_) => "permit-hash",
            Self::PermitDigest(_) => "permit-digest",
            Self::TypeHash(_) => "type-hash",
            Self::TypedDataHash(_) => "typed-data-hash",
        }
    }
}

/// An error that can occur while running the tool.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The command is not known.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    /// The command line is otherwise invalid, or help or version was requested.
    #[error(transparent)]
    Usage(clap::Error),
    /// The input document could not be read.
    #[error("failed to read `{}`: {source}", path.display())]
    Read {
        /// The path of the document.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The values could not be encoded.
    #[error(transparent)]
    Encoding(#[from] eip712::Error),
    /// The typed data document could not be loaded or encoded.
    #[error(transparent)]
    TypedData(#[from] eip712::typed_data::Error),
}

/// Parse the command line.
///
/// An unrecognized subcommand is reported as [`Error::UnknownCommand`].
pub fn parse<I, T>(args: I) -> Result<Cli, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map_err(|err| {
        if err.kind() == ErrorKind::InvalidSubcommand {
            if let Some(ContextValue::String(name)) = err.get(ContextKind::InvalidSubcommand) {
                return Error::UnknownCommand(name.clone());
            }
        }
        Error::Usage(err)
    })
}

/// Run the command, producing the text to print.
pub fn run(command: &Command) -> Result<String, Error> {
    tracing::debug!(message = "running command", command = command.name());

    match command {
        Command::DomainSeparator(cmd) => cmd.run(),
        Command::PermitHash(cmd) => cmd.run_hash(),
        Command::PermitDigest(cmd) => cmd.run_digest(),
        Command::TypeHash(cmd) => cmd.run(),
        Command::TypedDataHash(cmd) => cmd.run(),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use eip712_common::{AddressError, CodecError};
    use indoc::indoc;
    use tracing_test::traced_test;

    use super::*;

    const ONE: &str = "0x0000000000000000000000000000000000000001";
    const TWO: &str = "0x0000000000000000000000000000000000000002";

    const ETHER_MAIL: &str = indoc! {r#"
        {
            "types": {
                "EIP712Domain": [
                    { "name": "name", "type": "string" },
                    { "name": "version", "type": "string" },
                    { "name": "chainId", "type": "uint256" },
                    { "name": "verifyingContract", "type": "address" }
                ],
                "Person": [
                    { "name": "name", "type": "string" },
                    { "name": "wallet", "type": "address" }
                ],
                "Mail": [
                    { "name": "from", "type": "Person" },
                    { "name": "to", "type": "Person" },
                    { "name": "contents", "type": "string" }
                ]
            },
            "primaryType": "Mail",
            "domain": {
                "name": "Ether Mail",
                "version": "1",
                "chainId": 1,
                "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
            },
            "message": {
                "from": {
                    "name": "Cow",
                    "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"
                },
                "to": {
                    "name": "Bob",
                    "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"
                },
                "contents": "Hello, Bob!"
            }
        }
    "#};

    fn run_args(args: &[&str]) -> Result<String, Error> {
        let cli = parse(std::iter::once("eip712").chain(args.iter().copied()))?;
        run(&cli.command)
    }

    /// Write the document to a file unique to this test process.
    fn write_fixture(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("eip712-cli-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Extract the argument parsing failure from a usage error.
    fn value_error(result: Result<String, Error>) -> CodecError {
        let err = match result {
            Err(Error::Usage(err)) => err,
            other => panic!("expected a usage error, got {other:?}"),
        };
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        std::error::Error::source(&err)
            .and_then(|source| source.downcast_ref::<CodecError>())
            .cloned()
            .unwrap()
    }

    #[test]
    fn domain_separator() {
        assert_eq!(
            run_args(&["domain-separator", ONE, "X"]).unwrap(),
            "0x4a37418525bbf9f3deb24ee3ea1ed5df8708ab996f4c831c20252c02b99476b8"
        );
        assert_eq!(
            run_args(&["ds", ONE, "X", "1", "1"]).unwrap(),
            "0x4a37418525bbf9f3deb24ee3ea1ed5df8708ab996f4c831c20252c02b99476b8"
        );
        assert_eq!(
            run_args(&["ds", ONE, "X", "2", "5"]).unwrap(),
            "0x4c41a8d81f5d39cff2dcd8ac56b6904358587e4cced5a68e531fb82664927ab7"
        );
    }

    #[test]
    fn hex_chain_id() {
        assert_eq!(
            run_args(&["ds", ONE, "X", "1", "0x1"]).unwrap(),
            "0x4a37418525bbf9f3deb24ee3ea1ed5df8708ab996f4c831c20252c02b99476b8"
        );
        assert_eq!(
            run_args(&["ds", ONE, "X", "2", "0x5"]).unwrap(),
            "0x4c41a8d81f5d39cff2dcd8ac56b6904358587e4cced5a68e531fb82664927ab7"
        );
    }

    #[test]
    fn chain_id_out_of_range() {
        for chain_id in ["-1", "18446744073709551616"] {
            assert_matches!(
                value_error(run_args(&["ds", ONE, "X", "1", chain_id])),
                CodecError::IntegerOutOfRange(ref value) if value == chain_id
            );
            assert_matches!(
                value_error(run_args(&[
                    "permit-digest", ONE, "X", ONE, TWO, "1000", "0", "9999999999", "1", chain_id
                ])),
                CodecError::IntegerOutOfRange(ref value) if value == chain_id
            );
        }
        assert_matches!(
            value_error(run_args(&["ds", ONE, "X", "1", "mainnet"])),
            CodecError::InvalidInteger(_)
        );
    }

    #[test]
    fn address_without_prefix() {
        assert_eq!(
            run_args(&["ds", "0000000000000000000000000000000000000001", "X"]).unwrap(),
            "0x4a37418525bbf9f3deb24ee3ea1ed5df8708ab996f4c831c20252c02b99476b8"
        );
    }

    #[test]
    fn permit_hash() {
        let expected = "0xee454caf42808e579848453c8efe229e4a936caa4f57e1b07d137a82f086b844";
        let args = [ONE, "X", ONE, TWO, "1000", "0", "9999999999"];

        for command in ["permit-hash", "permit"] {
            let mut full = vec![command];
            full.extend(args);
            assert_eq!(run_args(&full).unwrap(), expected);
        }

        // The domain does not take part in the bare struct hash.
        let mut other_domain = vec!["permit-hash", TWO, "Y"];
        other_domain.extend(&args[2..]);
        other_domain.extend(["2", "5"]);
        assert_eq!(run_args(&other_domain).unwrap(), expected);
    }

    #[test]
    fn permit_digest() {
        assert_eq!(
            run_args(&["permit-digest", ONE, "X", ONE, TWO, "1000", "0", "9999999999"]).unwrap(),
            "0x008377608d7c9b596953ff4f5274861451c610e600c9d605f48e2dd1f0454b02"
        );
    }

    #[test]
    fn unknown_command() {
        assert_matches!(
            run_args(&["frobnicate", ONE]),
            Err(Error::UnknownCommand(ref name)) if name == "frobnicate"
        );
    }

    #[test]
    fn invalid_address_argument() {
        assert_matches!(
            value_error(run_args(&["ds", "0x00000000000000000000000000000000000001", "X"])),
            CodecError::InvalidAddress(AddressError::BadHexLength(38))
        );
        assert_matches!(
            value_error(run_args(&["ds", "0x0000000000000000000000000000000000000001ff", "X"])),
            CodecError::InvalidAddress(AddressError::BadHexLength(42))
        );
    }

    #[test]
    fn negative_permit_value() {
        assert_matches!(
            value_error(run_args(&["permit", ONE, "X", ONE, TWO, "-5", "0", "1"])),
            CodecError::IntegerOutOfRange(ref value) if value == "-5"
        );
    }

    #[test]
    fn overflowing_permit_value() {
        let too_big =
            "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert_matches!(
            value_error(run_args(&["permit", ONE, "X", ONE, TWO, "1", "0", too_big])),
            CodecError::IntegerOutOfRange(_)
        );

        let max =
            "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        assert!(run_args(&["permit", ONE, "X", ONE, TWO, max, "0", max]).is_ok());
    }

    #[test]
    fn missing_arguments() {
        assert_matches!(
            run_args(&["permit", ONE, "X", ONE, TWO]),
            Err(Error::Usage(ref err)) if err.kind() == ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn typed_data_hash() {
        let path = write_fixture("mail.json", ETHER_MAIL);
        let path = path.to_str().unwrap();

        assert_eq!(
            run_args(&["typed-data-hash", path]).unwrap(),
            "0xbe609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2"
        );
        assert_eq!(
            run_args(&["typed-data-hash", "--struct-hash", path]).unwrap(),
            "0xc52c0ee5d84264471806290a3f2c4cecfc5490626bf912d01f240d7a274b371e"
        );
        assert_eq!(
            run_args(&["type-hash", path]).unwrap(),
            "Mail(Person from,Person to,string contents)Person(string name,address wallet)\n\
             0xa0cedeb2dc280ba39b857546d74f5549c3a1d7bdc2dd96bf881f76108e23dac2"
        );

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn typed_data_errors() {
        let mismatched = ETHER_MAIL.replace(
            r#"{ "name": "wallet", "type": "address" }"#,
            r#"{ "name": "wallet", "type": "Mail" }"#,
        );
        let path = write_fixture("mismatched.json", &mismatched);
        assert_matches!(
            run_args(&["typed-data-hash", path.to_str().unwrap()]),
            Err(Error::TypedData(_))
        );
        std::fs::remove_file(&path).unwrap();

        assert_matches!(
            run_args(&["type-hash", "/nonexistent/eip712-cli/mail.json"]),
            Err(Error::Read { .. })
        );
    }

    #[test]
    #[traced_test]
    fn logs_the_command() {
        run_args(&["ds", ONE, "X"]).unwrap();
        assert!(logs_contain("running command"));
        assert!(logs_contain("domain-separator"));
    }
}
