//! Main entrypoint for the EIP-712 hashing tool.

#![warn(
    missing_docs,
    clippy::missing_docs_in_private_items,
    clippy::clone_on_ref_ptr
)]

fn main() -> anyhow::Result<()> {
    let cli = match eip712_cli::parse(std::env::args_os()) {
        Ok(cli) => cli,
        Err(eip712_cli::Error::Usage(err)) => err.exit(),
        Err(err) => return Err(err.into()),
    };

    eip712_cli::logger::init(cli.verbose, cli.log_filter.as_deref())?;

    let output = eip712_cli::run(&cli.command)?;
    println!("{output}");
    Ok(())
}
