mod cli;
mod setup;

use clap::Parser;
use snafu::{prelude::*, Whatever};

use crate::cli::Arguments;

#[snafu::report]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Whatever> {
    let args = Arguments::parse();
    setup::logger(args.verbosity)?;

    let client = setup::bootstrap(&args).whatever_context("Could not bootstrap application")?;

    let outcome = client
        .run(args.command.into())
        .await
        .whatever_context("Buildtool failed to run")?;

    if outcome.is_fatal() {
        tracing::debug!(code = outcome.code(), "Child process failed");
        std::process::exit(outcome.code());
    }

    Ok(())
}
