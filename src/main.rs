use anyhow::Result;
use clap::Parser;
use pyconsole::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    pyconsole::run(args).await
}
