use anyhow::Context;
use clap::Parser;
use ocean_extrema::cli::{run, Cli};
use ocean_extrema::utils::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref()).context("logging setup failed")?;
    run(cli).context("ocean-extrema failed")
}
