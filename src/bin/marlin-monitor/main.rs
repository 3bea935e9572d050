use clap::Parser;
use miette::{Context as _, IntoDiagnostic, Result};

use marlin_monitor::{
    client::HttpTransport, config::Config, monitor, render::OutputFormat, sort::Order,
};

mod common;

const COLUMNS_HELP: &str = "\
Column Index Reference (use with -f / --filter):

  0  - Operator           : Name of the operator node
  1  - Network            : Network connected (mainnet/testnet)
  2  - Address            : Operator address
  3  - Total Staked POND  : Combined stake (POND + MPond)
  4  - Staked POND        : Amount of POND staked
  5  - Staked MPond       : Amount of MPond staked
  6  - Relayers           : Number of active relayers
  7  - Fee (%)            : Commission fee set by operator
  8  - Performance        : Node performance score (lower is better)
  9  - Tickets            : Number of ticket participations
 10  - APR MPond (%)      : Estimated MPond annual reward rate
 11  - APR POND (%)       : Estimated POND annual reward rate

Columns 3, 4 and 5 all rank by the combined stake, one MPond counting as
1,000,000 POND.";

#[derive(Debug, Parser)]
#[clap(name = "MarlinOperatorMonitor")]
#[clap(bin_name = "marlin-monitor")]
#[clap(author, version, about = "View and sort staking stats from Marlin operators", long_about = None)]
#[clap(after_help = COLUMNS_HELP)]
struct Cli {
    /// Column index to sort by (see reference below) [default: 3]
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=11))]
    filter: Option<u8>,

    /// Sort order [default: desc]
    #[arg(short, long, value_enum)]
    order: Option<Order>,

    /// Output format [default: table]
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Explicit config file
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let config = Config::new(&args.config).into_diagnostic()?;

    common::setup_tracing(&config.logging)?;

    let view = config
        .display
        .view(args.filter.map(usize::from), args.order, args.format)
        .into_diagnostic()?;

    let transport = HttpTransport::new()
        .into_diagnostic()
        .context("building http client")?;

    let output = monitor::run(&transport, &view)?;

    println!("{}", output.trim_end());

    Ok(())
}
