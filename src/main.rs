//! `gtn` scaffolds Galaxy training topics and tutorials.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
