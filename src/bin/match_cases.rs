// src/bin/match_cases.rs
use clap::Parser;
use scotus_salience::cli::{self, MatchArgs};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    cli::run_match(MatchArgs::parse())
}
