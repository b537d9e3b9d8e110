// src/bin/merge_scdb.rs
use clap::Parser;
use scotus_salience::cli::{self, MergeArgs};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    cli::run_merge(MergeArgs::parse())
}
