// src/bin/collect_cases.rs
use clap::Parser;
use scotus_salience::cli::{self, CrawlArgs};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    cli::run_crawl(CrawlArgs::parse())
}
