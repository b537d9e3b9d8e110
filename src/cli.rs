// src/cli.rs
//
// Flag parsing and the per-stage entry points behind the three binaries.

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use log::LevelFilter;

use crate::config::consts::*;
use crate::config::{CrawlOptions, Credentials, MatchOptions, MergeOptions};
use crate::core::backoff::RetryPolicy;
use crate::progress::LogProgress;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Level {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<Level> for LevelFilter {
    fn from(l: Level) -> Self {
        match l {
            Level::Off => LevelFilter::Off,
            Level::Error => LevelFilter::Error,
            Level::Warn => LevelFilter::Warn,
            Level::Info => LevelFilter::Info,
            Level::Debug => LevelFilter::Debug,
            Level::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Args, Debug)]
pub struct Common {
    /// Log verbosity
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: Level,

    /// Also append log lines to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Common {
    fn init_logging(&self) -> Result<()> {
        crate::log::init(self.log_level.into(), self.log_file.as_deref())
            .map_err(|e| color_eyre::eyre::eyre!("logger setup failed: {e}"))
    }
}

/// Merge the Legacy and Modern SCDB case tables into one file.
#[derive(Parser, Debug)]
#[command(name = "merge_scdb", version)]
pub struct MergeArgs {
    /// Legacy-era SCDB table (CSV)
    #[arg(long)]
    pub legacy: PathBuf,

    /// Modern-era SCDB table (CSV)
    #[arg(long)]
    pub modern: PathBuf,

    #[arg(short, long, default_value = MERGED_FILE)]
    pub out: PathBuf,

    #[command(flatten)]
    pub common: Common,
}

/// Crawl Wikipedia SCOTUS case pages: citation, docket and monthly pageviews.
#[derive(Parser, Debug)]
#[command(name = "collect_cases", version)]
pub struct CrawlArgs {
    #[arg(short, long, default_value = WIKI_CASES_FILE)]
    pub out: PathBuf,

    /// Concurrent requests
    #[arg(long, default_value_t = WORKERS)]
    pub workers: usize,

    /// Titles per wikitext request (max 50)
    #[arg(long, default_value_t = CONTENT_BATCH)]
    pub batch: usize,

    /// Attempts per remote call before giving up
    #[arg(long, default_value_t = MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = TIMEOUT_SECS)]
    pub timeout: u64,

    #[command(flatten)]
    pub common: Common,
}

/// Join the merged SCDB table with the crawled wiki cases.
#[derive(Parser, Debug)]
#[command(name = "match_cases", version)]
pub struct MatchArgs {
    #[arg(long, default_value = MERGED_FILE)]
    pub scdb: PathBuf,

    #[arg(long, default_value = WIKI_CASES_FILE)]
    pub wiki: PathBuf,

    #[arg(long, default_value = MATCHED_FILE)]
    pub matched_out: PathBuf,

    #[arg(long, default_value = UNMATCHED_FILE)]
    pub unmatched_out: PathBuf,

    #[command(flatten)]
    pub common: Common,
}

pub fn run_merge(args: MergeArgs) -> Result<()> {
    args.common.init_logging()?;
    let opts = MergeOptions { out: args.out, ..MergeOptions::new(args.legacy, args.modern) };

    let summary = crate::merge::run(&opts).wrap_err("merge failed")?;

    println!("Legacy rows:  {}", summary.legacy_rows);
    println!("Modern rows:  {}", summary.modern_rows);
    println!("Merged rows:  {} ({} columns)", summary.merged_rows, summary.columns);
    println!("Ragged rows:  {}", summary.ragged_rows);
    println!("Output:       {}", opts.out.display());
    Ok(())
}

pub fn run_crawl(args: CrawlArgs) -> Result<()> {
    args.common.init_logging()?;
    let creds = Credentials::from_env().wrap_err("OAuth credentials")?;

    let defaults = CrawlOptions::default().with_env_user_agent();
    let opts = CrawlOptions {
        out: args.out,
        workers: args.workers,
        content_batch: args.batch,
        timeout: std::time::Duration::from_secs(args.timeout),
        retry: RetryPolicy { max_attempts: args.max_attempts, ..defaults.retry.clone() },
        ..defaults
    };

    let mut progress = LogProgress::new(PROGRESS_EVERY);
    let summary = crate::wiki::crawl::run(&opts, creds, Some(&mut progress)).wrap_err("crawl failed")?;

    println!("Pages discovered:     {} ({} duplicates dropped)", summary.discovered, summary.duplicates);
    println!("With citation:        {}", summary.with_cite);
    println!("With docket:          {}", summary.with_docket);
    println!("With neither:         {}", summary.with_neither);
    println!("Content failures:     {}", summary.content_failures);
    println!("Content missing:      {}", summary.content_missing);
    println!("Traffic unavailable:  {}", summary.traffic_unavailable);
    println!("Output:               {}", opts.out.display());
    Ok(())
}

pub fn run_match(args: MatchArgs) -> Result<()> {
    args.common.init_logging()?;
    let opts = MatchOptions {
        scdb: args.scdb,
        wiki: args.wiki,
        matched_out: args.matched_out,
        unmatched_out: args.unmatched_out,
    };

    let summary = crate::matcher::run(&opts).wrap_err("match failed")?;

    println!("Total wiki rows:          {}", summary.wiki_rows);
    println!("Matched SCDB cases:       {} ({} by citation, {} by docket)",
        summary.matched(), summary.by_citation, summary.by_docket);
    println!("Unmatched wiki cases:     {}", summary.unmatched);
    println!("Ambiguous keys:           {}", summary.ambiguous);
    println!("Matched + unmatched sum:  {}", summary.matched() + summary.unmatched);
    if summary.balanced() {
        println!("Sum check passed: matched + unmatched == total wiki rows.");
    } else {
        println!("WARNING: counts do not add up.");
    }
    println!("Matched output:   {}", opts.matched_out.display());
    println!("Unmatched output: {}", opts.unmatched_out.display());
    Ok(())
}
