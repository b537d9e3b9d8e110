// src/wiki/mod.rs
pub mod api;
pub mod crawl;
pub mod infobox;
pub mod traffic;

pub use api::{HttpWikiApi, WikiApi};
pub use crawl::{CrawlSummary, WikiCaseRecord};
