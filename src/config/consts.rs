// src/config/consts.rs

// Stage outputs (downstream stages read these names)
pub const MERGED_FILE: &str = "SCDB_merged.csv";
pub const WIKI_CASES_FILE: &str = "wiki_infobox_cases.csv";
pub const MATCHED_FILE: &str = "SCDB_with_infobox_views.csv";
pub const UNMATCHED_FILE: &str = "unmatched_wiki_cases.csv";

// SCDB columns
pub const SCDB_CITE_COL: &str = "usCite";
pub const SCDB_DOCKET_COL: &str = "docket";
pub const SCDB_DATE_COL: &str = "dateDecision";
pub const SCDB_TERM_COL: &str = "term";

// Wiki case table columns, in file order
pub const WIKI_COLUMNS: [&str; 7] = [
    "title",
    "usCite",
    "docket",
    "views_all_time",
    "views_1yr",
    "views_6mo",
    "views_1mo",
];
pub const VIEW_COLUMNS: [&str; 4] = ["views_all_time", "views_1yr", "views_6mo", "views_1mo"];

/// Written in all four view columns when traffic could not be fetched.
pub const UNAVAILABLE: &str = "unavailable";

// Net config
pub const API_URL: &str = "https://en.wikipedia.org/w/api.php";
pub const PAGEVIEWS_URL: &str =
    "https://wikimedia.org/api/rest_v1/metrics/pageviews/per-article/en.wikipedia/all-access/user";
pub const USER_AGENT: &str = "scotus_salience/0.1 (SCOTUS infobox crawler; set WIKI_USER_AGENT to add contact info)";
pub const USER_AGENT_ENV: &str = "WIKI_USER_AGENT";
pub const TIMEOUT_SECS: u64 = 25;

pub const INFOBOX_TEMPLATES: [&str; 2] = [
    "Template:Infobox SCOTUS case",
    "Template:Infobox US Supreme Court case",
];

// Pageview window: requested from WINDOW_START; the metrics API only
// has reliable data from RELIABLE_FROM onward.
pub const WINDOW_START: (i32, u8) = (2008, 1);
pub const RELIABLE_FROM: (i32, u8) = (2015, 7);

// Crawl
pub const CONTENT_BATCH: usize = 50;
pub const WORKERS: usize = 8;
pub const PROGRESS_EVERY: usize = 250;

// Throttle (adaptive pause before each request)
pub const REQUEST_PAUSE_MS: u64 = 30;
pub const PAUSE_FLOOR_MS: u64 = 20;
pub const PAUSE_CEILING_MS: u64 = 1_000;

// Retry
pub const MAX_ATTEMPTS: u32 = 5;
pub const BACKOFF_BASE_MS: u64 = 200;
pub const BACKOFF_MAX_MS: u64 = 10_000;
pub const JITTER_PERCENT: u64 = 10;
