// src/wiki/crawl.rs
//
// Stage 2: discover case pages, extract citation/docket, attach traffic.
//
// Discovery is sequential (cursor pagination). Content batches and
// per-page traffic go through a small worker pool; results come back over
// a channel and are folded into a map keyed by title, so completion order
// never affects the output.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use time::{Date, OffsetDateTime};

use crate::config::consts::WIKI_COLUMNS;
use crate::config::{CrawlOptions, Credentials};
use crate::error::{CrawlError, FetchError};
use crate::file::write_table;
use crate::progress::Progress;
use crate::table::Table;
use crate::wiki::api::{Continuation, HttpWikiApi, WikiApi};
use crate::wiki::infobox::{CaseFields, extract_fields};
use crate::wiki::traffic::{Traffic, YearMonth, early_months, reference_month, rollups};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WikiCaseRecord {
    pub title: String,
    pub us_cite: Option<String>,
    pub docket: Option<String>,
    pub traffic: Traffic,
}

impl WikiCaseRecord {
    /// Cells in WIKI_COLUMNS order.
    pub fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(WIKI_COLUMNS.len());
        row.push(self.title.clone());
        row.push(self.us_cite.clone().unwrap_or_default());
        row.push(self.docket.clone().unwrap_or_default());
        row.extend(self.traffic.cells());
        row
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub discovered: usize,
    pub duplicates: usize,
    pub with_cite: usize,
    pub with_docket: usize,
    pub with_neither: usize,
    pub content_failures: usize,
    /// Titles a successful batch returned no wikitext for.
    pub content_missing: usize,
    pub traffic_unavailable: usize,
}

/// Full crawl against the live wiki, written to `opts.out`.
pub fn run(
    opts: &CrawlOptions,
    creds: Credentials,
    progress: Option<&mut dyn Progress>,
) -> Result<CrawlSummary, CrawlError> {
    opts.validate()?;
    let api = HttpWikiApi::new(opts, creds);
    let today = OffsetDateTime::now_utc().date();

    let (records, summary) = crawl(&api, opts, today, progress)?;
    write_table(&opts.out, &records_to_table(&records))?;
    log::info!("Wrote {} pages to {}", records.len(), opts.out.display());
    Ok(summary)
}

/// Crawl through any `WikiApi`. Records come back sorted by title.
pub fn crawl<A: WikiApi>(
    api: &A,
    opts: &CrawlOptions,
    today: Date,
    mut progress: Option<&mut dyn Progress>,
) -> Result<(Vec<WikiCaseRecord>, CrawlSummary), CrawlError> {
    let mut summary = CrawlSummary::default();

    if let Some(p) = progress.as_deref_mut() {
        p.log("Discovering pages with a SCOTUS case infobox");
    }
    let (titles, duplicates) = discover(api, opts)?;
    summary.discovered = titles.len();
    summary.duplicates = duplicates;
    log::info!("Discovered {} pages ({} duplicates dropped)", titles.len(), duplicates);

    let fields = fetch_fields(api, opts, &titles, &mut summary, reborrow(&mut progress));
    let traffic = fetch_traffic(api, opts, today, &titles, &mut summary, reborrow(&mut progress));

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }

    let mut records: Vec<WikiCaseRecord> = titles
        .into_iter()
        .map(|title| {
            let f = fields.get(&title).cloned().unwrap_or_default();
            let traffic = traffic.get(&title).copied().unwrap_or(Traffic::Unavailable);
            WikiCaseRecord { title, us_cite: f.us_cite, docket: f.docket, traffic }
        })
        .collect();
    records.sort_by(|a, b| a.title.cmp(&b.title));

    for r in &records {
        match (&r.us_cite, &r.docket) {
            (None, None) => summary.with_neither += 1,
            (cite, docket) => {
                summary.with_cite += usize::from(cite.is_some());
                summary.with_docket += usize::from(docket.is_some());
            }
        }
    }
    log::info!(
        "Pages: {} with citation, {} with docket, {} with neither; {} traffic unavailable",
        summary.with_cite, summary.with_docket, summary.with_neither, summary.traffic_unavailable
    );
    Ok((records, summary))
}

/// Short-lived reborrow of an optional progress sink, so it can be handed
/// to one phase and then to the next.
fn reborrow<'a>(progress: &'a mut Option<&mut dyn Progress>) -> Option<&'a mut dyn Progress> {
    progress.as_deref_mut().map(|p| p as &mut dyn Progress)
}

/// Titles embedding any of the configured templates, first-seen order,
/// plus the number of repeats dropped. A cursor the API hands back twice
/// ends that template's listing.
pub fn discover<A: WikiApi>(api: &A, opts: &CrawlOptions) -> Result<(Vec<String>, usize), CrawlError> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut titles = Vec::new();
    let mut duplicates = 0;

    for template in &opts.templates {
        let mut cursor: Option<Continuation> = None;
        let mut cursors: HashSet<Continuation> = HashSet::new();
        let mut pages = 0;
        loop {
            let what = format!("embeddedin {template} (page {})", pages + 1);
            let listing = opts
                .retry
                .run(&what, |_| api.embedded_in(template, cursor.as_ref()))
                .map_err(CrawlError::Discovery)?;
            pages += 1;

            for title in listing.titles {
                if seen.insert(title.clone()) {
                    titles.push(title);
                } else {
                    duplicates += 1;
                }
            }
            match listing.next {
                Some(next) if !cursors.insert(next.clone()) => {
                    log::warn!("{template}: listing returned a cursor it already gave ({:?}); stopping", next.0);
                    break;
                }
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        log::debug!("{template}: {pages} listing page(s)");
    }
    Ok((titles, duplicates))
}

fn fetch_fields<A: WikiApi>(
    api: &A,
    opts: &CrawlOptions,
    titles: &[String],
    summary: &mut CrawlSummary,
    mut progress: Option<&mut dyn Progress>,
) -> HashMap<String, CaseFields> {
    let batches: Vec<&[String]> = titles.chunks(opts.content_batch.max(1)).collect();
    if let Some(p) = progress.as_deref_mut() {
        p.log(&format!("Fetching wikitext in {} batches", batches.len()));
        p.begin(batches.len());
    }

    let mut fields: HashMap<String, CaseFields> = HashMap::with_capacity(titles.len());
    let work = |batch: &&[String]| {
        let what = format!("wikitext batch starting '{}'", batch.first().map(String::as_str).unwrap_or(""));
        opts.retry.run(&what, |_| api.page_contents(batch))
    };

    pool(&batches, opts.workers, work, |i, result| {
        let batch = batches[i];
        let label = batch.first().map(String::as_str).unwrap_or("");
        match result {
            Ok(contents) => {
                let mut missing: Vec<&str> = Vec::new();
                for title in batch {
                    let f = match contents.get(title) {
                        Some(text) => extract_fields(text),
                        None => {
                            missing.push(title);
                            CaseFields::default()
                        }
                    };
                    fields.insert(title.clone(), f);
                }
                if !missing.is_empty() {
                    log::warn!("No wikitext returned for {}: {}", missing.len(), missing.join(" | "));
                    summary.content_missing += missing.len();
                }
                if let Some(p) = progress.as_deref_mut() {
                    p.item_done(label);
                }
            }
            Err(e) => {
                log::warn!("Wikitext batch of {} starting '{label}' failed: {e}", batch.len());
                summary.content_failures += batch.len();
                if let Some(p) = progress.as_deref_mut() {
                    p.item_failed(label);
                }
            }
        }
    });
    fields
}

fn fetch_traffic<A: WikiApi>(
    api: &A,
    opts: &CrawlOptions,
    today: Date,
    titles: &[String],
    summary: &mut CrawlSummary,
    mut progress: Option<&mut dyn Progress>,
) -> HashMap<String, Traffic> {
    let reference = reference_month(today);
    let (y, m) = opts.window_start;
    let start = YearMonth::new(y, m).unwrap_or(YearMonth { year: y, month: 1 });
    let (ry, rm) = opts.reliable_from;
    let reliable = YearMonth::new(ry, rm).unwrap_or(start);

    if let Some(p) = progress.as_deref_mut() {
        p.log(&format!("Fetching monthly pageviews {start} .. {reference}"));
        p.begin(titles.len());
    }

    let mut traffic: HashMap<String, Traffic> = HashMap::with_capacity(titles.len());
    let work = |title: &String| -> Result<Traffic, FetchError> {
        let series = opts
            .retry
            .run(&format!("pageviews '{title}'"), |_| api.monthly_views(title, start, reference))?;
        let early = early_months(&series, reliable);
        if early > 0 {
            log::debug!("'{title}': {early} month(s) of views before {reliable}");
        }
        Ok(Traffic::Available(rollups(&series, reference)))
    };

    pool(titles, opts.workers, work, |i, result| {
        let title = &titles[i];
        let t = match result {
            Ok(t) => {
                if let Some(p) = progress.as_deref_mut() {
                    p.item_done(title);
                }
                t
            }
            Err(e) => {
                log::warn!("Pageviews for '{title}' unavailable: {e}");
                summary.traffic_unavailable += 1;
                if let Some(p) = progress.as_deref_mut() {
                    p.item_failed(title);
                }
                Traffic::Unavailable
            }
        };
        traffic.insert(title.clone(), t);
    });
    traffic
}

/// Run `work` over `items` on up to `workers` threads. `on_result` runs on
/// the calling thread with each item's index, in completion order.
fn pool<T, R, W, F>(items: &[T], workers: usize, work: W, mut on_result: F)
where
    T: Sync,
    R: Send,
    W: Fn(&T) -> R + Sync,
    F: FnMut(usize, R),
{
    if items.is_empty() {
        return;
    }
    let counter = AtomicUsize::new(0);
    let (res_tx, res_rx) = mpsc::channel::<(usize, R)>();
    let workers = workers.min(items.len()).max(1);

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = res_tx.clone();
            let (counter, work) = (&counter, &work);
            scope.spawn(move || loop {
                let i = counter.fetch_add(1, Ordering::Relaxed);
                if i >= items.len() {
                    break;
                }
                if tx.send((i, work(&items[i]))).is_err() {
                    break;
                }
            });
        }
        drop(res_tx); // receiver ends once every worker is done

        for (i, result) in res_rx {
            on_result(i, result);
        }
    });
}

pub fn records_to_table(records: &[WikiCaseRecord]) -> Table {
    let mut table = Table::with_columns(&WIKI_COLUMNS);
    table.rows = records.iter().map(WikiCaseRecord::to_row).collect();
    table
}
