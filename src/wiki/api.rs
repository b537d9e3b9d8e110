// src/wiki/api.rs
//
// What the crawler needs from the outside world, and the HTTP version of it.
//
// - `embedded_in`: one page of titles transcluding a template, plus a cursor.
// - `page_contents`: raw wikitext for a batch of titles.
// - `monthly_views`: {month: views} for one title; months with no data are absent.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::Value;

use crate::config::{CrawlOptions, Credentials};
use crate::core::net::HttpClient;
use crate::core::sanitize::title_to_path_segment;
use crate::error::FetchError;
use crate::wiki::traffic::{MonthlySeries, YearMonth};

/// Opaque continuation parameters echoed back on the next call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Continuation(pub Vec<(String, String)>);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageListing {
    pub titles: Vec<String>,
    pub next: Option<Continuation>,
}

pub trait WikiApi: Sync {
    fn embedded_in(
        &self,
        template: &str,
        cursor: Option<&Continuation>,
    ) -> Result<PageListing, FetchError>;

    /// Title → wikitext. Titles the wiki does not know are left out.
    fn page_contents(&self, titles: &[String]) -> Result<HashMap<String, String>, FetchError>;

    fn monthly_views(
        &self,
        title: &str,
        start: YearMonth,
        end: YearMonth,
    ) -> Result<MonthlySeries, FetchError>;
}

pub struct HttpWikiApi {
    client: HttpClient,
    api_url: String,
    pageviews_url: String,
}

impl HttpWikiApi {
    pub fn new(opts: &CrawlOptions, creds: Credentials) -> Self {
        Self {
            client: HttpClient::new(creds, &opts.user_agent, opts.timeout, opts.pause),
            api_url: opts.api_url.clone(),
            pageviews_url: opts.pageviews_url.trim_end_matches('/').to_string(),
        }
    }

    fn query(&self, params: Vec<(String, String)>) -> Result<String, FetchError> {
        self.client.get(&self.api_url, &params)
    }
}

impl WikiApi for HttpWikiApi {
    fn embedded_in(
        &self,
        template: &str,
        cursor: Option<&Continuation>,
    ) -> Result<PageListing, FetchError> {
        let mut params = vec![
            (s!("action"), s!("query")),
            (s!("list"), s!("embeddedin")),
            (s!("eititle"), s!(template)),
            (s!("einamespace"), s!("0")),
            (s!("eilimit"), s!("max")),
            (s!("format"), s!("json")),
            (s!("formatversion"), s!("2")),
        ];
        if let Some(c) = cursor {
            params.extend(c.0.iter().cloned());
        }
        parse_embedded_in(&self.query(params)?)
    }

    fn page_contents(&self, titles: &[String]) -> Result<HashMap<String, String>, FetchError> {
        if titles.is_empty() {
            return Ok(HashMap::new());
        }
        let params = vec![
            (s!("action"), s!("query")),
            (s!("prop"), s!("revisions")),
            (s!("rvprop"), s!("content")),
            (s!("rvslots"), s!("main")),
            (s!("titles"), titles.join("|")),
            (s!("format"), s!("json")),
            (s!("formatversion"), s!("2")),
        ];

        // Large batches can exceed the response size cap; the rest of the
        // revisions come back under `rvcontinue`.
        let mut out = HashMap::with_capacity(titles.len());
        let mut cursor: Option<Continuation> = None;
        let mut cursors: HashSet<Continuation> = HashSet::new();
        loop {
            let mut request = params.clone();
            if let Some(c) = &cursor {
                request.extend(c.0.iter().cloned());
            }
            let (texts, next) = parse_page_contents(&self.query(request)?)?;
            for (title, text) in texts {
                out.entry(title).or_insert(text);
            }
            match next {
                Some(next) if !cursors.insert(next.clone()) => {
                    log::warn!("Revision batch returned a repeated cursor ({:?}); stopping", next.0);
                    break;
                }
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(out)
    }

    fn monthly_views(
        &self,
        title: &str,
        start: YearMonth,
        end: YearMonth,
    ) -> Result<MonthlySeries, FetchError> {
        let url = format!(
            "{}/{}/monthly/{}/{}",
            self.pageviews_url,
            title_to_path_segment(title),
            start.api_timestamp(),
            end.api_timestamp()
        );
        match self.client.get(&url, &[]) {
            Ok(body) => parse_pageviews(&body),
            // No data for this article in the requested range
            Err(FetchError::Status(404)) => Ok(MonthlySeries::new()),
            Err(e) => Err(e),
        }
    }
}

/* ---------------- Response shapes ---------------- */

#[derive(Deserialize)]
struct QueryEnvelope<T> {
    query: Option<T>,
    #[serde(rename = "continue", default)]
    cont: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Deserialize)]
struct EmbeddedIn {
    #[serde(default)]
    embeddedin: Vec<PageRef>,
}

#[derive(Deserialize)]
struct PageRef {
    title: String,
}

#[derive(Deserialize)]
struct RevisionPages {
    #[serde(default)]
    normalized: Vec<Normalized>,
    #[serde(default)]
    pages: Vec<PageContent>,
}

#[derive(Deserialize)]
struct Normalized {
    from: String,
    to: String,
}

#[derive(Deserialize)]
struct PageContent {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    revisions: Vec<Revision>,
}

#[derive(Deserialize)]
struct Revision {
    #[serde(default)]
    slots: Option<Slots>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Slots {
    #[serde(default)]
    main: Option<Slot>,
}

#[derive(Deserialize)]
struct Slot {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct PageviewItems {
    #[serde(default)]
    items: Vec<PageviewItem>,
}

#[derive(Deserialize)]
struct PageviewItem {
    timestamp: String,
    views: u64,
}

fn decode<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
}

fn check_api_error(error: Option<ApiError>) -> Result<(), FetchError> {
    match error {
        None => Ok(()),
        Some(e) if e.code == "maxlag" || e.code == "ratelimited" => Err(FetchError::RateLimited),
        Some(e) => Err(FetchError::Decode(format!("API error {}: {}", e.code, e.info))),
    }
}

pub fn parse_embedded_in(body: &str) -> Result<PageListing, FetchError> {
    let env: QueryEnvelope<EmbeddedIn> = decode(body)?;
    check_api_error(env.error)?;

    let titles = env
        .query
        .map(|q| q.embeddedin.into_iter().map(|p| p.title).collect())
        .unwrap_or_default();

    Ok(PageListing { titles, next: env.cont.map(continuation) })
}

fn continuation(map: serde_json::Map<String, Value>) -> Continuation {
    Continuation(
        map.into_iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, v)
            })
            .collect(),
    )
}

/// Title → wikitext for one response, plus the cursor for revisions the
/// response did not have room for.
pub fn parse_page_contents(
    body: &str,
) -> Result<(HashMap<String, String>, Option<Continuation>), FetchError> {
    let env: QueryEnvelope<RevisionPages> = decode(body)?;
    check_api_error(env.error)?;
    let next = env.cont.map(continuation);
    let Some(query) = env.query else {
        return Ok((HashMap::new(), next));
    };

    // Report content under the title the caller asked for
    let back: HashMap<String, String> =
        query.normalized.into_iter().map(|n| (n.to, n.from)).collect();

    let mut out = HashMap::new();
    for page in query.pages {
        if page.missing {
            continue;
        }
        let text = page.revisions.into_iter().next().and_then(|r| {
            r.slots.and_then(|s| s.main).and_then(|m| m.content).or(r.content)
        });
        if let Some(text) = text {
            let title = back.get(&page.title).cloned().unwrap_or(page.title);
            out.insert(title, text);
        }
    }
    Ok((out, next))
}

pub fn parse_pageviews(body: &str) -> Result<MonthlySeries, FetchError> {
    let parsed: PageviewItems = decode(body)?;
    let mut series = MonthlySeries::new();
    for item in parsed.items {
        match YearMonth::parse_timestamp(&item.timestamp) {
            Some(month) => *series.entry(month).or_insert(0) += item.views,
            None => log::debug!("Skipping pageview item with timestamp '{}'", item.timestamp),
        }
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_in_with_continuation() {
        let body = r#"{
            "batchcomplete": true,
            "continue": {"eicontinue": "0|12345", "continue": "-||"},
            "query": {"embeddedin": [
                {"pageid": 1, "ns": 0, "title": "Roe v. Wade"},
                {"pageid": 2, "ns": 0, "title": "Marbury v. Madison"}
            ]}
        }"#;
        let listing = parse_embedded_in(body).unwrap();
        assert_eq!(listing.titles, vec!["Roe v. Wade", "Marbury v. Madison"]);
        let next = listing.next.unwrap();
        assert!(next.0.contains(&(s!("eicontinue"), s!("0|12345"))));
        assert!(next.0.contains(&(s!("continue"), s!("-||"))));
    }

    #[test]
    fn embedded_in_last_page_has_no_cursor() {
        let body = r#"{"batchcomplete": true, "query": {"embeddedin": []}}"#;
        let listing = parse_embedded_in(body).unwrap();
        assert!(listing.titles.is_empty());
        assert!(listing.next.is_none());
    }

    #[test]
    fn api_error_maxlag_is_rate_limit() {
        let body = r#"{"error": {"code": "maxlag", "info": "Waiting for replicas"}}"#;
        assert_eq!(parse_embedded_in(body), Err(FetchError::RateLimited));
    }

    #[test]
    fn contents_from_slots_and_legacy_shape() {
        let body = r#"{"query": {
            "normalized": [{"fromencoded": false, "from": "roe v. Wade", "to": "Roe v. Wade"}],
            "pages": [
                {"pageid": 1, "title": "Roe v. Wade",
                 "revisions": [{"slots": {"main": {"contentmodel": "wikitext", "content": "{{Infobox SCOTUS case}}"}}}]},
                {"pageid": 2, "title": "Old Shape", "revisions": [{"content": "legacy"}]},
                {"title": "Nope", "missing": true}
            ]
        }}"#;
        let (map, next) = parse_page_contents(body).unwrap();
        assert!(next.is_none());
        assert_eq!(map.get("roe v. Wade").map(|s| s.as_str()), Some("{{Infobox SCOTUS case}}"));
        assert_eq!(map.get("Old Shape").map(|s| s.as_str()), Some("legacy"));
        assert!(!map.contains_key("Nope"));
    }

    #[test]
    fn truncated_revisions_carry_a_cursor() {
        let body = r#"{
            "continue": {"rvcontinue": "58224|1184939452", "continue": "||"},
            "query": {"pages": [
                {"pageid": 1, "title": "Roe v. Wade", "revisions": [{"slots": {"main": {"content": "roe"}}}]},
                {"pageid": 2, "title": "Brown v. Board of Education"}
            ]}
        }"#;
        let (map, next) = parse_page_contents(body).unwrap();
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key("Brown v. Board of Education"));
        let next = next.unwrap();
        assert!(next.0.contains(&(s!("rvcontinue"), s!("58224|1184939452"))));
    }

    #[test]
    fn pageviews_items_to_series() {
        let body = r#"{"items": [
            {"project": "en.wikipedia", "article": "Roe_v._Wade", "granularity": "monthly",
             "timestamp": "2015070100", "access": "all-access", "agent": "user", "views": 120},
            {"timestamp": "2015080100", "views": 80}
        ]}"#;
        let s = parse_pageviews(body).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.get(&YearMonth::new(2015, 7).unwrap()), Some(&120));
    }
}
