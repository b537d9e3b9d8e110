// src/wiki/infobox.rs
//
// Locate the case infobox in raw wikitext and pull out the U.S. Reports
// citation and the docket number. Everything here is best effort: a page
// without an infobox, or an infobox without either field, yields `None`s.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::sanitize::{normalize_dashes, normalize_entities, normalize_ws};

static INFOBOX_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\{\{\s*(?:Infobox\s+US\s+Supreme\s+Court\s+case|Infobox\s+SCOTUS\s+case|SCOTUSCase)",
    )
    .expect("infobox start pattern")
});

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern"));
static USSC_TEMPLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\{\{\s*ussc\s*\|\s*(\d+)\s*\|\s*(\d+)[^{}]*\}\}").expect("ussc pattern")
});
static EXTERNAL_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[https?://[^\]\s]*(?:\s+[^\]]+)?\]").expect("external link pattern")
});
static WIKILINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[(?:[^\]|]+\|)?([^\]]+)\]\]").expect("wikilink pattern")
});
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^<>]*>").expect("html tag pattern"));

static US_CITE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*U\.?\s*S\.?\s*(\d+)\b").expect("citation pattern")
});
static DOCKET_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:No\.?\s*)?(\d{1,3}[-\u{2010}-\u{2015}\u{2212}]\d{1,5}|\d{1,3}[A-Z]\d{1,4})\b",
    )
    .expect("docket pattern")
});
static DOCKET_OR_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:No\.?\s*)?(\d{1,3}[-\u{2010}-\u{2015}\u{2212}]\d{1,5}|\d{1,3}[A-Z]\d{1,4}|\d{1,5})\b",
    )
    .expect("docket or number pattern")
});
static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digits pattern"));

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaseFields {
    pub us_cite: Option<String>,
    pub docket: Option<String>,
}

impl CaseFields {
    pub fn is_empty(&self) -> bool {
        self.us_cite.is_none() && self.docket.is_none()
    }
}

/// Citation and docket from a page's wikitext, scoped to the infobox.
pub fn extract_fields(wikitext: &str) -> CaseFields {
    match find_infobox(wikitext) {
        Some(block) => fields_from_infobox(block),
        None => CaseFields::default(),
    }
}

/// The first case infobox, from its opening `{{` to the matching `}}`.
/// An unterminated box runs to the end of the text.
pub fn find_infobox(text: &str) -> Option<&str> {
    let start = INFOBOX_START.find(text)?.start();
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = start;
    while i + 1 < bytes.len() {
        match &bytes[i..i + 2] {
            b"{{" => {
                depth += 1;
                i += 2;
            }
            b"}}" => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return Some(&text[start..i]);
                }
            }
            _ => i += 1,
        }
    }
    Some(&text[start..])
}

/// Strip the markup that hides field values from the patterns.
pub fn clean_markup(text: &str) -> String {
    let t = COMMENT.replace_all(text, "");
    let t = USSC_TEMPLATE.replace_all(&t, "$1 U.S. $2");
    let t = EXTERNAL_LINK.replace_all(&t, "");
    let t = WIKILINK.replace_all(&t, "$1");
    let t = HTML_TAG.replace_all(&t, " ");
    normalize_entities(&t)
}

/// Named parameters of a template block as (lowercased key, value).
/// Splits on `|` outside nested templates and links; unnamed parameters
/// and the template name are skipped.
pub fn template_params(block: &str) -> Vec<(String, String)> {
    let inner = block.strip_prefix("{{").unwrap_or(block);
    let inner = inner.strip_suffix("}}").unwrap_or(inner);

    let mut parts: Vec<&str> = Vec::new();
    let bytes = inner.as_bytes();
    let (mut braces, mut brackets) = (0usize, 0usize);
    let mut last = 0;
    let mut i = 0;
    while i < bytes.len() {
        let pair = bytes.get(i..i + 2);
        match pair {
            Some(b"{{") => { braces += 1; i += 2; continue; }
            Some(b"}}") => { braces = braces.saturating_sub(1); i += 2; continue; }
            Some(b"[[") => { brackets += 1; i += 2; continue; }
            Some(b"]]") => { brackets = brackets.saturating_sub(1); i += 2; continue; }
            _ => {}
        }
        if bytes[i] == b'|' && braces == 0 && brackets == 0 {
            parts.push(&inner[last..i]);
            last = i + 1;
        }
        i += 1;
    }
    parts.push(&inner[last..]);

    parts
        .into_iter()
        .skip(1)
        .filter_map(|p| {
            let (k, v) = p.split_once('=')?;
            let key: String = k
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '_')
                .flat_map(char::to_lowercase)
                .collect();
            Some((key, s!(v.trim())))
        })
        .collect()
}

fn fields_from_infobox(block: &str) -> CaseFields {
    let cleaned = clean_markup(block);
    let params = template_params(&cleaned);
    let param = |name: &str| params.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str());

    let mut fields = CaseFields::default();

    if let Some(citations) = param("citations") {
        fields.us_cite = find_us_cite(citations);
        fields.docket = find_docket(citations, &DOCKET_TOKEN);
    }

    if fields.us_cite.is_none() {
        let first_digits = |v: &str| DIGITS.find(v).map(|m| m.as_str().to_string());
        if let (Some(vol), Some(page)) = (
            param("usvol").and_then(first_digits),
            param("uspage").and_then(first_digits),
        ) {
            fields.us_cite = Some(format!("{vol} U.S. {page}"));
        }
    }

    if fields.docket.is_none() {
        fields.docket = param("docket").and_then(|d| find_docket(d, &DOCKET_OR_NUMBER));
    }

    fields
}

/// First "<vol> U.S. <page>" in `text`, rewritten in canonical spacing.
pub fn find_us_cite(text: &str) -> Option<String> {
    let caps = US_CITE.captures(text)?;
    Some(format!("{} U.S. {}", &caps[1], &caps[2]))
}

fn find_docket(text: &str, pattern: &Regex) -> Option<String> {
    let caps = pattern.captures(text)?;
    Some(normalize_ws(&normalize_dashes(&caps[1])))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROE: &str = r#"'''Roe v. Wade''' was a landmark decision.
{{Infobox SCOTUS case
| Litigants = Roe v. Wade
| ArgueDate = December 13
| DecideYear = 1973
| FullName = Jane Roe, ''et al.'' v. Henry Wade, District Attorney of Dallas County
| USVol = 410
| USPage = 113
| ParallelCitations = 93 [[S. Ct.]] 705; 35 [[L. Ed. 2d]] 147
| Docket = 70-18
| Holding = {{small|A woman's right}} to [[abortion|choose]].
}}
Later the Court decided 505 U.S. 833."#;

    #[test]
    fn finds_infobox_by_brace_depth() {
        let block = find_infobox(ROE).unwrap();
        assert!(block.starts_with("{{Infobox SCOTUS case"));
        assert!(block.ends_with("}}"));
        assert!(!block.contains("505 U.S. 833"));
    }

    #[test]
    fn vol_page_and_docket() {
        let f = extract_fields(ROE);
        assert_eq!(f.us_cite.as_deref(), Some("410 U.S. 113"));
        assert_eq!(f.docket.as_deref(), Some("70-18"));
    }

    #[test]
    fn citations_field_wins_and_is_canonicalized() {
        let text = "{{Infobox US Supreme Court case\n\
            | citations = {{ussc|347|483|1954}}; 74 S. Ct. 686; No. 1\u{2013}8\n\
            | USVol = 999\n| USPage = 1\n| docket = 12-345\n}}";
        let f = extract_fields(text);
        assert_eq!(f.us_cite.as_deref(), Some("347 U.S. 483"));
        assert_eq!(f.docket.as_deref(), Some("1-8"));
    }

    #[test]
    fn spaced_citation_and_lettered_docket() {
        let f = extract_fields("{{SCOTUSCase|citations=1 U. S. 2|docket=No. 22O141}}");
        assert_eq!(f.us_cite.as_deref(), Some("1 U.S. 2"));
        assert_eq!(f.docket.as_deref(), Some("22O141"));
    }

    #[test]
    fn bare_docket_number_only_from_docket_field() {
        let f = extract_fields("{{Infobox SCOTUS case\n| citations = 5 Cranch 87\n| docket = 1812\n}}");
        assert_eq!(f.us_cite, None);
        assert_eq!(f.docket.as_deref(), Some("1812"));
    }

    #[test]
    fn placeholder_volume_is_not_a_citation() {
        let f = extract_fields("{{Infobox SCOTUS case\n| USVol = 592\n| USPage = ___\n| Docket = 19-1392\n}}");
        assert_eq!(f.us_cite, None);
        assert_eq!(f.docket.as_deref(), Some("19-1392"));
    }

    #[test]
    fn no_infobox_yields_nothing() {
        let f = extract_fields("A page that mentions 410 U.S. 113 in prose only.");
        assert!(f.is_empty());
    }

    #[test]
    fn markup_is_cleaned() {
        let t = clean_markup("[[Roe v. Wade|Roe]] <ref>x</ref> [https://example.org site]<!-- c -->&amp;");
        assert_eq!(t.split_whitespace().collect::<Vec<_>>(), vec!["Roe", "x", "&"]);
    }

    #[test]
    fn params_ignore_pipes_in_nested_markup() {
        let p = template_params("{{Box| a = {{x|y}} | B_c = [[l|m]] |unnamed}}");
        assert_eq!(p, vec![(s!("a"), s!("{{x|y}}")), (s!("bc"), s!("[[l|m]]"))]);
    }
}
