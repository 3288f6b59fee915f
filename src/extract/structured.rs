//! JSON-LD metadata embedded in deal pages
//!
//! Forum-style deal sites publish one `DiscussionForumPosting` per thread,
//! either as the top-level object, inside a top-level array, or inside an
//! `@graph` list. Scripts that fail to parse are skipped.

use super::dates::parse_iso;
use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

const POSTING_TYPE: &str = "DiscussionForumPosting";

fn thread_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)/?$").expect("thread id regex is valid"))
}

/// Returns the numeric thread id at the end of a thread URL
///
/// `https://www.dealabs.com/bons-plans/lego-technic-42096-2712345` gives
/// `"2712345"`.
pub fn thread_id(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    thread_id_re()
        .captures(path)
        .map(|caps| caps[1].to_string())
}

/// Parsed JSON-LD blocks of a document
#[derive(Debug, Default)]
pub struct StructuredData {
    postings: Vec<Value>,
}

impl StructuredData {
    /// Collects every forum posting from the document's JSON-LD scripts
    pub fn from_document(document: &Html) -> Self {
        let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
            return Self::default();
        };

        let mut postings = Vec::new();
        for script in document.select(&selector) {
            let raw: String = script.text().collect();
            match serde_json::from_str::<Value>(&raw) {
                Ok(value) => collect_postings(value, &mut postings),
                Err(e) => tracing::debug!("Skipping unparseable JSON-LD block: {}", e),
            }
        }

        Self { postings }
    }

    /// Maps thread ids to their publication timestamps
    pub fn thread_dates(&self) -> HashMap<String, DateTime<Utc>> {
        self.postings
            .iter()
            .filter_map(|posting| {
                let id = thread_id(posting.get("url")?.as_str()?)?;
                let published = parse_iso(posting.get("datePublished")?.as_str()?)?;
                Some((id, published))
            })
            .collect()
    }

    /// Publication timestamp of the first posting
    pub fn published_date(&self) -> Option<DateTime<Utc>> {
        self.postings
            .iter()
            .find_map(|posting| parse_iso(posting.get("datePublished")?.as_str()?))
    }

    /// Comment count declared by the first posting's interaction statistics
    pub fn comment_count(&self) -> Option<i64> {
        self.postings.iter().find_map(comment_statistic)
    }
}

fn collect_postings(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_postings(item, out);
            }
        }
        Value::Object(mut map) => {
            if let Some(graph) = map.remove("@graph") {
                collect_postings(graph, out);
            }
            if map.get("@type").and_then(Value::as_str) == Some(POSTING_TYPE) {
                out.push(Value::Object(map));
            }
        }
        _ => {}
    }
}

fn comment_statistic(posting: &Value) -> Option<i64> {
    let stats = match posting.get("interactionStatistic")? {
        Value::Array(items) => items.iter().collect::<Vec<_>>(),
        single => vec![single],
    };

    stats.into_iter().find_map(|stat| {
        let kind = match stat.get("interactionType")? {
            Value::String(s) => s.as_str(),
            other => other.get("@type")?.as_str()?,
        };
        if !kind.ends_with("CommentAction") {
            return None;
        }
        match stat.get("userInteractionCount")? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    })
}
