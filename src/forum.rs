use chrono::{Local, NaiveDate};
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::config::ScraperConfig;
use crate::constants::{FORUM_SOURCE_TAG, KNOWN_BRANDS, SYMPTOM_KEYWORDS};
use crate::error::{CatalogError, Result};
use crate::types::{Catalog, ProblemRecord};

static THREAD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.structItem--thread").expect("valid thread selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.structItem-title a").expect("valid title selector"));
// OBD-II trouble codes: system letter, then four hex digits with the first in 0-3.
static ERROR_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b[PBCU][0-3][0-9A-F]{3}\b").expect("valid error code regex"));

/// Builds problem records from the latest threads of a car forum section.
pub struct ForumScraper {
    client: reqwest::Client,
    config: ScraperConfig,
}

impl ForumScraper {
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }

    #[instrument(skip(self), fields(url = %self.config.forum_url))]
    pub async fn fetch_listing(&self) -> Result<String> {
        let response = self.client.get(&self.config.forum_url).send().await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status {
                url: self.config.forum_url.clone(),
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        debug!("Fetched {} bytes of forum HTML", body.len());
        Ok(body)
    }

    /// Fetches the listing and extracts today's problem records.
    pub async fn scrape(&self) -> Result<Catalog> {
        let html = self.fetch_listing().await?;
        let today = Local::now().date_naive();
        let records = parse_listing(&html, &self.config.base_url, self.config.limit, today);
        counter!("forum_problems_scraped_total").increment(records.len() as u64);
        info!("Scraped {} problem records from forum", records.len());
        Ok(records)
    }
}

/// Extracts problem records from a forum listing page.
///
/// Only the first `limit` threads are considered. Threads without a title
/// link, or whose title mentions no known symptom, are skipped.
pub fn parse_listing(html: &str, base_url: &str, limit: usize, date_added: NaiveDate) -> Catalog {
    let document = Html::parse_document(html);
    let mut records = Vec::new();

    for thread in document.select(&THREAD_SELECTOR).take(limit) {
        let Some(title_elem) = thread.select(&TITLE_SELECTOR).next() else {
            continue;
        };
        let title = title_elem.text().collect::<String>().trim().to_string();
        let Some(href) = title_elem.value().attr("href") else {
            debug!("Skipping thread without link: {}", title);
            continue;
        };
        let link = absolute_link(base_url, href);

        let symptoms = detect_symptoms(&title);
        if symptoms.is_empty() {
            debug!("No known symptom in thread title: {}", title);
            continue;
        }

        records.push(ProblemRecord {
            id: link.clone(),
            brand: detect_brand(&title),
            model: String::new(),
            symptoms,
            error_codes: extract_error_codes(&title),
            source_url: link,
            source: FORUM_SOURCE_TAG.to_string(),
            date_added: Some(date_added.format("%Y-%m-%d").to_string()),
            title,
        });
    }

    records
}

/// Symptom keywords found in the title, in keyword order.
pub fn detect_symptoms(title: &str) -> Vec<String> {
    let lower = title.to_lowercase();
    SYMPTOM_KEYWORDS
        .iter()
        .filter(|keyword| lower.contains(*keyword))
        .map(|keyword| keyword.to_string())
        .collect()
}

/// First known brand mentioned in the title, upper-cased; empty if none.
pub fn detect_brand(title: &str) -> String {
    let lower = title.to_lowercase();
    KNOWN_BRANDS
        .iter()
        .find(|brand| lower.contains(*brand))
        .map(|brand| brand.to_uppercase())
        .unwrap_or_default()
}

/// Diagnostic trouble codes in the title, upper-cased, first occurrence kept.
pub fn extract_error_codes(title: &str) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for m in ERROR_CODE_RE.find_iter(title) {
        let code = m.as_str().to_uppercase();
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes
}

fn absolute_link(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{base}{href}")
    } else {
        format!("{base}/{href}")
    }
}
