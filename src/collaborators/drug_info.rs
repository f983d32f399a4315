//! Drug information lookup against the PMDA search pages

use crate::runtime::DrugLookup;
use crate::state_machine::messages::{DRUG_INFO_NOT_FOUND, DRUG_LOOKUP_FAILED};
use crate::state_machine::InfoType;
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Url};
use std::sync::OnceLock;
use std::time::Duration;

/// Longest excerpt sent back to the user, in characters
const MAX_EXCERPT_CHARS: usize = 500;

/// Section headings that end an excerpt
const SECTION_HEADINGS: &[&str] = &[
    "効能・効果",
    "効能又は効果",
    "用法・用量",
    "用法及び用量",
    "使用上の注意",
    "副作用",
    "相互作用",
    "禁忌",
    "保管",
];

fn headings_for(info_type: InfoType) -> &'static [&'static str] {
    match info_type {
        InfoType::SideEffects => &["副作用"],
        InfoType::Usage => &["用法・用量", "用法及び用量", "使用方法", "使い方"],
    }
}

pub struct PmdaDrugLookup {
    client: Client,
    search_url: String,
}

impl PmdaDrugLookup {
    pub fn new(search_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, search_url })
    }

    async fn fetch(&self, source_url: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(source_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl DrugLookup for PmdaDrugLookup {
    async fn lookup(&self, drug_name: &str, info_type: InfoType, source_url: &str) -> String {
        tracing::info!(drug_name, info_type = %info_type, "Looking up drug information");

        let html = match self.fetch(source_url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::error!(error = %e, source_url, "Drug record fetch failed");
                return DRUG_LOOKUP_FAILED.to_string();
            }
        };

        match extract_section(&html, info_type) {
            Some(excerpt) => format!(
                "{drug_name}の{info_type}について:\n{excerpt}\n\n詳しくはこちら: {source_url}"
            ),
            None => {
                tracing::warn!(drug_name, info_type = %info_type, "Section not found in drug record");
                DRUG_INFO_NOT_FOUND.to_string()
            }
        }
    }

    fn source_url(&self, drug_name: &str) -> String {
        Url::parse_with_params(&self.search_url, &[("keyword", drug_name)]).map_or_else(
            |_| format!("{}?keyword={drug_name}", self.search_url),
            |url| url.to_string(),
        )
    }
}

// ============================================================================
// Extraction
// ============================================================================

fn script_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>").expect("valid regex")
    })
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"))
}

/// Visible text of an HTML page, one non-empty line per block
fn html_to_text(html: &str) -> String {
    let without_scripts = script_pattern().replace_all(html, " ");
    let without_tags = tag_pattern().replace_all(&without_scripts, "\n");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&");

    decoded
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text following the first heading for `info_type`, up to the next section
pub fn extract_section(html: &str, info_type: InfoType) -> Option<String> {
    let text = html_to_text(html);
    let wanted = headings_for(info_type);

    let rest = wanted
        .iter()
        .find_map(|heading| text.split_once(heading).map(|(_, rest)| rest))?;

    let section = SECTION_HEADINGS
        .iter()
        .filter(|h| !wanted.contains(*h))
        .filter_map(|h| rest.split_once(h).map(|(before, _)| before))
        .min_by_key(|before| before.len())
        .unwrap_or(rest);

    let section = section.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '：' | '】'));
    let excerpt: String = section.trim().chars().take(MAX_EXCERPT_CHARS).collect();

    if excerpt.is_empty() {
        None
    } else {
        Some(excerpt)
    }
}
