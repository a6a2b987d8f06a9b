//! Web search context from the DuckDuckGo Instant Answer API.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;
use url::Url;

use crate::config::endpoint;
use crate::error::{BotError, FailureReason, Result};

const SEARCH_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_RELATED_TOPICS: usize = 3;

/// Substrings that suggest the question needs current or factual data.
const SEARCH_KEYWORDS: &[&str] = &[
    // temporal
    "сегодня",
    "сейчас",
    "вчера",
    "завтра",
    "последн",
    "актуальн",
    "текущ",
    "в этом году",
    "today",
    "yesterday",
    "tomorrow",
    "latest",
    "current",
    "right now",
    "this year",
    // prices and rates
    "курс",
    "цена",
    "цены",
    "стоимост",
    "сколько стоит",
    "price",
    "cost",
    "exchange rate",
    // weather
    "погод",
    "температур",
    "weather",
    "forecast",
    // news
    "новост",
    "событи",
    "news",
    // lookups
    "кто такой",
    "кто такая",
    "что такое",
    "who is",
    "what is",
];

/// Returns true when the message looks like it needs fresh information from the web.
///
/// Plain case-insensitive substring matching; misses and false hits are acceptable.
pub fn should_use_search(text: &str) -> bool {
    let lowered = text.to_lowercase();
    SEARCH_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

/// Result of a best-effort search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Text to splice into the prompt
    Context(String),
    /// Search gave nothing usable; the reply goes ahead without context
    NoContext(FailureReason),
}

impl SearchOutcome {
    /// The search context, or an empty string when there is none.
    pub fn into_context(self) -> String {
        match self {
            SearchOutcome::Context(text) => text,
            SearchOutcome::NoContext(_) => String::new(),
        }
    }
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Never fails; every error becomes [`SearchOutcome::NoContext`].
    async fn search(&self, query: &str) -> SearchOutcome;
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    abstract_text: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

/// Either a topic with `Text` or a named group of topics, which is skipped.
#[derive(Debug, Deserialize)]
struct RelatedTopic {
    #[serde(rename = "Text")]
    text: Option<String>,
}

/// Picks the abstract when present, otherwise the first related topics.
fn extract_context(answer: InstantAnswer) -> Option<String> {
    let abstract_text = answer.abstract_text.trim();
    if !abstract_text.is_empty() {
        return Some(abstract_text.to_string());
    }

    let snippets: Vec<String> = answer
        .related_topics
        .into_iter()
        .filter_map(|topic| topic.text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .take(MAX_RELATED_TOPICS)
        .collect();

    if snippets.is_empty() {
        None
    } else {
        Some(snippets.join("\n"))
    }
}

pub struct DuckDuckGoClient {
    client: reqwest::Client,
    api_url: Url,
}

impl DuckDuckGoClient {
    pub fn new(client: reqwest::Client, api_url: Url) -> Self {
        Self { client, api_url }
    }

    async fn instant_answer(&self, query: &str) -> Result<InstantAnswer> {
        let response = self
            .client
            .get(endpoint(&self.api_url, ""))
            .timeout(SEARCH_TIMEOUT)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BotError::SearchApi {
                status: response.status(),
            });
        }

        // DuckDuckGo labels the body as javascript, so decode from text.
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoClient {
    async fn search(&self, query: &str) -> SearchOutcome {
        debug!("Performing web search for: {query}");

        match self.instant_answer(query).await {
            Ok(answer) => match extract_context(answer) {
                Some(context) => {
                    debug!("Web search returned {} characters", context.len());
                    SearchOutcome::Context(context)
                }
                None => {
                    debug!("Web search returned no usable text");
                    SearchOutcome::NoContext(FailureReason::Empty)
                }
            },
            Err(e) => {
                warn!("Web search failed, continuing without context: {e}");
                SearchOutcome::NoContext(e.reason())
            }
        }
    }
}
