//! Gmail REST client.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::schema::{LabelList, ThreadList, WireLabel, WireThread};

/// Public Gmail API root.
pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

/// Largest page `users.threads.list` accepts.
pub const DEFAULT_PAGE_SIZE: u32 = 500;

const MAX_RATE_LIMIT_RETRIES: u32 = 5;
const MAX_BACKOFF: Duration = Duration::from_secs(32);
const ERROR_BODY_MAX_LEN: usize = 300;

/// Headers requested with thread metadata.
const METADATA_HEADERS: [&str; 4] = ["Subject", "From", "To", "Date"];

/// Read-only client for the authenticated user's mailbox.
#[derive(Debug, Clone)]
pub struct GmailClient {
    http: Client,
    base_url: String,
    access_token: String,
    page_size: u32,
    initial_backoff: Duration,
}

impl GmailClient {
    /// Creates a client using a bearer access token.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: GMAIL_API_BASE.to_string(),
            access_token: access_token.into(),
            page_size: DEFAULT_PAGE_SIZE,
            initial_backoff: Duration::from_secs(1),
        }
    }

    /// Overrides the API root (for tests or proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Uses a preconfigured HTTP client.
    #[must_use]
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Sets the thread list page size, clamped to `1..=500`.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, DEFAULT_PAGE_SIZE);
        self
    }

    /// Sets the first rate-limit backoff when the server sends no `Retry-After`.
    #[must_use]
    pub const fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Replaces the access token after a refresh.
    pub fn set_access_token(&mut self, access_token: impl Into<String>) {
        self.access_token = access_token.into();
    }

    fn url(&self, path: &str) -> String {
        format!("{}/users/me/{path}", self.base_url)
    }

    /// Lists every label in the mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_labels(&self) -> Result<Vec<WireLabel>> {
        let list: LabelList = self.get_json(|| self.http.get(self.url("labels"))).await?;
        debug!("Fetched {} labels", list.labels.len());
        Ok(list.labels)
    }

    /// Lists thread ids, following pagination to the end.
    ///
    /// `query` uses Gmail search syntax; `limit` stops early once that many
    /// ids have been collected.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    pub async fn list_thread_ids(
        &self,
        query: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;
        let page_size = self.page_size.to_string();

        loop {
            let page: ThreadList = self
                .get_json(|| {
                    let mut request = self
                        .http
                        .get(self.url("threads"))
                        .query(&[("maxResults", page_size.as_str())]);
                    if let Some(q) = query {
                        request = request.query(&[("q", q)]);
                    }
                    if let Some(token) = &page_token {
                        request = request.query(&[("pageToken", token.as_str())]);
                    }
                    request
                })
                .await?;

            ids.extend(page.threads.into_iter().map(|t| t.id));
            debug!("Listed {} thread ids so far", ids.len());

            if let Some(limit) = limit
                && ids.len() >= limit
            {
                ids.truncate(limit);
                break;
            }
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(ids)
    }

    /// Fetches one thread with message labels, dates and metadata headers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_thread(&self, id: &str) -> Result<WireThread> {
        self.get_json(|| {
            let mut request = self
                .http
                .get(self.url(&format!("threads/{id}")))
                .query(&[("format", "metadata")]);
            for header in METADATA_HEADERS {
                request = request.query(&[("metadataHeaders", header)]);
            }
            request
        })
        .await
    }

    /// Sends a GET built by `build`, retrying on 429, and decodes the body.
    async fn get_json<T, F>(&self, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let mut backoff = self.initial_backoff;

        for attempt in 1..=MAX_RATE_LIMIT_RETRIES {
            let response = build()
                .bearer_auth(&self.access_token)
                .header("accept", "application/json")
                .send()
                .await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt == MAX_RATE_LIMIT_RETRIES {
                    warn!("Gmail rate limit hit on final attempt {attempt}, giving up");
                    break;
                }
                let wait = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .map_or(backoff, Duration::from_secs);
                warn!(
                    "Gmail rate limit hit (attempt {attempt}/{MAX_RATE_LIMIT_RETRIES}), waiting {wait:?}"
                );
                tokio::time::sleep(wait).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
                continue;
            }

            let body = response.text().await?;
            if !status.is_success() {
                return Err(Error::Api {
                    status: status.as_u16(),
                    body: truncate(&body, ERROR_BODY_MAX_LEN),
                });
            }
            return Ok(serde_json::from_str(&body)?);
        }

        Err(Error::RateLimited(MAX_RATE_LIMIT_RETRIES))
    }
}

fn truncate(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
