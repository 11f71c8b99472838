//! Page fetcher implementation
//!
//! This module handles every request the walker makes, including:
//! - Building HTTP clients with browser-like headers and a cookie store
//! - Waiting for the page to settle after navigation
//! - Extracting the JSON document from the rendered page
//! - Isolated, short-lived contexts for one-off probes
//!
//! Fetch problems never surface as errors. A failed request or an
//! unreadable body yields an empty JSON object, which callers read as
//! "nothing here".

use crate::config::BrowserConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use std::time::{Duration, Instant};

/// Source of decoded JSON pages
///
/// `fetch` navigates within the long-lived browsing context; `fetch_ephemeral`
/// opens an isolated context, fetches, and closes it again so the main
/// context's state (cookies, pagination position) is left untouched.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    /// Fetches `url` and returns its JSON payload, or `{}` on any failure
    async fn fetch(&self, url: &str) -> Value;

    /// Like `fetch`, but in a throwaway context
    async fn fetch_ephemeral(&self, url: &str) -> Value;
}

impl<T: PageFetcher> PageFetcher for &T {
    async fn fetch(&self, url: &str) -> Value {
        (**self).fetch(url).await
    }

    async fn fetch_ephemeral(&self, url: &str) -> Value {
        (**self).fetch_ephemeral(url).await
    }
}

/// Returns the value fetchers hand back for missing or malformed pages
pub fn empty_document() -> Value {
    Value::Object(Map::new())
}

/// Builds an HTTP client that presents itself like a browser
///
/// Each client owns its cookie store and connection pool, so a new client
/// is a new, isolated browsing context.
pub fn build_http_client(config: &BrowserConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/html;q=0.9, */*;q=0.8"),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("ru-RU,ru;q=0.9,en;q=0.8"),
    );

    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .cookie_store(true)
        .gzip(true)
        .brotli(true);

    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build()
}

/// HTTP-backed page fetcher
pub struct HttpPageFetcher {
    client: Client,
    config: BrowserConfig,
}

impl HttpPageFetcher {
    /// Creates a fetcher with its main browsing context
    pub fn new(config: &BrowserConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            config: config.clone(),
        })
    }

    fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.config.settle_delay_ms)
    }

    /// Navigates to `url` with `client`, waits for the page to settle, and
    /// decodes the payload
    async fn navigate(&self, client: &Client, url: &str) -> Value {
        let response = match client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Request to {} failed: {}", url, e);
                return empty_document();
            }
        };

        let status = response.status();
        if !status.is_success() {
            // Error pages still carry JSON bodies (e.g. the "no children" message)
            tracing::debug!("{} answered HTTP {}", url, status.as_u16());
        }

        tokio::time::sleep(self.settle_delay()).await;

        match response.text().await {
            Ok(body) => decode_document(&body, url),
            Err(e) => {
                tracing::warn!("Failed to read body of {}: {}", url, e);
                empty_document()
            }
        }
    }
}

impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Value {
        tracing::trace!("GET {}", url);
        self.navigate(&self.client, url).await
    }

    async fn fetch_ephemeral(&self, url: &str) -> Value {
        let context = match EphemeralContext::open(&self.config) {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!("Could not open isolated context for {}: {}", url, e);
                return empty_document();
            }
        };

        tracing::trace!("GET {} (isolated)", url);
        let document = self.navigate(&context.client, url).await;
        context.close();
        document
    }
}

/// A short-lived browsing context used for a single request
struct EphemeralContext {
    client: Client,
    opened_at: Instant,
}

impl EphemeralContext {
    fn open(config: &BrowserConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            opened_at: Instant::now(),
        })
    }

    /// Releases the context's connections and cookies
    fn close(self) {
        tracing::trace!(
            "Closing isolated context after {:?}",
            self.opened_at.elapsed()
        );
        drop(self.client);
    }
}

/// Decodes the JSON document out of a fetched page
///
/// Raw JSON bodies are parsed directly. Rendered pages wrap the document in
/// `<pre>`; its text content is parsed instead. Anything else, or any
/// non-object document, becomes `{}`.
pub fn decode_document(body: &str, url: &str) -> Value {
    let trimmed = body.trim_start();
    let text = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        Some(trimmed.to_string())
    } else {
        extract_pre_text(body)
    };

    let Some(text) = text else {
        tracing::warn!("No JSON document found at {}", url);
        return empty_document();
    };

    match serde_json::from_str::<Value>(&text) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => {
            tracing::warn!("JSON at {} is not an object, ignoring it", url);
            empty_document()
        }
        Err(e) => {
            tracing::warn!("Malformed JSON at {}: {}", url, e);
            empty_document()
        }
    }
}

/// Returns the text of the first `<pre>` element, if any
fn extract_pre_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("pre").ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())
}
