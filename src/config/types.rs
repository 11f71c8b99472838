use serde::Deserialize;

/// Main configuration structure for Catalog-Walker
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    pub api: ApiConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "store")]
    pub stores: Vec<StoreEntry>,
}

impl Config {
    /// Looks up a configured store by slug (case-insensitive)
    pub fn find_store(&self, slug: &str) -> Option<&StoreEntry> {
        self.stores
            .iter()
            .find(|store| store.slug.eq_ignore_ascii_case(slug))
    }
}

/// Traversal behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Deepest level of the department tree to explore
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Departments requested per listing page
    #[serde(rename = "per-page", default = "default_page_limit")]
    pub per_page: u32,

    /// Products requested per department in a listing page
    #[serde(rename = "offers-limit", default = "default_page_limit")]
    pub offers_limit: u32,

    /// Only follow the first department of each listing page
    #[serde(rename = "debug-mode", default)]
    pub debug_mode: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            per_page: default_page_limit(),
            offers_limit: default_page_limit(),
            debug_mode: false,
        }
    }
}

/// Page fetching configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Wait after each navigation before reading the page (milliseconds)
    #[serde(rename = "settle-delay-ms", default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Optional per-request timeout; unset means wait indefinitely
    #[serde(rename = "request-timeout-secs", default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            settle_delay_ms: default_settle_delay_ms(),
            request_timeout_secs: None,
        }
    }
}

/// Catalog API location
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Scheme and host of the retailer, e.g. "https://sbermarket.ru"
    #[serde(rename = "base-url")]
    pub base_url: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// A store whose catalog should be crawled
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreEntry {
    /// Numeric store id used in API paths
    pub id: u64,

    /// Short name used in logs and run records
    pub slug: String,
}

fn default_max_depth() -> u32 {
    2
}

fn default_page_limit() -> u32 {
    100
}

fn default_settle_delay_ms() -> u64 {
    187
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
        .to_string()
}
