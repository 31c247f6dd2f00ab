use serde::Deserialize;

/// Main configuration structure for the harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub search: SearchConfig,
}

/// Rotating-proxy gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// API key for the proxy service
    #[serde(rename = "api-key")]
    pub api_key: String,

    /// Proxy API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Two-letter country code for proxy exit nodes
    #[serde(rename = "country-code", default = "default_country")]
    pub country_code: String,

    /// How long the proxy should let a page render before returning it
    /// (milliseconds)
    #[serde(rename = "render-wait-ms", default = "default_render_wait")]
    pub render_wait_ms: u64,
}

/// Target-site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Search results URL template; `{term}` is replaced with the
    /// URL-encoded search term
    #[serde(rename = "search-url")]
    pub search_url: String,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of search result pages fetched per term,
    /// including the first page
    #[serde(rename = "page-cap")]
    pub page_cap: usize,

    /// Concurrent search-page fetches per term
    #[serde(rename = "search-concurrency")]
    pub search_concurrency: usize,

    /// Retries after the first failed attempt on a search page
    #[serde(rename = "search-retries")]
    pub search_retries: u32,

    /// Concurrent detail-page crawls per batch file
    #[serde(rename = "detail-concurrency")]
    pub detail_concurrency: usize,

    /// Retries after the first failed attempt on a detail page
    #[serde(rename = "detail-retries")]
    pub detail_retries: u32,

    /// Number of accumulated records that triggers a pipeline flush
    #[serde(rename = "batch-threshold")]
    pub batch_threshold: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_cap: 4,
            search_concurrency: 2,
            search_retries: 2,
            detail_concurrency: 5,
            detail_retries: 2,
            batch_threshold: 50,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that receives the batch files
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "./output".to_string(),
        }
    }
}

/// Search terms driving the crawl
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// One top-level crawl per term, in order
    pub terms: Vec<String>,
}

fn default_endpoint() -> String {
    "https://api.scraperapi.com/".to_string()
}

fn default_country() -> String {
    "us".to_string()
}

fn default_render_wait() -> u64 {
    5000
}
