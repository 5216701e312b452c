use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the harvester
///
/// Every section and key is optional; missing values fall back to the
/// defaults documented on each field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub crawler: CrawlerConfig,
    pub retry: RetryConfig,
    pub endpoints: EndpointConfig,
    pub request: RequestConfig,
    pub output: OutputConfig,
}

/// Crawl bounds, page size, and rate-limiting delays
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// First item index to process; values <= 0 resume from the persisted cursor
    pub start_index: i64,

    /// Last item index to process; values <= 0 crawl up to the remote total
    pub end_index: i64,

    /// Number of items per listing page
    pub page_size: u64,

    /// Pause after every processed item (milliseconds)
    pub item_delay_ms: u64,

    /// Pause after every listing page (milliseconds)
    pub page_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_index: 0,
            end_index: 50_000,
            page_size: 15,
            item_delay_ms: 50,
            page_delay_ms: 0,
        }
    }
}

impl CrawlerConfig {
    pub fn item_delay(&self) -> Duration {
        Duration::from_millis(self.item_delay_ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

/// Retry behaviour of every outgoing request
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RetryConfig {
    /// Maximum number of attempts per request, including the first
    pub max_attempts: u32,

    /// Base pause between attempts (milliseconds)
    pub base_delay_ms: u64,

    /// Linear growth of the pause per attempt already made
    pub growth_rate: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 10,
            growth_rate: 0.1,
        }
    }
}

/// Remote endpoints of the listing service
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EndpointConfig {
    /// Prefix shared by every endpoint; item links are appended to it verbatim
    pub base_url: String,

    /// Path of the total-count endpoint, relative to `base_url`
    pub count_path: String,

    /// Path of the paginated listing endpoint, relative to `base_url`
    pub list_path: String,

    /// Referer header sent with listing requests
    pub referer: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "https://cy.ncss.org.cn/search/".to_string(),
            count_path: "projectcount".to_string(),
            list_path: "projectlist".to_string(),
            referer: "https://cy.ncss.org.cn/search/projects".to_string(),
        }
    }
}

impl EndpointConfig {
    pub fn count_url(&self) -> String {
        format!("{}{}", self.base_url, self.count_path)
    }

    pub fn list_url(&self) -> String {
        format!("{}{}", self.base_url, self.list_path)
    }

    pub fn detail_url(&self, item_link: &str) -> String {
        format!("{}{}", self.base_url, item_link)
    }
}

/// Header and proxy pools used for listing requests
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RequestConfig {
    /// User-Agent values, used in rotation
    pub user_agents: Vec<String>,

    /// Proxy URLs, used in rotation; empty means direct connections
    pub proxies: Vec<String>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15".to_string(),
                "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0".to_string(),
            ],
            proxies: Vec::new(),
        }
    }
}

/// On-disk output locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory holding the tabular store, the progress file, and mirror files
    pub data_dir: PathBuf,

    /// File name of the tabular store inside `data_dir`
    pub table_file: String,

    /// File name of the progress cursor inside `data_dir`
    pub progress_file: String,

    /// Whether to write one mirror file per record
    pub mirror_records: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            table_file: "data.csv".to_string(),
            progress_file: "index.txt".to_string(),
            mirror_records: true,
        }
    }
}

impl OutputConfig {
    pub fn table_path(&self) -> PathBuf {
        self.data_dir.join(&self.table_file)
    }

    pub fn progress_path(&self) -> PathBuf {
        self.data_dir.join(&self.progress_file)
    }
}
