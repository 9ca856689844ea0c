use crate::category::Category;
use crate::error::ConfigError;
use crate::utils::MAX_DELAY_SECS;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Scheme and host every category URL is built on
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Directory that receives one sub-directory per company
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory for the per-process log file
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Which categories are harvested
    #[serde(default)]
    pub categories: CategoryToggles,

    /// Page count used when no total-count signal is found
    #[serde(default = "default_page_count")]
    pub default_page_count: u32,

    /// Optional cap applied to every numbered category
    #[serde(default)]
    pub max_pages: Option<u32>,

    /// Bound on every readiness wait
    #[serde(default = "default_readiness_timeout_secs")]
    pub readiness_timeout_secs: u64,

    /// Fixed post-navigation delay for salary pages
    #[serde(default = "default_salary_settle_secs")]
    pub salary_settle_secs: u64,

    /// Pages served before a session is recycled, drawn per session
    #[serde(default = "default_restart_threshold")]
    pub restart_threshold: Range<u32>,

    /// Inter-page delay for numbered categories
    #[serde(default = "default_paged_delay")]
    pub paged_delay_secs: Range<f64>,

    /// Inter-page delay for filter-enumerated categories
    #[serde(default = "default_filtered_delay")]
    pub filtered_delay_secs: Range<f64>,

    /// Identity pool a fresh session draws its user agent from
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,

    #[serde(default)]
    pub browser: BrowserOptions,
}

/// Inclusive `[min, max]` range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T> Range<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryToggles {
    #[serde(default = "enabled")]
    pub review: bool,
    #[serde(default = "enabled")]
    pub salary: bool,
    #[serde(default = "enabled")]
    pub interview: bool,
    #[serde(default = "enabled")]
    pub benefit: bool,
    /// Dropdown/modal choreography; off unless asked for
    #[serde(default)]
    pub diversity: bool,
}

impl Default for CategoryToggles {
    fn default() -> Self {
        Self {
            review: true,
            salary: true,
            interview: true,
            benefit: true,
            diversity: false,
        }
    }
}

impl CategoryToggles {
    /// Toggles with exactly the given categories switched on
    pub fn only(categories: &[Category]) -> Self {
        Self {
            review: categories.contains(&Category::Review),
            salary: categories.contains(&Category::Salary),
            interview: categories.contains(&Category::Interview),
            benefit: categories.contains(&Category::Benefit),
            diversity: categories.contains(&Category::Diversity),
        }
    }

    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Review => self.review,
            Category::Salary => self.salary,
            Category::Interview => self.interview,
            Category::Benefit => self.benefit,
            Category::Diversity => self.diversity,
        }
    }

    /// Enabled categories in their fixed harvest order
    pub fn enabled(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.is_enabled(*c))
            .collect()
    }
}

/// Rendering options applied to every new browser session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserOptions {
    #[serde(default = "enabled")]
    pub headless: bool,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "enabled")]
    pub disable_images: bool,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: default_window_width(),
            window_height: default_window_height(),
            disable_images: true,
        }
    }
}

fn enabled() -> bool {
    true
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_base_url() -> String {
    "https://www.glassdoor.com".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_page_count() -> u32 {
    1
}

fn default_readiness_timeout_secs() -> u64 {
    10
}

fn default_salary_settle_secs() -> u64 {
    10
}

fn default_restart_threshold() -> Range<u32> {
    Range::new(30, 50)
}

fn default_paged_delay() -> Range<f64> {
    Range::new(5.0, 10.0)
}

fn default_filtered_delay() -> Range<f64> {
    Range::new(1.0, 3.0)
}

fn default_user_agents() -> Vec<String> {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.212 Safari/537.36".to_string(),
    ]
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            base_url: default_base_url(),
            output_dir: default_output_dir(),
            log_dir: default_log_dir(),
            categories: CategoryToggles::default(),
            default_page_count: default_page_count(),
            max_pages: None,
            readiness_timeout_secs: default_readiness_timeout_secs(),
            salary_settle_secs: default_salary_settle_secs(),
            restart_threshold: default_restart_threshold(),
            paged_delay_secs: default_paged_delay(),
            filtered_delay_secs: default_filtered_delay(),
            user_agents: default_user_agents(),
            browser: BrowserOptions::default(),
        }
    }
}

impl HarvestConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut contents = String::new();
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the harvest loop cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.restart_threshold;
        if threshold.min == 0 || threshold.min > threshold.max {
            return Err(ConfigError::Invalid(format!(
                "restart_threshold must satisfy 0 < min <= max, got {threshold:?}"
            )));
        }
        for (name, range) in [
            ("paged_delay_secs", self.paged_delay_secs),
            ("filtered_delay_secs", self.filtered_delay_secs),
        ] {
            if !(range.min >= 0.0 && range.min <= range.max && range.max <= MAX_DELAY_SECS) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must satisfy 0 <= min <= max <= {MAX_DELAY_SECS}, got {range:?}"
                )));
            }
        }
        if self.default_page_count == 0 {
            return Err(ConfigError::Invalid(
                "default_page_count must be at least 1".to_string(),
            ));
        }
        if self.max_pages == Some(0) {
            return Err(ConfigError::Invalid(
                "max_pages must be at least 1 when set".to_string(),
            ));
        }
        if self.user_agents.is_empty() {
            return Err(ConfigError::Invalid("user_agents must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_secs(self.readiness_timeout_secs)
    }

    pub fn salary_settle(&self) -> Duration {
        Duration::from_secs(self.salary_settle_secs)
    }

    /// Inter-page delay range for a category
    pub fn delay_for(&self, category: Category) -> Range<f64> {
        if category.is_filtered() {
            self.filtered_delay_secs
        } else {
            self.paged_delay_secs
        }
    }
}
