// Re-export modules
pub mod category;
pub mod company;
pub mod config;
pub mod error;
pub mod harvest;
pub mod logging;
pub mod parsers;
pub mod planner;
pub mod policy;
pub mod records;
pub mod renderer;
pub mod session;
pub mod sink;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types for convenience
pub use category::Category;
pub use company::Company;
pub use config::HarvestConfig;
pub use error::HarvestError;
pub use harvest::{CategoryReport, CompanyReport, HarvestLoop};

use config::CategoryToggles;
use renderer::webdriver::WebDriverFactory;
use session::{SessionConfig, SessionManager};
use sink::CsvSink;
use std::path::{Path, PathBuf};

/// Main builder for a harvest run over a company roster
pub struct Harvester {
    config: HarvestConfig,
}

impl Harvester {
    /// Create a new Harvester from a configuration
    ///
    /// A non-empty `WEBDRIVER_URL` environment variable replaces the
    /// configured WebDriver URL.
    pub fn new(mut config: HarvestConfig) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                config.webdriver_url = webdriver_url;
            }
        }
        Self { config }
    }

    /// Load configuration from a file
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, HarvestError> {
        Ok(Self::new(HarvestConfig::from_file(path)?))
    }

    /// Set the directory that receives the per-company output
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.config.webdriver_url = url.into();
        self
    }

    /// Harvest only the given categories
    pub fn with_categories(mut self, categories: &[Category]) -> Self {
        self.config.categories = CategoryToggles::only(categories);
        self
    }

    /// Cap every numbered category at `max_pages` pages
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.config.max_pages = Some(max_pages);
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.config.browser.headless = headless;
        self
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Harvest every company on the roster, in roster order
    ///
    /// Fails only on a roster that cannot be loaded, a company whose output
    /// cannot be prepared or settings that do not validate.
    pub async fn run(self, roster: impl AsRef<Path>) -> Result<Vec<CompanyReport>, HarvestError> {
        self.config.validate()?;

        let companies = company::load_roster(roster)?;
        ::log::info!("Loaded {} companies from roster", companies.len());

        let factory =
            WebDriverFactory::new(&self.config.webdriver_url, self.config.browser.clone());
        let session = SessionManager::new(factory, SessionConfig::from(&self.config));
        let sink = CsvSink::new(&self.config.output_dir);
        let mut harvest = HarvestLoop::new(session, sink, self.config);

        let mut reports = Vec::with_capacity(companies.len());
        for company in &companies {
            reports.push(harvest.harvest(company).await?);
        }
        Ok(reports)
    }
}
