use crate::category::Category;
use crate::company::Company;
use crate::config::HarvestConfig;
use crate::error::PageError;
use crate::parsers::{benefit, count};
use crate::renderer::{self, RenderedPage, RendererFactory};
use crate::session::SessionManager;
use std::fmt;

/// What a page task points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTarget {
    /// Numbered listing page, 1-based
    Number(u32),
    /// Landing page narrowed to a filter value
    Filter(String),
    /// Unfiltered landing page
    Landing,
}

impl fmt::Display for PageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageTarget::Number(n) => write!(f, "page {n}"),
            PageTarget::Filter(value) => write!(f, "filter {value}"),
            PageTarget::Landing => f.write_str("landing page"),
        }
    }
}

/// One page to visit, consumed exactly once by the harvest loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTask {
    pub company: Company,
    pub category: Category,
    pub target: PageTarget,
    pub url: String,
}

/// Number of pages implied by a total-count signal
///
/// Rounds half to even, so a final partial page holding half a page of items
/// or less is usually not visited (25 reviews give 2 pages, 35 give 4). Missing signals and a computed
/// count of zero fall back to `default`.
pub fn page_count(category: Category, total_items: Option<u64>, default: u32) -> u32 {
    let (Some(per_page), Some(total)) = (category.items_per_page(), total_items) else {
        return default;
    };

    let computed = (total as f64 / per_page as f64).round_ties_even() as u64;
    if computed == 0 {
        return default;
    }

    let computed = u32::try_from(computed).unwrap_or(u32::MAX);
    match category.page_cap() {
        Some(cap) => computed.min(cap),
        None => computed,
    }
}

/// Sizes each category's page sequence
pub struct PaginationPlanner<'a> {
    config: &'a HarvestConfig,
}

impl<'a> PaginationPlanner<'a> {
    pub fn new(config: &'a HarvestConfig) -> Self {
        Self { config }
    }

    /// Pages to visit for a numbered category
    ///
    /// Fetches the category's first page, which counts against the session's
    /// page quota. Never fails: without a usable count signal the configured
    /// default is returned.
    pub async fn plan<F: RendererFactory>(
        &self,
        session: &mut SessionManager<F>,
        category: Category,
        company: &Company,
    ) -> u32 {
        let default = self.config.default_page_count;
        if category.is_filtered() {
            return default;
        }

        ::log::info!("Finding the total number of {} pages for {}", category, company);
        let url = category.page_url(&self.config.base_url, company, 1);

        let total = match self.first_page(session, category, &url).await {
            Ok(page) => count::total_items(category, &page.html),
            Err(e) => {
                ::log::error!(
                    "Planning fetch failed for {} [{}]: {}: {}",
                    url,
                    category,
                    e.kind(),
                    e
                );
                None
            }
        };

        let pages = match total {
            Some(total) => {
                let pages = page_count(category, Some(total), default);
                ::log::info!(
                    "Finding a total of {} {} records over {} pages",
                    total,
                    category,
                    pages
                );
                pages
            }
            None => {
                ::log::warn!(
                    "No total {} count found for {}, using {} page(s)",
                    category,
                    company,
                    default
                );
                default
            }
        };

        self.limit(pages)
    }

    /// Employment-status filter values listed on the benefits landing page
    pub async fn discover_filters<F: RendererFactory>(
        &self,
        session: &mut SessionManager<F>,
        company: &Company,
    ) -> Vec<String> {
        let url = Category::Benefit.landing_url(&self.config.base_url, company);
        match self.first_page(session, Category::Benefit, &url).await {
            Ok(page) => {
                let filters = benefit::status_filters(&page.html);
                ::log::info!("Found {} employment-status filters for {}", filters.len(), company);
                filters
            }
            Err(e) => {
                ::log::error!("Filter discovery failed for {} [benefit]: {}: {}", url, e.kind(), e);
                Vec::new()
            }
        }
    }

    /// The ordered task sequence for a category
    pub async fn plan_tasks<F: RendererFactory>(
        &self,
        session: &mut SessionManager<F>,
        category: Category,
        company: &Company,
    ) -> Vec<PageTask> {
        match category {
            Category::Benefit => {
                let filters = self.discover_filters(session, company).await;
                self.filter_tasks(category, company, &filters)
            }
            Category::Diversity => vec![self.task(category, company, PageTarget::Landing)],
            numbered => {
                let pages = self.plan(session, numbered, company).await;
                self.numbered_tasks(numbered, company, pages)
            }
        }
    }

    /// Tasks for pages `1..=pages`
    pub fn numbered_tasks(
        &self,
        category: Category,
        company: &Company,
        pages: u32,
    ) -> Vec<PageTask> {
        (1..=pages)
            .map(|n| self.task(category, company, PageTarget::Number(n)))
            .collect()
    }

    /// One task per filter value, or the landing page when there are none
    pub fn filter_tasks(
        &self,
        category: Category,
        company: &Company,
        filters: &[String],
    ) -> Vec<PageTask> {
        if filters.is_empty() {
            return vec![self.task(category, company, PageTarget::Landing)];
        }
        filters
            .iter()
            .map(|value| self.task(category, company, PageTarget::Filter(value.clone())))
            .collect()
    }

    fn task(&self, category: Category, company: &Company, target: PageTarget) -> PageTask {
        let base = &self.config.base_url;
        let url = match &target {
            PageTarget::Number(n) => category.page_url(base, company, *n),
            PageTarget::Filter(value) => category.filter_url(base, company, value),
            PageTarget::Landing => category.landing_url(base, company),
        };
        PageTask {
            company: company.clone(),
            category,
            target,
            url,
        }
    }

    fn limit(&self, pages: u32) -> u32 {
        match self.config.max_pages {
            Some(max) if pages > max => {
                ::log::info!("Limiting {} pages to {}", pages, max);
                max
            }
            _ => pages,
        }
    }

    async fn first_page<F: RendererFactory>(
        &self,
        session: &mut SessionManager<F>,
        category: Category,
        url: &str,
    ) -> Result<RenderedPage, PageError> {
        let readiness = category.readiness(self.config);
        let result = match session.ensure_session().await {
            Ok(renderer) => renderer::fetch(renderer, url, &readiness, false).await,
            Err(e) => Err(e.into()),
        };

        session.record_page();
        result
    }
}
