use crate::category::Category;
use crate::company::Company;
use crate::config::HarvestConfig;
use crate::error::{HarvestError, PageError};
use crate::parsers::{self, payload};
use crate::planner::{PageTask, PaginationPlanner};
use crate::policy::{Action, classify_and_handle};
use crate::records::OutputFile;
use crate::renderer::{self, PageRenderer, Readiness, RenderedPage, RendererFactory};
use crate::session::SessionManager;
use crate::sink::ResultSink;
use crate::utils::jittered_delay;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Outcome of one category for one company
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    pub category: Category,
    pub pages_planned: usize,
    pub pages_ok: usize,
    pub pages_failed: usize,
    pub rows_written: usize,
    /// Set when the category stopped before its last page
    pub aborted: Option<String>,
}

impl CategoryReport {
    fn new(category: Category) -> Self {
        Self {
            category,
            pages_planned: 0,
            pages_ok: 0,
            pages_failed: 0,
            rows_written: 0,
            aborted: None,
        }
    }
}

/// Outcome of one company's harvest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyReport {
    pub company: Company,
    pub categories: Vec<CategoryReport>,
}

impl CompanyReport {
    pub fn rows_written(&self) -> usize {
        self.categories.iter().map(|c| c.rows_written).sum()
    }

    pub fn pages_failed(&self) -> usize {
        self.categories.iter().map(|c| c.pages_failed).sum()
    }

    pub fn category(&self, category: Category) -> Option<&CategoryReport> {
        self.categories.iter().find(|c| c.category == category)
    }
}

/// Drives every enabled category for a company, one page at a time
pub struct HarvestLoop<F: RendererFactory, S: ResultSink> {
    session: SessionManager<F>,
    sink: S,
    config: HarvestConfig,
    rng: StdRng,
}

impl<F: RendererFactory, S: ResultSink> HarvestLoop<F, S> {
    pub fn new(session: SessionManager<F>, sink: S, config: HarvestConfig) -> Self {
        Self::with_rng(session, sink, config, StdRng::from_entropy())
    }

    pub fn with_rng(
        session: SessionManager<F>,
        sink: S,
        config: HarvestConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            session,
            sink,
            config,
            rng,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn session(&self) -> &SessionManager<F> {
        &self.session
    }

    /// Harvest every enabled category for `company`
    ///
    /// Page and category failures are logged and reported, never returned.
    /// Only a sink that cannot be prepared stops the harvest.
    pub async fn harvest(&mut self, company: &Company) -> Result<CompanyReport, HarvestError> {
        let categories = self.config.categories.enabled();
        let files: Vec<OutputFile> = categories.iter().flat_map(|c| c.output_files()).collect();
        self.sink.prepare(company, &files)?;

        ::log::info!("Harvesting {}", company);
        if let Err(e) = self.session.restart().await {
            ::log::error!("Failed to start browser session: {}", e);
        }

        let mut report = CompanyReport {
            company: company.clone(),
            categories: Vec::with_capacity(categories.len()),
        };

        for category in categories {
            let mut category_report = CategoryReport::new(category);
            if let Err(e) = self.harvest_category(company, category, &mut category_report).await {
                ::log::error!(
                    "Stopping {} for {} after {}: {}",
                    category,
                    company,
                    e.kind(),
                    e
                );
                category_report.aborted = Some(e.to_string());
            }

            ::log::info!(
                "Finished {} for {}: {}/{} pages, {} failed, {} rows",
                category,
                company,
                category_report.pages_ok,
                category_report.pages_planned,
                category_report.pages_failed,
                category_report.rows_written
            );
            report.categories.push(category_report);

            // Every category starts on a fresh session
            self.session.request_restart();
        }

        self.session.shutdown().await;
        self.sink.release(company);
        Ok(report)
    }

    async fn harvest_category(
        &mut self,
        company: &Company,
        category: Category,
        report: &mut CategoryReport,
    ) -> Result<(), PageError> {
        ::log::info!("Starting {} for {}", category, company);

        let tasks = PaginationPlanner::new(&self.config)
            .plan_tasks(&mut self.session, category, company)
            .await;
        report.pages_planned = tasks.len();

        if category == Category::Review {
            report.rows_written += self.overall_ratings(company).await?;
        }

        let delay = self.config.delay_for(category);
        for (index, task) in tasks.iter().enumerate() {
            ::log::info!(
                "Scraping {} {} of {} ({}/{})",
                category,
                task.target,
                company,
                index + 1,
                tasks.len()
            );

            match self.process(task).await {
                Ok(rows) => {
                    report.pages_ok += 1;
                    report.rows_written += rows;
                }
                Err(e) => {
                    report.pages_failed += 1;
                    self.handle_failure(e, &task.url, category)?;
                }
            }

            self.session.record_page();
            if category.restarts_every_page() {
                self.session.request_restart();
            }

            if index + 1 < tasks.len() {
                jittered_delay(&mut self.rng, delay.min, delay.max).await;
            }
        }
        Ok(())
    }

    /// Fetch, extract and append one page; returns the rows written
    async fn process(&mut self, task: &PageTask) -> Result<usize, PageError> {
        let company = &task.company;
        let readiness = task.category.readiness(&self.config);

        let written = match task.category {
            Category::Review => {
                let page = self.fetch(&task.url, &readiness, true).await?;
                let (ratings, reviews) = parsers::parse_review_page(&page);
                if ratings.is_empty() && !reviews.is_empty() {
                    ::log::debug!("No sub-ratings in payload for {}", task.url);
                }
                self.sink.append(company, &reviews)?
            }
            Category::Salary => {
                let page = self.fetch(&task.url, &readiness, false).await?;
                self.sink.append(company, &parsers::parse_salary_page(&page))?
            }
            Category::Interview => {
                let page = self.fetch(&task.url, &readiness, false).await?;
                self.sink.append(company, &parsers::parse_interview_page(&page))?
            }
            Category::Benefit => {
                let page = self.fetch(&task.url, &readiness, false).await?;
                self.sink.append(company, &[parsers::parse_benefit_page(&page)])?
            }
            Category::Diversity => {
                let timeout = self.config.readiness_timeout();
                let renderer = self.session.ensure_session().await?;
                let records =
                    PageRenderer::diversity_breakdown(renderer, &task.url, timeout).await?;
                self.sink.append(company, &records)?
            }
        };

        ::log::info!("Extracted {} {} records from {}", written, task.category, task.url);
        Ok(written)
    }

    /// Append the company's aggregate ratings, read from review page 1
    async fn overall_ratings(&mut self, company: &Company) -> Result<usize, PageError> {
        let url = Category::Review.page_url(&self.config.base_url, company, 1);
        let readiness = Category::Review.readiness(&self.config);

        let result = match self.fetch(&url, &readiness, true).await {
            Ok(page) => {
                let overall = page
                    .payload
                    .as_deref()
                    .map(payload::overall_ratings)
                    .unwrap_or_default();
                self.sink.append(company, &[overall]).map_err(PageError::from)
            }
            Err(e) => Err(e),
        };
        self.session.record_page();

        match result {
            Ok(rows) => {
                ::log::info!("Saved overall ratings for {}", company);
                Ok(rows)
            }
            Err(e) => {
                self.handle_failure(e, &url, Category::Review)?;
                Ok(0)
            }
        }
    }

    async fn fetch(
        &mut self,
        url: &str,
        readiness: &Readiness,
        with_payload: bool,
    ) -> Result<RenderedPage, PageError> {
        let renderer = self.session.ensure_session().await?;
        renderer::fetch(renderer, url, readiness, with_payload).await
    }

    /// Log a page failure and apply its action; `Err` stops the category
    fn handle_failure(
        &mut self,
        error: PageError,
        url: &str,
        category: Category,
    ) -> Result<(), PageError> {
        ::log::error!("{}: {} [{}]: {}", error.kind(), url, category, error);
        match classify_and_handle(&error) {
            Action::Skip => Ok(()),
            Action::Restart => {
                self.session.request_restart();
                Ok(())
            }
            Action::Abort => Err(error),
        }
    }
}
