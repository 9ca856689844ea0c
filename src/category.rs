use crate::company::Company;
use crate::config::HarvestConfig;
use crate::records::OutputFile;
use crate::renderer::Readiness;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interview listings stop paginating past this point
pub const INTERVIEW_PAGE_CAP: u32 = 999;

const PAGINATION_FOOTER: &str = "div.paginationFooter";
const DIVERSITY_DROPDOWN: &str = ".css-xjxhjz.egu3u860";

/// One data type harvested per company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Review,
    Salary,
    Interview,
    Benefit,
    Diversity,
}

impl Category {
    /// Every category, in harvest order
    pub const ALL: [Category; 5] = [
        Category::Review,
        Category::Salary,
        Category::Interview,
        Category::Benefit,
        Category::Diversity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Review => "review",
            Category::Salary => "salary",
            Category::Interview => "interview",
            Category::Benefit => "benefit",
            Category::Diversity => "diversity",
        }
    }

    /// Records per listing page, for categories that paginate by number
    pub fn items_per_page(&self) -> Option<u32> {
        match self {
            Category::Review | Category::Interview => Some(10),
            Category::Salary => Some(20),
            Category::Benefit | Category::Diversity => None,
        }
    }

    pub fn page_cap(&self) -> Option<u32> {
        match self {
            Category::Interview => Some(INTERVIEW_PAGE_CAP),
            _ => None,
        }
    }

    /// Benefit and Diversity enumerate filter values instead of numbered pages
    pub fn is_filtered(&self) -> bool {
        self.items_per_page().is_none()
    }

    /// Benefit pages each get a fresh session
    pub fn restarts_every_page(&self) -> bool {
        matches!(self, Category::Benefit)
    }

    pub fn output_file(&self) -> OutputFile {
        match self {
            Category::Review => OutputFile::Reviews,
            Category::Salary => OutputFile::Salaries,
            Category::Interview => OutputFile::Interviews,
            Category::Benefit => OutputFile::Benefits,
            Category::Diversity => OutputFile::Diversity,
        }
    }

    /// Every file the category writes to
    pub fn output_files(&self) -> Vec<OutputFile> {
        match self {
            Category::Review => vec![OutputFile::OverallReviews, OutputFile::Reviews],
            other => vec![other.output_file()],
        }
    }

    /// What to wait for before a page of this category is read
    pub fn readiness(&self, config: &HarvestConfig) -> Readiness {
        match self {
            Category::Review | Category::Interview => {
                Readiness::element(PAGINATION_FOOTER, config.readiness_timeout())
            }
            // No reliable marker on salary pages
            Category::Salary => Readiness::Delay(config.salary_settle()),
            Category::Benefit => Readiness::Immediate,
            Category::Diversity => {
                Readiness::element(DIVERSITY_DROPDOWN, config.readiness_timeout())
            }
        }
    }

    /// URL of numbered listing page `page` (1-based)
    pub fn page_url(&self, base_url: &str, company: &Company, page: u32) -> String {
        let base = base_url.trim_end_matches('/');
        let (name, code) = (&company.name, &company.code);
        match self {
            Category::Review => {
                format!("{base}/Reviews/{name}-Reviews-{code}_P{page}.htm?filter.iso3Language=eng")
            }
            Category::Salary => format!("{base}/Salary/{name}-Salaries-{code}_P{page}.htm"),
            Category::Interview => {
                format!("{base}/Interview/{name}-Interview-Questions-{code}_P{page}.htm")
            }
            Category::Benefit | Category::Diversity => self.landing_url(base_url, company),
        }
    }

    /// Unfiltered landing page of a category
    pub fn landing_url(&self, base_url: &str, company: &Company) -> String {
        let base = base_url.trim_end_matches('/');
        let (name, code) = (&company.name, &company.code);
        match self {
            Category::Benefit => format!("{base}/Benefits/{name}-Benefits-{code}.htm"),
            Category::Diversity => format!("{base}/Culture/{name}-DEI-{code}.htm"),
            numbered => numbered.page_url(base_url, company, 1),
        }
    }

    /// Landing page narrowed to one filter value
    pub fn filter_url(&self, base_url: &str, company: &Company, value: &str) -> String {
        match self {
            Category::Benefit => format!(
                "{}?filter.employmentStatus={}",
                self.landing_url(base_url, company),
                value
            ),
            other => other.landing_url(base_url, company),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
