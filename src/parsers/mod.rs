//! Record extraction from rendered pages.
//!
//! Every parser here is a pure function over already-rendered content and
//! tolerates missing sub-elements by leaving the corresponding field empty.

pub mod benefit;
pub mod count;
pub mod interview;
pub mod payload;
pub mod review;
pub mod salary;


use crate::records::{BenefitRecord, InterviewRecord, ReviewRecord, SalaryRecord};
use crate::renderer::RenderedPage;
use scraper::{ElementRef, Html, Selector};

pub use payload::{OverallRatings, SubRatings};

/// Parse a review listing page
///
/// Per-review sub-ratings come from the embedded script payload and are
/// returned alongside the DOM records, already merged into them.
pub fn parse_review_page(page: &RenderedPage) -> (SubRatings, Vec<ReviewRecord>) {
    let ratings = page
        .payload
        .as_deref()
        .map(payload::sub_ratings)
        .unwrap_or_default();
    let doc = Html::parse_document(&page.html);
    let reviews = review::parse(&doc, &ratings);
    (ratings, reviews)
}

pub fn parse_salary_page(page: &RenderedPage) -> Vec<SalaryRecord> {
    salary::parse(&Html::parse_document(&page.html))
}

pub fn parse_interview_page(page: &RenderedPage) -> Vec<InterviewRecord> {
    interview::parse(&Html::parse_document(&page.html))
}

pub fn parse_benefit_page(page: &RenderedPage) -> BenefitRecord {
    benefit::parse(&Html::parse_document(&page.html), &page.url)
}

/// Whitespace-normalized text content of an element
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first match of `selector` under `scope`, if any and non-empty
pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

pub(crate) fn css(selector: &str) -> Selector {
    Selector::parse(selector).expect("selector literal should be valid CSS")
}
