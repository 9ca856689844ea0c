//! Total-item signals used to size a category's page sequence.

use crate::category::Category;
use crate::parsers::{css, element_text};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static PAGINATION_FOOTER: LazyLock<Selector> = LazyLock::new(|| css("div.paginationFooter"));
static NAV: LazyLock<Selector> = LazyLock::new(|| css("nav"));

static REVIEW_TOTAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"of ([\d,]+) Reviews").expect("review total pattern should be valid")
});
static PLAIN_TOTAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"of ([\d,]+)").expect("total pattern should be valid"));

/// Total number of items announced on a category's first page
pub fn total_items(category: Category, html: &str) -> Option<u64> {
    let doc = Html::parse_document(html);
    match category {
        Category::Review => footer_total(&doc, &REVIEW_TOTAL),
        Category::Interview => footer_total(&doc, &PLAIN_TOTAL),
        Category::Salary => salary_total(&doc),
        Category::Benefit | Category::Diversity => None,
    }
}

fn footer_total(doc: &Html, pattern: &Regex) -> Option<u64> {
    let Some(footer) = doc.select(&PAGINATION_FOOTER).next() else {
        ::log::debug!("Pagination footer not found");
        return None;
    };
    first_number(&element_text(footer), pattern)
}

/// Salary pages announce their total in the `<p>` following the last `<nav>`
fn salary_total(doc: &Html) -> Option<u64> {
    let Some(last_nav) = doc.select(&NAV).last() else {
        ::log::debug!("No <nav> elements found on the page");
        return None;
    };

    let Some(paragraph) = last_nav
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == "p")
    else {
        ::log::debug!("No <p> element found after the last <nav>");
        return None;
    };

    first_number(&element_text(paragraph), &PLAIN_TOTAL)
}

fn first_number(text: &str, pattern: &Regex) -> Option<u64> {
    let caps = pattern.captures(text)?;
    caps[1].replace(',', "").parse().ok()
}
