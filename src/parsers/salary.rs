use crate::parsers::{css, first_text};
use crate::records::SalaryRecord;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

// Salary markup uses hashed CSS-module class names; match on the stable prefix
static ROW: LazyLock<Selector> = LazyLock::new(|| css(r#"tr[class*="salarylist_table-row__"]"#));
static JOB_TITLE: LazyLock<Selector> = LazyLock::new(|| css(r#"td[data-testid="jobTitle"] a"#));
static TOTAL_PAY: LazyLock<Selector> =
    LazyLock::new(|| css(r#"td[data-testid="totalComp"] p[class*="salarylist_bold__"]"#));
static PAY_BREAKDOWN: LazyLock<Selector> =
    LazyLock::new(|| css(r#"td[data-testid="totalComp"] p[class*="salarylist_sub-data__"]"#));

pub fn parse(doc: &Html) -> Vec<SalaryRecord> {
    doc.select(&ROW).map(parse_row).collect()
}

fn parse_row(row: ElementRef<'_>) -> SalaryRecord {
    let (base, additional) = match first_text(row, &PAY_BREAKDOWN) {
        Some(breakdown) => split_breakdown(&breakdown),
        None => (None, None),
    };

    SalaryRecord {
        job_title: first_text(row, &JOB_TITLE),
        total_pay: first_text(row, &TOTAL_PAY),
        base,
        additional,
    }
}

/// Split `"$X | $Y"` into base and additional pay
fn split_breakdown(text: &str) -> (Option<String>, Option<String>) {
    let non_empty = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
    match text.split_once('|') {
        Some((base, additional)) => (non_empty(base), non_empty(additional)),
        None => (non_empty(text), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_breakdown() {
        assert_eq!(
            split_breakdown("$120K | $15K"),
            (Some("$120K".to_string()), Some("$15K".to_string()))
        );
        assert_eq!(split_breakdown("$120K"), (Some("$120K".to_string()), None));
        assert_eq!(split_breakdown(" | "), (None, None));
    }
}
