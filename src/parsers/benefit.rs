use crate::parsers::{css, first_text};
use crate::records::BenefitRecord;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

const STATUS_PARAM: &str = "filter.employmentStatus";

static RATING: LazyLock<Selector> =
    LazyLock::new(|| css(r#"div[data-test="benefit-rating"] strong"#));
static RATING_COUNT: LazyLock<Selector> =
    LazyLock::new(|| css("div.d-flex.justify-content-center.mb.css-1uyte9r"));
static STATUS_OPTION: LazyLock<Selector> =
    LazyLock::new(|| css(r#"select[data-test="employee-status-filter"] option"#));

pub fn parse(doc: &Html, url: &str) -> BenefitRecord {
    let root = doc.root_element();
    BenefitRecord {
        employment_status: employment_status(url),
        rating: first_text(root, &RATING),
        number_of_ratings: first_text(root, &RATING_COUNT),
    }
}

/// Employment-status filter values offered on the benefits landing page
pub fn status_filters(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    doc.select(&STATUS_OPTION)
        .filter_map(|option| option.value().attr("value"))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

/// The `filter.employmentStatus` value a benefits URL was narrowed to
pub fn employment_status(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == STATUS_PARAM)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employment_status_from_url() {
        assert_eq!(
            employment_status(
                "https://www.glassdoor.com/Benefits/Acme-Benefits-E123.htm?filter.employmentStatus=PART_TIME&x=1"
            ),
            Some("PART_TIME".to_string())
        );
        assert_eq!(
            employment_status("https://www.glassdoor.com/Benefits/Acme-Benefits-E123.htm"),
            None
        );
        assert_eq!(employment_status("not a url"), None);
    }

    #[test]
    fn test_status_filters_skip_valueless_options() {
        let html = r#"<select data-test="employee-status-filter">
            <option>All</option>
            <option value="REGULAR">Full-time</option>
            <option value="">Blank</option>
            <option value="PART_TIME">Part-time</option>
        </select>"#;
        assert_eq!(status_filters(html), vec!["REGULAR", "PART_TIME"]);
    }
}
