use crate::parsers::payload::SubRatings;
use crate::parsers::{css, first_text};
use crate::records::{ReviewRecord, Sentiment};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

const APPROVE_PATH: &str = "m8.835 17.64-3.959-3.545a1.19 1.19 0 0 1 0-1.735 1.326 1.326 0 0 1 1.816 0l3.058 2.677 7.558-8.678a1.326 1.326 0 0 1 1.816 0 1.19 1.19 0 0 1 0 1.736l-8.474 9.546c-.501.479-1.314.479-1.815 0Z";
const DISAPPROVE_PATH: &str = "M18.299 5.327a1.5 1.5 0 0 1 0 2.121l-4.052 4.051 4.052 4.053a1.5 1.5 0 0 1-2.121 2.121l-4.053-4.052-4.051 4.052a1.5 1.5 0 0 1-2.122-2.121l4.052-4.053-4.052-4.051a1.5 1.5 0 1 1 2.122-2.121l4.05 4.051 4.054-4.051a1.5 1.5 0 0 1 2.12 0Z";

static TOP_REVIEW: LazyLock<Selector> =
    LazyLock::new(|| css(".review-details__review-details-module__topReview"));
static RATING: LazyLock<Selector> =
    LazyLock::new(|| css(".review-details__review-details-module__overallRating"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| {
    css(".review-details__review-details-module__detailsLink.review-details__review-details-module__title")
});
static DATE: LazyLock<Selector> =
    LazyLock::new(|| css(".review-details__review-details-module__reviewDate"));
static EMPLOYEE: LazyLock<Selector> =
    LazyLock::new(|| css(".review-details__review-details-module__employee"));
static EMPLOYEE_DETAILS: LazyLock<Selector> =
    LazyLock::new(|| css(".review-details__review-details-module__employeeDetails"));
static LOCATION: LazyLock<Selector> =
    LazyLock::new(|| css(".review-details__review-details-module__location"));
static ICON_CONTAINER_SVG: LazyLock<Selector> =
    LazyLock::new(|| css(".review-details__review-details-module__iconContainer svg"));
static PROS: LazyLock<Selector> = LazyLock::new(|| css(r#"span[data-test="pros"]"#));
static CONS: LazyLock<Selector> = LazyLock::new(|| css(r#"span[data-test="cons"]"#));
static PATH: LazyLock<Selector> = LazyLock::new(|| css("path"));
static NO_OPINION_RECT: LazyLock<Selector> = LazyLock::new(|| css(r#"rect[width="17.461"]"#));
static NOT_APPLICABLE_CIRCLE: LazyLock<Selector> = LazyLock::new(|| css(r#"circle[r="7.5"]"#));

/// Extract every review block on the page, merging in payload sub-ratings by position
pub fn parse(doc: &Html, ratings: &SubRatings) -> Vec<ReviewRecord> {
    doc.select(&TOP_REVIEW)
        .enumerate()
        .map(|(index, review)| {
            let mut record = parse_review(review);
            record.work_life_balance = ratings.work_life_balance.get(index).copied();
            record.culture_and_values = ratings.culture_and_values.get(index).copied();
            record.diversity_and_inclusion = ratings.diversity_and_inclusion.get(index).copied();
            record.senior_leadership = ratings.senior_leadership.get(index).copied();
            record.career_opportunities = ratings.career_opportunities.get(index).copied();
            record.compensation_and_benefits =
                ratings.compensation_and_benefits.get(index).copied();
            record
        })
        .collect()
}

fn parse_review(review: ElementRef<'_>) -> ReviewRecord {
    let sentiments: Vec<Option<Sentiment>> =
        review.select(&ICON_CONTAINER_SVG).map(sentiment).collect();
    let sentiment_at = |i: usize| sentiments.get(i).copied().flatten();

    ReviewRecord {
        rating: first_text(review, &RATING),
        title: first_text(review, &TITLE),
        date: first_text(review, &DATE),
        employee: first_text(review, &EMPLOYEE),
        employee_details: first_text(review, &EMPLOYEE_DETAILS),
        location: first_text(review, &LOCATION),
        recommend: sentiment_at(0),
        ceo_approval: sentiment_at(1),
        business_outlook: sentiment_at(2),
        pro: first_text(review, &PROS),
        con: first_text(review, &CONS),
        ..ReviewRecord::default()
    }
}

/// Decode a sentiment icon by its drawing
fn sentiment(svg: ElementRef<'_>) -> Option<Sentiment> {
    for path in svg.select(&PATH) {
        match path.value().attr("d") {
            Some(APPROVE_PATH) => return Some(Sentiment::Approve),
            Some(DISAPPROVE_PATH) => return Some(Sentiment::Disapprove),
            _ => {}
        }
    }
    if svg.select(&NO_OPINION_RECT).next().is_some() {
        return Some(Sentiment::NoOpinion);
    }
    if svg.select(&NOT_APPLICABLE_CIRCLE).next().is_some() {
        return Some(Sentiment::NotApplicable);
    }
    None
}
