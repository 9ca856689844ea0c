use crate::parsers::{css, element_text, first_text};
use crate::records::{InterviewRecord, NOT_PROVIDED};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static INTERVIEW_LIST: LazyLock<Selector> =
    LazyLock::new(|| css(r#"div[data-test="InterviewList"]"#));
static ROW: LazyLock<Selector> = LazyLock::new(|| css("div.row"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| css("h2[data-test]"));
static APPLICATION: LazyLock<Selector> = LazyLock::new(|| css("div.mt[data-test]"));
static STRONG: LazyLock<Selector> = LazyLock::new(|| css("strong"));
static QUESTIONS_HEADING: LazyLock<Selector> = LazyLock::new(|| css("strong.d-block.mb-xsm"));

/// Extract interview entries; a page without an interview list yields none
pub fn parse(doc: &Html) -> Vec<InterviewRecord> {
    let Some(list) = doc.select(&INTERVIEW_LIST).next() else {
        ::log::info!("No interview list found");
        return Vec::new();
    };

    list.select(&ROW).map(parse_row).collect()
}

fn parse_row(row: ElementRef<'_>) -> InterviewRecord {
    let interview = row
        .select(&STRONG)
        .find(|strong| element_text(*strong) == "Interview")
        .and_then(|heading| following_element(row, heading, |e| e.value().name() == "p"))
        .map(element_text)
        .filter(|text| !text.is_empty());

    let question = row
        .select(&QUESTIONS_HEADING)
        .find(|strong| element_text(*strong) == "Interview Questions")
        .and_then(|heading| following_element(row, heading, |_| true))
        .map(element_text)
        .filter(|text| !text.is_empty());

    InterviewRecord {
        title: first_text(row, &TITLE),
        application: first_text(row, &APPLICATION),
        interview,
        question: question.unwrap_or_else(|| NOT_PROVIDED.to_string()),
    }
}

/// First element inside `scope` that comes after `anchor` in document order
/// and satisfies `accept`
fn following_element<'a>(
    scope: ElementRef<'a>,
    anchor: ElementRef<'a>,
    accept: impl Fn(&ElementRef<'a>) -> bool,
) -> Option<ElementRef<'a>> {
    scope
        .descendants()
        .skip_while(|node| node.id() != anchor.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|element| accept(element))
}
