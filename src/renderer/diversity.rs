//! Dropdown and modal choreography for the diversity breakdown page.
//!
//! The page exposes each demographic only through a modal, so this walks the
//! group dropdown, opens every demographic button and reads the modal before
//! closing it again.

use crate::error::PageError;
use crate::records::DiversityRecord;
use crate::renderer::webdriver::classify_cmd_error;
use crate::utils::jittered_delay;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, Locator};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

const DROPDOWN: &str = ".css-xjxhjz.egu3u860";
const SELECTED_LABEL: &str = ".selectedLabel";
const DROPDOWN_OPTION: &str = ".css-xjxhjz.egu3u860 .dropdownOption";
const DEMOGRAPHIC_BUTTONS: &str = ".d-flex.flex-wrap.demographicOptions";
const MODAL: &str = ".modal_content";
const MODAL_TITLE: &str = "h2.mt-0.mb.css-93svrw.el6ke055";
const MODAL_STARS: &str = "span.my-0.mr-xsm.gd-ui-star.css-1dq5rja.el6ke054";
const MODAL_PERCENTAGES: &str = "tspan.emtn-lc7fha";
const MODAL_RATING_BARS: &str =
    "div.ratingBarFill.d-flex.justify-content-end.align-items-center.px-xsm";
const MODAL_CLOSE: &str = "//span[@alt='Close']";

const SCROLL_OPTION_INTO_VIEW: &str =
    "arguments[0].parentNode.scrollTop = arguments[0].parentNode.scrollHeight";

/// Run the full interaction on `url` and collect one record per demographic
pub async fn run(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<Vec<DiversityRecord>, PageError> {
    let mut rng = StdRng::from_entropy();

    client
        .goto(url)
        .await
        .map_err(|e| classify_cmd_error(e, "navigating to", url))?;

    let dropdown = wait_for(client, Locator::Css(DROPDOWN), DROPDOWN, timeout).await?;
    jittered_delay(&mut rng, 1.0, 3.0).await;

    let selected_label = dropdown
        .find(Locator::Css(SELECTED_LABEL))
        .await
        .map_err(|e| classify_cmd_error(e, "finding", SELECTED_LABEL))?;
    selected_label
        .click()
        .await
        .map_err(|e| classify_cmd_error(e, "opening", SELECTED_LABEL))?;

    wait_for(client, Locator::Css(DROPDOWN_OPTION), DROPDOWN_OPTION, timeout).await?;
    let options = client
        .find_all(Locator::Css(DROPDOWN_OPTION))
        .await
        .map_err(|e| classify_cmd_error(e, "listing", DROPDOWN_OPTION))?;

    let mut records = Vec::new();
    for (index, option) in options.iter().enumerate() {
        if index + 1 == options.len() {
            // The last option sits below the dropdown's fold
            let arg = serde_json::to_value(option)
                .map_err(|e| PageError::Unclassified(e.to_string()))?;
            client
                .execute(SCROLL_OPTION_INTO_VIEW, vec![arg])
                .await
                .map_err(|e| classify_cmd_error(e, "scrolling", DROPDOWN_OPTION))?;
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        option
            .click()
            .await
            .map_err(|e| classify_cmd_error(e, "selecting", DROPDOWN_OPTION))?;

        let buttons_div = wait_for(
            client,
            Locator::Css(DEMOGRAPHIC_BUTTONS),
            DEMOGRAPHIC_BUTTONS,
            timeout,
        )
        .await?;
        let buttons = buttons_div
            .find_all(Locator::Css("button"))
            .await
            .map_err(|e| classify_cmd_error(e, "listing", DEMOGRAPHIC_BUTTONS))?;

        for button in &buttons {
            button
                .click()
                .await
                .map_err(|e| classify_cmd_error(e, "opening modal from", DEMOGRAPHIC_BUTTONS))?;
            let modal = wait_for(client, Locator::Css(MODAL), MODAL, timeout).await?;
            records.push(read_modal(&modal).await?);
            close_modal(client, timeout).await?;
        }

        ::log::debug!(
            "Diversity option {} of {} yielded {} breakdowns so far",
            index + 1,
            options.len(),
            records.len()
        );
        jittered_delay(&mut rng, 1.0, 3.0).await;

        selected_label
            .click()
            .await
            .map_err(|e| classify_cmd_error(e, "reopening", SELECTED_LABEL))?;
    }

    Ok(records)
}

async fn read_modal(modal: &Element) -> Result<DiversityRecord, PageError> {
    let title = optional_text(modal, MODAL_TITLE).await;
    let stars = optional_text(modal, MODAL_STARS).await;
    let percentages = all_text(modal, MODAL_PERCENTAGES).await?;
    let ratings = all_text(modal, MODAL_RATING_BARS).await?;

    Ok(DiversityRecord::from_modal(title, stars, &percentages, &ratings))
}

async fn close_modal(client: &Client, timeout: Duration) -> Result<(), PageError> {
    let close = wait_for(client, Locator::XPath(MODAL_CLOSE), MODAL_CLOSE, timeout).await?;
    close
        .click()
        .await
        .map_err(|e| classify_cmd_error(e, "closing", MODAL))?;

    // Wait for the modal to go away before the next button
    let gone = tokio::time::timeout(timeout, async {
        loop {
            match client.find(Locator::XPath(MODAL_CLOSE)).await {
                Err(e) if e.is_no_such_element() => return,
                _ => tokio::time::sleep(Duration::from_millis(200)).await,
            }
        }
    })
    .await;

    gone.map_err(|_| PageError::PageLoadTimeout {
        condition: format!("{MODAL} to close"),
        timeout,
    })
}

async fn wait_for(
    client: &Client,
    locator: Locator<'_>,
    label: &str,
    timeout: Duration,
) -> Result<Element, PageError> {
    client
        .wait()
        .at_most(timeout)
        .for_element(locator)
        .await
        .map_err(|e| match e {
            CmdError::WaitTimeout => PageError::PageLoadTimeout {
                condition: label.to_string(),
                timeout,
            },
            other => classify_cmd_error(other, "waiting for", label),
        })
}

async fn optional_text(scope: &Element, selector: &str) -> Option<String> {
    let element = scope.find(Locator::Css(selector)).await.ok()?;
    element.text().await.ok().map(|t| t.trim().to_string())
}

async fn all_text(scope: &Element, selector: &str) -> Result<Vec<String>, PageError> {
    let elements = scope
        .find_all(Locator::Css(selector))
        .await
        .map_err(|e| classify_cmd_error(e, "listing", selector))?;

    let mut texts = Vec::with_capacity(elements.len());
    for element in elements {
        let text = element
            .text()
            .await
            .map_err(|e| classify_cmd_error(e, "reading", selector))?;
        texts.push(text.trim().to_string());
    }
    Ok(texts)
}
