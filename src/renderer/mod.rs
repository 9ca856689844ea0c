pub mod diversity;
pub mod webdriver;

use crate::error::PageError;
use crate::records::DiversityRecord;
use async_trait::async_trait;
use std::time::Duration;

/// Script that returns the text of the `<script>` carrying `window.appCache`
pub const APP_CACHE_SCRIPT: &str = r#"
    var scripts = document.getElementsByTagName('script');
    for (var i = 0; i < scripts.length; i++) {
        if (scripts[i].textContent.includes('window.appCache')) {
            return scripts[i].textContent;
        }
    }
    return '';
"#;

/// Randomized browser identity a session is created with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_agent: String,
}

/// Condition that decides a page has finished rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// Read the page as soon as navigation returns
    Immediate,
    /// Wait for a CSS selector to match, bounded by a timeout
    Element { selector: String, timeout: Duration },
    /// Wait a fixed duration
    Delay(Duration),
}

impl Readiness {
    pub fn element(selector: &str, timeout: Duration) -> Self {
        Readiness::Element {
            selector: selector.to_string(),
            timeout,
        }
    }
}

/// Rendered content of one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    pub url: String,
    pub html: String,
    /// Embedded script text, when it was asked for
    pub payload: Option<String>,
}

/// A controlled browser tab
#[async_trait]
pub trait PageRenderer: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), PageError>;

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), PageError>;

    async fn rendered_html(&mut self) -> Result<String, PageError>;

    /// Run `script` in the page and return its result as text
    async fn execute_script(&mut self, script: &str) -> Result<String, PageError>;

    async fn close(&mut self) -> Result<(), PageError>;

    /// Click through the diversity breakdown on the page at `url`
    async fn diversity_breakdown(
        &mut self,
        url: &str,
        _timeout: Duration,
    ) -> Result<Vec<DiversityRecord>, PageError> {
        Err(PageError::Unclassified(format!(
            "diversity interaction is not supported by this renderer: {url}"
        )))
    }
}

/// Creates renderers for a given identity
#[async_trait]
pub trait RendererFactory: Send + Sync {
    type Renderer: PageRenderer;

    async fn create(&self, identity: &Identity) -> Result<Self::Renderer, PageError>;
}

/// Navigate, wait until ready and read the rendered page
pub async fn fetch<R>(
    renderer: &mut R,
    url: &str,
    readiness: &Readiness,
    with_payload: bool,
) -> Result<RenderedPage, PageError>
where
    R: PageRenderer + ?Sized,
{
    ::log::debug!("FETCH: {}", url);
    let started = std::time::Instant::now();

    renderer.navigate(url).await?;

    match readiness {
        Readiness::Immediate => {}
        Readiness::Element { selector, timeout } => renderer.wait_for(selector, *timeout).await?,
        Readiness::Delay(delay) => tokio::time::sleep(*delay).await,
    }

    let payload = if with_payload {
        Some(renderer.execute_script(APP_CACHE_SCRIPT).await?)
    } else {
        None
    };
    let html = renderer.rendered_html().await?;

    ::log::debug!(
        "Rendered {} ({} bytes) in {:.2} seconds",
        url,
        html.len(),
        started.elapsed().as_secs_f64()
    );

    Ok(RenderedPage {
        url: url.to_string(),
        html,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakePage, FakeRenderer, Script};

    #[tokio::test]
    async fn test_fetch_waits_and_reads_payload() {
        let script = Script::new()
            .page("https://x/1", FakePage::html("<p>one</p>").payload("window.appCache={}"));
        let mut renderer = FakeRenderer::new(script.clone());

        let readiness = Readiness::element("div.paginationFooter", Duration::from_secs(1));
        let page = fetch(&mut renderer, "https://x/1", &readiness, true).await.unwrap();

        assert_eq!(page.html, "<p>one</p>");
        assert_eq!(page.payload.as_deref(), Some("window.appCache={}"));
        assert_eq!(script.visits(), vec!["https://x/1".to_string()]);
        assert_eq!(script.waits(), vec!["div.paginationFooter".to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_propagates_readiness_timeout() {
        let script = Script::new().page("https://x/1", FakePage::timeout());
        let mut renderer = FakeRenderer::new(script);

        let readiness = Readiness::element("div.paginationFooter", Duration::from_secs(1));
        let result = fetch(&mut renderer, "https://x/1", &readiness, false).await;

        assert!(matches!(result, Err(PageError::PageLoadTimeout { .. })));
    }

    #[tokio::test]
    async fn test_fetch_without_payload() {
        let script = Script::new().page("https://x/2", FakePage::html("<p/>"));
        let mut renderer = FakeRenderer::new(script);

        let page = fetch(&mut renderer, "https://x/2", &Readiness::Immediate, false)
            .await
            .unwrap();
        assert_eq!(page.payload, None);
        assert_eq!(page.url, "https://x/2");
    }
}
