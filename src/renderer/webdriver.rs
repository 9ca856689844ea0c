use crate::config::BrowserOptions;
use crate::error::PageError;
use crate::records::DiversityRecord;
use crate::renderer::{Identity, PageRenderer, RendererFactory, diversity};
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Value, json};
use std::time::Duration;

/// Opens Chrome sessions on a WebDriver server
#[derive(Debug, Clone)]
pub struct WebDriverFactory {
    webdriver_url: String,
    options: BrowserOptions,
}

impl WebDriverFactory {
    pub fn new(webdriver_url: &str, options: BrowserOptions) -> Self {
        Self {
            webdriver_url: webdriver_url.to_string(),
            options,
        }
    }
}

#[async_trait]
impl RendererFactory for WebDriverFactory {
    type Renderer = WebDriverRenderer;

    async fn create(&self, identity: &Identity) -> Result<WebDriverRenderer, PageError> {
        let capabilities = chrome_capabilities(&self.options, identity);

        match ClientBuilder::native()
            .capabilities(capabilities)
            .connect(&self.webdriver_url)
            .await
        {
            Ok(client) => {
                ::log::debug!(
                    "Connected to WebDriver at {} as {}",
                    self.webdriver_url,
                    identity.user_agent
                );
                Ok(WebDriverRenderer { client })
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
                ::log::error!(
                    "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
                );
                Err(PageError::RendererFault(format!(
                    "cannot open a session on {}: {}",
                    self.webdriver_url, e
                )))
            }
        }
    }
}

/// Chrome capabilities for one session
pub fn chrome_capabilities(options: &BrowserOptions, identity: &Identity) -> Capabilities {
    let mut args = vec![
        format!(
            "--window-size={},{}",
            options.window_width, options.window_height
        ),
        format!("--user-agent={}", identity.user_agent),
    ];
    if options.headless {
        args.push("--headless".to_string());
    }

    let mut chrome = json!({ "args": args });
    if options.disable_images {
        chrome["prefs"] = json!({
            "profile.default_content_settings": { "images": 2 },
            "profile.managed_default_content_settings": { "images": 2 },
        });
    }

    let mut capabilities = Capabilities::new();
    capabilities.insert("browserName".to_string(), json!("chrome"));
    capabilities.insert("goog:chromeOptions".to_string(), chrome);
    capabilities
}

/// A live WebDriver session
pub struct WebDriverRenderer {
    client: Client,
}

#[async_trait]
impl PageRenderer for WebDriverRenderer {
    async fn navigate(&mut self, url: &str) -> Result<(), PageError> {
        self.client
            .goto(url)
            .await
            .map_err(|e| classify_cmd_error(e, "navigating to", url))
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), PageError> {
        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
        {
            Ok(_) => Ok(()),
            Err(CmdError::WaitTimeout) => Err(PageError::PageLoadTimeout {
                condition: selector.to_string(),
                timeout,
            }),
            Err(e) => Err(classify_cmd_error(e, "waiting for", selector)),
        }
    }

    async fn rendered_html(&mut self) -> Result<String, PageError> {
        self.client
            .source()
            .await
            .map_err(|e| classify_cmd_error(e, "getting source for", "current page"))
    }

    async fn execute_script(&mut self, script: &str) -> Result<String, PageError> {
        let value = self
            .client
            .execute(script, Vec::new())
            .await
            .map_err(|e| classify_cmd_error(e, "executing script on", "current page"))?;

        Ok(match value {
            Value::String(text) => text,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    async fn close(&mut self) -> Result<(), PageError> {
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| classify_cmd_error(e, "closing", "session"))
    }

    async fn diversity_breakdown(
        &mut self,
        url: &str,
        timeout: Duration,
    ) -> Result<Vec<DiversityRecord>, PageError> {
        diversity::run(&self.client, url, timeout).await
    }
}

/// Maps a WebDriver command error onto the page error taxonomy
pub fn classify_cmd_error(error: CmdError, context: &str, target: &str) -> PageError {
    if error.is_no_such_element() {
        return PageError::ElementNotFound(format!("{context} {target}: {error}"));
    }

    match error {
        CmdError::WaitTimeout => PageError::PageLoadTimeout {
            condition: format!("{context} {target}"),
            timeout: Duration::ZERO,
        },
        CmdError::Lost(e) => {
            ::log::warn!("Lost WebDriver connection while {} {}", context, target);
            PageError::RendererFault(e.to_string())
        }
        other => {
            let message = other.to_string();
            if is_session_loss(&message) {
                ::log::warn!("Lost session while {} {}", context, target);
                PageError::RendererFault(message)
            } else if message.to_lowercase().contains("timeout") {
                PageError::PageLoadTimeout {
                    condition: format!("{context} {target}"),
                    timeout: Duration::ZERO,
                }
            } else {
                PageError::Unclassified(format!("{context} {target}: {message}"))
            }
        }
    }
}

fn is_session_loss(message: &str) -> bool {
    message.contains("Unable to find session")
        || message.contains("invalid session id")
        || message.contains("session deleted")
        || message.contains("chrome not reachable")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            user_agent: "TestAgent/1.0".to_string(),
        }
    }

    #[test]
    fn test_capabilities_carry_identity_and_options() {
        let caps = chrome_capabilities(&BrowserOptions::default(), &identity());
        let chrome = &caps["goog:chromeOptions"];
        let args: Vec<&str> = chrome["args"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a.as_str().unwrap())
            .collect();

        assert!(args.contains(&"--user-agent=TestAgent/1.0"));
        assert!(args.contains(&"--window-size=1920,1080"));
        assert!(args.contains(&"--headless"));
        assert_eq!(
            chrome["prefs"]["profile.managed_default_content_settings"]["images"],
            json!(2)
        );
    }

    #[test]
    fn test_headed_session_keeps_images_when_asked() {
        let options = BrowserOptions {
            headless: false,
            disable_images: false,
            ..BrowserOptions::default()
        };
        let caps = chrome_capabilities(&options, &identity());
        let chrome = &caps["goog:chromeOptions"];

        assert!(chrome.get("prefs").is_none());
        assert!(
            !chrome["args"]
                .as_array()
                .unwrap()
                .contains(&json!("--headless"))
        );
    }

    #[test]
    fn test_wait_timeout_classification() {
        let error = classify_cmd_error(CmdError::WaitTimeout, "waiting for", "div.x");
        assert!(matches!(error, PageError::PageLoadTimeout { .. }));
    }

    #[test]
    fn test_session_loss_detection() {
        assert!(is_session_loss("invalid session id: session deleted"));
        assert!(is_session_loss("Unable to find session with ID abc"));
        assert!(!is_session_loss("stale element reference"));
    }
}
