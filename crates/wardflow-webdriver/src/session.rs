use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::key::Key;
use fantoccini::{Client, ClientBuilder, Locator as WdLocator};
use std::collections::HashMap;
use std::time::Duration;
use wardflow_core::{Candidate, ElementHandle, Session, SessionError, Strategy};

/// Handle registry for one session. Ids are monotonic and never reused, so a
/// handle held across a navigation resolves to `ElementStale` rather than
/// aliasing a freshly queried element.
#[derive(Debug)]
struct Registry<T> {
    entries: HashMap<u32, T>,
    next_id: u32,
}

impl<T: Clone> Registry<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_id: 0,
        }
    }

    fn insert(&mut self, value: T) -> ElementHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, value);
        ElementHandle(id)
    }

    fn get(&self, handle: ElementHandle) -> Result<T, SessionError> {
        self.entries
            .get(&handle.0)
            .cloned()
            .ok_or(SessionError::ElementStale { id: handle.0 })
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A live browser session over the WebDriver protocol.
///
/// The registry is cleared on navigation and refresh; handles from before a
/// page change resolve to `ElementStale`.
pub struct WebdriverSession {
    client: Client,
    elements: Registry<Element>,
}

impl WebdriverSession {
    /// Connect to a WebDriver server with the given capabilities.
    pub async fn connect(
        webdriver_url: &str,
        capabilities: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, SessionError> {
        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(webdriver_url)
            .await
            .map_err(|e| {
                SessionError::Driver(format!("failed to connect to {webdriver_url}: {e}"))
            })?;
        tracing::info!(url = webdriver_url, "webdriver session established");
        Ok(Self {
            client,
            elements: Registry::new(),
        })
    }

    /// End the browser session.
    pub async fn close(self) -> Result<(), SessionError> {
        self.client
            .close()
            .await
            .map_err(|e| SessionError::Driver(format!("failed to close session: {e}")))
    }

    fn element(&self, handle: ElementHandle) -> Result<Element, SessionError> {
        self.elements.get(handle)
    }

    fn element_err(handle: ElementHandle, err: CmdError) -> SessionError {
        let msg = err.to_string();
        if msg.contains("stale") {
            SessionError::ElementStale { id: handle.0 }
        } else if msg.contains("not interactable") || msg.contains("intercepted") {
            SessionError::ElementNotInteractable {
                id: handle.0,
                reason: msg,
            }
        } else {
            SessionError::Driver(msg)
        }
    }
}

/// Translate one candidate into a WebDriver locator. Text and aria strategies
/// have no direct WebDriver equivalent and are expressed as XPath/CSS.
fn wire_selector(candidate: &Candidate) -> String {
    match candidate.strategy {
        Strategy::Css | Strategy::XPath => candidate.pattern.clone(),
        Strategy::TextExact => format!(
            "//*[normalize-space(text())={}]",
            xpath_literal(&candidate.pattern)
        ),
        Strategy::TextContains => format!(
            "//*[contains(normalize-space(.), {})]",
            xpath_literal(&candidate.pattern)
        ),
        Strategy::AriaLabel => format!("//*[@aria-label={}]", xpath_literal(&candidate.pattern)),
    }
}

fn uses_css(candidate: &Candidate) -> bool {
    matches!(candidate.strategy, Strategy::Css)
}

/// Quote a string as an XPath literal, handling embedded quotes via concat().
fn xpath_literal(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{value}\"")
    } else if !value.contains('\'') {
        format!("'{value}'")
    } else {
        let parts: Vec<String> = value
            .split('"')
            .map(|part| format!("\"{part}\""))
            .collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}

#[async_trait]
impl Session for WebdriverSession {
    async fn query(&mut self, candidate: &Candidate) -> Result<Vec<ElementHandle>, SessionError> {
        let selector = wire_selector(candidate);
        let locator = if uses_css(candidate) {
            WdLocator::Css(&selector)
        } else {
            WdLocator::XPath(&selector)
        };

        let found = self.client.find_all(locator).await.map_err(|e| {
            let msg = e.to_string();
            if msg.contains("invalid selector") {
                SessionError::SelectorInvalid {
                    selector: selector.clone(),
                }
            } else {
                SessionError::Driver(msg)
            }
        })?;

        Ok(found
            .into_iter()
            .map(|element| self.elements.insert(element))
            .collect())
    }

    async fn is_visible(&mut self, el: ElementHandle) -> Result<bool, SessionError> {
        self.element(el)?
            .is_displayed()
            .await
            .map_err(|e| Self::element_err(el, e))
    }

    async fn value(&mut self, el: ElementHandle) -> Result<String, SessionError> {
        let value = self
            .element(el)?
            .prop("value")
            .await
            .map_err(|e| Self::element_err(el, e))?;
        Ok(value.unwrap_or_default())
    }

    async fn text(&mut self, el: ElementHandle) -> Result<String, SessionError> {
        self.element(el)?
            .text()
            .await
            .map_err(|e| Self::element_err(el, e))
    }

    async fn clear(&mut self, el: ElementHandle) -> Result<(), SessionError> {
        self.element(el)?
            .clear()
            .await
            .map_err(|e| Self::element_err(el, e))
    }

    async fn append_value(&mut self, el: ElementHandle, text: &str) -> Result<(), SessionError> {
        self.element(el)?
            .send_keys(text)
            .await
            .map_err(|e| Self::element_err(el, e))
    }

    async fn click(&mut self, el: ElementHandle) -> Result<(), SessionError> {
        self.element(el)?
            .click()
            .await
            .map_err(|e| Self::element_err(el, e))
    }

    async fn press_enter(&mut self) -> Result<(), SessionError> {
        let active = self
            .client
            .active_element()
            .await
            .map_err(|e| SessionError::Driver(e.to_string()))?;
        let enter = char::from(Key::Enter).to_string();
        active
            .send_keys(&enter)
            .await
            .map_err(|e| SessionError::Driver(e.to_string()))
    }

    async fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        self.elements.clear();
        self.client
            .goto(url)
            .await
            .map_err(|e| SessionError::Navigation(e.to_string()))
    }

    async fn refresh(&mut self) -> Result<(), SessionError> {
        self.elements.clear();
        self.client
            .refresh()
            .await
            .map_err(|e| SessionError::Navigation(e.to_string()))
    }

    async fn execute_script(&mut self, script: &str) -> Result<serde_json::Value, SessionError> {
        self.client
            .execute(script, vec![])
            .await
            .map_err(|e| SessionError::ScriptError(e.to_string()))
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, SessionError> {
        self.client
            .screenshot()
            .await
            .map_err(|e| SessionError::Driver(e.to_string()))
    }

    async fn pause(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
