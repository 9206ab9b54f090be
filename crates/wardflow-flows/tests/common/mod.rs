#![allow(dead_code)]

use async_trait::async_trait;
use std::time::Duration;
use wardflow_core::{Candidate, ElementHandle, Pacing, Session, SessionError, Strategy};
use wardflow_flows::{Credentials, FlowConfig};

#[derive(Debug, Default)]
pub struct FakeElement {
    pub selectors: Vec<String>,
    pub text: String,
    pub aria: Option<String>,
    pub visible: bool,
    pub value: String,
    pub clicks: usize,
}

impl FakeElement {
    pub fn new(selectors: &[&str]) -> Self {
        Self {
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
            visible: true,
            ..Default::default()
        }
    }

    pub fn labeled(text: &str) -> Self {
        Self::new(&[]).with_text(text)
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_aria(mut self, aria: &str) -> Self {
        self.aria = Some(aria.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Fake application page: elements match candidates by literal selector
/// string, exact/partial text, or aria-label.
#[derive(Debug, Default)]
pub struct FakePage {
    pub elements: Vec<FakeElement>,
    pub body_text: String,
    /// When set, every script evaluation fails.
    pub script_error: bool,
    pub navigations: Vec<String>,
    pub refreshes: usize,
    pub enter_presses: usize,
    pub append_count: usize,
    pub pause_count: usize,
}

impl FakePage {
    pub fn with_elements(elements: Vec<FakeElement>) -> Self {
        Self {
            elements,
            ..Default::default()
        }
    }

    fn element(&self, handle: ElementHandle) -> Result<&FakeElement, SessionError> {
        self.elements
            .get(handle.0 as usize)
            .ok_or(SessionError::ElementStale { id: handle.0 })
    }

    fn element_mut(&mut self, handle: ElementHandle) -> Result<&mut FakeElement, SessionError> {
        self.elements
            .get_mut(handle.0 as usize)
            .ok_or(SessionError::ElementStale { id: handle.0 })
    }

    fn matches(element: &FakeElement, candidate: &Candidate) -> bool {
        match candidate.strategy {
            Strategy::Css | Strategy::XPath => element.selectors.contains(&candidate.pattern),
            Strategy::TextExact => element.text == candidate.pattern,
            Strategy::TextContains => element.text.contains(&candidate.pattern),
            Strategy::AriaLabel => element.aria.as_deref() == Some(candidate.pattern.as_str()),
        }
    }

    pub fn total_clicks(&self) -> usize {
        self.elements.iter().map(|e| e.clicks).sum()
    }

    pub fn clicks_on(&self, text: &str) -> usize {
        self.elements
            .iter()
            .filter(|e| e.text == text)
            .map(|e| e.clicks)
            .sum()
    }

    pub fn value_of(&self, selector: &str) -> String {
        self.elements
            .iter()
            .find(|e| e.selectors.iter().any(|s| s == selector))
            .map(|e| e.value.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Session for FakePage {
    async fn query(&mut self, candidate: &Candidate) -> Result<Vec<ElementHandle>, SessionError> {
        Ok(self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, e)| Self::matches(e, candidate))
            .map(|(i, _)| ElementHandle(i as u32))
            .collect())
    }

    async fn is_visible(&mut self, el: ElementHandle) -> Result<bool, SessionError> {
        Ok(self.element(el)?.visible)
    }

    async fn value(&mut self, el: ElementHandle) -> Result<String, SessionError> {
        Ok(self.element(el)?.value.clone())
    }

    async fn text(&mut self, el: ElementHandle) -> Result<String, SessionError> {
        Ok(self.element(el)?.text.clone())
    }

    async fn clear(&mut self, el: ElementHandle) -> Result<(), SessionError> {
        self.element_mut(el)?.value.clear();
        Ok(())
    }

    async fn append_value(&mut self, el: ElementHandle, text: &str) -> Result<(), SessionError> {
        self.append_count += 1;
        self.element_mut(el)?.value.push_str(text);
        Ok(())
    }

    async fn click(&mut self, el: ElementHandle) -> Result<(), SessionError> {
        self.element_mut(el)?.clicks += 1;
        Ok(())
    }

    async fn press_enter(&mut self) -> Result<(), SessionError> {
        self.enter_presses += 1;
        Ok(())
    }

    async fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        self.navigations.push(url.to_string());
        Ok(())
    }

    async fn refresh(&mut self) -> Result<(), SessionError> {
        self.refreshes += 1;
        Ok(())
    }

    async fn execute_script(&mut self, script: &str) -> Result<serde_json::Value, SessionError> {
        if self.script_error {
            return Err(SessionError::ScriptError(
                "script evaluation failed".to_string(),
            ));
        }
        if script.contains("document.body.innerText") {
            Ok(serde_json::Value::String(self.body_text.clone()))
        } else {
            Ok(serde_json::Value::Null)
        }
    }

    async fn pause(&mut self, _duration: Duration) {
        self.pause_count += 1;
    }
}

/// Config with pacing fast enough for tests; delays are counted, not slept.
pub fn fast_config() -> FlowConfig {
    FlowConfig {
        base_url: "http://hospital.test/".to_string(),
        credentials: Credentials {
            username: "reception".to_string(),
            password: "s3cret".to_string(),
        },
        pacing: Pacing {
            inter_key_delay_ms: 0,
            settle_delay_ms: 0,
            wait_timeout_ms: 20,
            poll_interval_ms: 1,
        },
    }
}

/// A signed-in page skeleton: no login form, main menu visible.
pub fn signed_in_elements() -> Vec<FakeElement> {
    vec![
        FakeElement::labeled("Ticketing"),
        FakeElement::labeled("Triage"),
        FakeElement::labeled("Patient Management"),
    ]
}
