//! The browser automation client abstraction.
//!
//! Every action primitive and flow helper takes a session explicitly; there is
//! no ambient "current browser". This keeps scenarios isolated (one session per
//! scenario, no shared state) and makes every component testable against a
//! mock session.

use crate::locator::Candidate;
use async_trait::async_trait;
use std::time::Duration;

/// Opaque handle to a single DOM node.
///
/// Valid only until the next navigation; sessions may invalidate all
/// outstanding handles when the page changes. Never persisted or serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u32);

#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Invalid selector: {selector}")]
    SelectorInvalid { selector: String },

    #[error("Element {id} is stale (removed from DOM)")]
    ElementStale { id: u32 },

    #[error("Element {id} is not interactable: {reason}")]
    ElementNotInteractable { id: u32, reason: String },

    #[error("Script execution error: {0}")]
    ScriptError(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Not supported: {0}")]
    NotSupported(String),
}

/// The capability surface consumed from the browser automation client.
///
/// Four groups: query, introspection, mutation, and session-level operations.
/// Nothing is exposed back to the client beyond these calls.
#[async_trait]
pub trait Session: Send + Sync {
    /// Query the document for all elements matching one candidate, in document
    /// order. Zero matches is `Ok(vec![])`; an evaluation failure (malformed
    /// selector, driver fault) is `Err`.
    async fn query(&mut self, candidate: &Candidate) -> Result<Vec<ElementHandle>, SessionError>;

    /// Whether the element is currently displayed (not just present).
    async fn is_visible(&mut self, el: ElementHandle) -> Result<bool, SessionError>;

    /// Current value of an input element.
    async fn value(&mut self, el: ElementHandle) -> Result<String, SessionError>;

    /// Visible text content of an element.
    async fn text(&mut self, el: ElementHandle) -> Result<String, SessionError>;

    /// Clear any existing value from an input element.
    async fn clear(&mut self, el: ElementHandle) -> Result<(), SessionError>;

    /// Append text to the element's current value (keystroke semantics).
    async fn append_value(&mut self, el: ElementHandle, text: &str) -> Result<(), SessionError>;

    /// Click an element.
    async fn click(&mut self, el: ElementHandle) -> Result<(), SessionError>;

    /// Send an Enter keypress to the currently focused element.
    async fn press_enter(&mut self) -> Result<(), SessionError>;

    /// Navigate to a URL. Invalidates all outstanding element handles.
    async fn navigate(&mut self, url: &str) -> Result<(), SessionError>;

    /// Reload the current page. Invalidates all outstanding element handles.
    async fn refresh(&mut self) -> Result<(), SessionError> {
        Err(SessionError::NotSupported("refresh".into()))
    }

    /// Execute a script against the page and return its result.
    async fn execute_script(&mut self, script: &str) -> Result<serde_json::Value, SessionError>;

    /// Capture a screenshot of the current viewport.
    async fn screenshot(&mut self) -> Result<Vec<u8>, SessionError> {
        Err(SessionError::NotSupported("screenshot".into()))
    }

    /// Suspend the calling sequence. All pacing and polling delays go through
    /// this so mock sessions can make time a no-op.
    async fn pause(&mut self, duration: Duration);
}
