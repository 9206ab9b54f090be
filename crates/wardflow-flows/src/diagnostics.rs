//! Failure-time diagnostics.
//!
//! Diagnostic probes never fail the flow that invoked them: a broken page is
//! exactly when they run, so every fallible step inside degrades to "unknown".

use wardflow_core::{Candidate, FlowError, Session, Strategy};

const INTERACTIVE_PROBE: &str = "button, a, input, select, textarea";
const DUMP_LIMIT: usize = 40;

/// Log a capped inventory of interactive elements on the current page.
pub async fn dump_interactive<S>(session: &mut S)
where
    S: Session + ?Sized,
{
    let candidate = Candidate::new(Strategy::Css, INTERACTIVE_PROBE);
    let handles = match session.query(&candidate).await {
        Ok(handles) => handles,
        Err(err) => {
            tracing::warn!(error = %err, "interactive element dump unavailable");
            return;
        }
    };

    tracing::warn!(count = handles.len(), "interactive elements on page");
    for handle in handles.into_iter().take(DUMP_LIMIT) {
        let visible = session.is_visible(handle).await.unwrap_or(false);
        let text = session.text(handle).await.unwrap_or_default();
        let text = text.trim();
        if !text.is_empty() {
            tracing::warn!(id = handle.0, visible, text, "interactive element");
        }
    }
}

/// Visible texts of every button on the page, for "not found" error messages.
pub(crate) async fn visible_button_texts<S>(session: &mut S) -> Vec<String>
where
    S: Session + ?Sized,
{
    let candidate = Candidate::new(Strategy::Css, "button");
    let handles = session.query(&candidate).await.unwrap_or_default();

    let mut texts = Vec::new();
    for handle in handles {
        if session.is_visible(handle).await.unwrap_or(false) {
            let text = session.text(handle).await.unwrap_or_default();
            let text = text.trim();
            if !text.is_empty() {
                texts.push(text.to_string());
            }
        }
    }
    texts
}

/// Full visible text of the page body.
pub(crate) async fn page_text<S>(session: &mut S) -> Result<String, FlowError>
where
    S: Session + ?Sized,
{
    let value = session
        .execute_script("return document.body.innerText")
        .await?;
    Ok(value.as_str().unwrap_or_default().to_string())
}
