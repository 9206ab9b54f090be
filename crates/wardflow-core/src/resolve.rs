//! Selector resolution: turn a [`Locator`] into zero-or-one element handle.
//!
//! Candidates are tried strictly in list order. A candidate that fails to
//! evaluate (bad selector, driver fault) is skipped, not fatal — an evaluation
//! failure is not the same as a candidate correctly evaluating to zero
//! matches. A candidate matching several elements always yields the first in
//! document order; callers needing a specific element pre-scope the locator.
//!
//! There are no retries here. Temporal tolerance belongs to
//! [`crate::wait::wait_for`].

use crate::locator::{Candidate, Locator};
use crate::session::{ElementHandle, Session};

/// Whether a resolved element must be displayed or merely present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Displayed,
    Present,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    #[error("target not found, tried {} candidate(s): {}", candidates.len(), render(candidates))]
    TargetNotFound { candidates: Vec<Candidate> },
}

fn render(candidates: &[Candidate]) -> String {
    let parts: Vec<String> = candidates.iter().map(|c| c.to_string()).collect();
    parts.join(", ")
}

/// Resolve a locator against the live document.
///
/// Returns the first match of the first candidate that has at least one match
/// and, under [`Visibility::Displayed`], whose first match reports itself
/// visible. Exhausting the list yields [`ResolveError::TargetNotFound`]
/// carrying the full candidate list for diagnostics; a non-visible or wrong
/// element is never returned silently.
pub async fn resolve<S>(
    session: &mut S,
    locator: &Locator,
    visibility: Visibility,
) -> Result<ElementHandle, ResolveError>
where
    S: Session + ?Sized,
{
    for candidate in locator.candidates() {
        let handles = match session.query(candidate).await {
            Ok(handles) => handles,
            Err(err) => {
                tracing::debug!(%candidate, error = %err, "candidate failed to evaluate, trying next");
                continue;
            }
        };

        let Some(&first) = handles.first() else {
            continue;
        };

        if visibility == Visibility::Displayed {
            match session.is_visible(first).await {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    tracing::debug!(%candidate, error = %err, "visibility check failed, trying next");
                    continue;
                }
            }
        }

        return Ok(first);
    }

    Err(ResolveError::TargetNotFound {
        candidates: locator.candidates().to_vec(),
    })
}
