//! Action primitives built on the selector resolver: typed entry,
//! click-with-fallback, modal dismissal, and the precondition-aware step.

use crate::locator::Locator;
use crate::pacing::Pacing;
use crate::resolve::{resolve, ResolveError, Visibility};
use crate::session::{ElementHandle, Session, SessionError};

/// Tri-state outcome of an attempted step.
///
/// `Skipped` means the target was legitimately absent — an already-satisfied
/// precondition, not an error. Failures are `Err(FlowError)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    Skipped,
}

impl StepOutcome {
    pub fn completed(self) -> bool {
        self == StepOutcome::Completed
    }

    pub fn skipped(self) -> bool {
        self == StepOutcome::Skipped
    }
}

/// Whether a step treats an absent target as a satisfied precondition or as a
/// failure. The policy is explicit per step; flows never infer it from logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsencePolicy {
    Required,
    SkipIfAbsent,
}

/// What `click_first` does when every locator is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickFallback {
    /// Signal failure.
    None,
    /// Send Enter to the focused element (submit buttons superseded by an
    /// already-submitted state).
    EnterKey,
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    TargetNotFound(#[from] ResolveError),

    #[error("action failed on {target}: {reason}")]
    ActionFailed { target: String, reason: String },

    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

fn action_failed(target: impl std::fmt::Display, err: SessionError) -> FlowError {
    FlowError::ActionFailed {
        target: target.to_string(),
        reason: err.to_string(),
    }
}

/// Simulate human keystroke-paced entry into an already-resolved input.
///
/// Clears any existing value, appends one character at a time with the
/// inter-character delay, then suspends for the settle delay. Never partially
/// applies a string: the caller resolves the input before any character is
/// sent.
pub async fn typed_entry<S>(
    session: &mut S,
    input: ElementHandle,
    text: &str,
    pacing: &Pacing,
) -> Result<(), FlowError>
where
    S: Session + ?Sized,
{
    session
        .clear(input)
        .await
        .map_err(|e| action_failed("input clear", e))?;

    let mut buf = [0u8; 4];
    for ch in text.chars() {
        session
            .append_value(input, ch.encode_utf8(&mut buf))
            .await
            .map_err(|e| action_failed("keystroke", e))?;
        session.pause(pacing.inter_key_delay()).await;
    }
    session.pause(pacing.settle_delay()).await;
    Ok(())
}

/// Resolve an input field and type into it, honoring the absence policy.
///
/// With [`AbsencePolicy::SkipIfAbsent`] a missing field is a satisfied
/// precondition (e.g. "already logged in") and no character is sent.
pub async fn fill_field<S>(
    session: &mut S,
    locator: &Locator,
    text: &str,
    policy: AbsencePolicy,
    pacing: &Pacing,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    let input = match resolve(session, locator, Visibility::Displayed).await {
        Ok(handle) => handle,
        Err(err) => {
            return match policy {
                AbsencePolicy::SkipIfAbsent => {
                    tracing::warn!(%locator, "field absent, skipping");
                    Ok(StepOutcome::Skipped)
                }
                AbsencePolicy::Required => Err(err.into()),
            }
        }
    };

    typed_entry(session, input, text, pacing).await?;
    Ok(StepOutcome::Completed)
}

/// Click a logical target reachable via any of several locators.
///
/// Each locator is tried fully, in order; the first that resolves receives
/// exactly one click. Exhausting every locator either fails or falls back to
/// a simulated Enter key, per `fallback`. Never performs more than one click
/// for a single logical action.
pub async fn click_first<S>(
    session: &mut S,
    locators: &[Locator],
    fallback: ClickFallback,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    for locator in locators {
        match resolve(session, locator, Visibility::Displayed).await {
            Ok(handle) => {
                session
                    .click(handle)
                    .await
                    .map_err(|e| action_failed(locator, e))?;
                return Ok(StepOutcome::Completed);
            }
            Err(ResolveError::TargetNotFound { .. }) => continue,
        }
    }

    match fallback {
        ClickFallback::EnterKey => {
            tracing::debug!("no click target resolved, sending Enter");
            session
                .press_enter()
                .await
                .map_err(|e| action_failed("enter key", e))?;
            Ok(StepOutcome::Completed)
        }
        ClickFallback::None => {
            let candidates = locators
                .iter()
                .flat_map(|l| l.candidates().iter().cloned())
                .collect();
            Err(ResolveError::TargetNotFound { candidates }.into())
        }
    }
}

/// Click a single required locator.
pub async fn click<S>(session: &mut S, locator: &Locator) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    click_first(session, std::slice::from_ref(locator), ClickFallback::None).await
}

/// Click a target that is legitimately absent in some page states.
pub async fn click_if_present<S>(
    session: &mut S,
    locator: &Locator,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    match resolve(session, locator, Visibility::Displayed).await {
        Ok(handle) => {
            session
                .click(handle)
                .await
                .map_err(|e| action_failed(locator, e))?;
            Ok(StepOutcome::Completed)
        }
        Err(ResolveError::TargetNotFound { .. }) => {
            tracing::debug!(%locator, "optional target absent, skipping");
            Ok(StepOutcome::Skipped)
        }
    }
}

/// Close an open modal or drawer via the first visible close control.
///
/// No visible control means no open modal: that is `Skipped`, not a failure.
pub async fn dismiss_modal<S>(
    session: &mut S,
    close_controls: &[Locator],
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    for locator in close_controls {
        if let Ok(handle) = resolve(session, locator, Visibility::Displayed).await {
            session
                .click(handle)
                .await
                .map_err(|e| action_failed(locator, e))?;
            return Ok(StepOutcome::Completed);
        }
    }
    tracing::debug!("no open modal found to close");
    Ok(StepOutcome::Skipped)
}

/// Cheap check for "is this step already satisfied".
///
/// An inconclusive check (every candidate failed to evaluate) reads as "not
/// yet satisfied": the caller proceeds to the primary action. This check
/// never errors.
pub async fn precondition_met<S>(session: &mut S, marker: &Locator) -> bool
where
    S: Session + ?Sized,
{
    resolve(session, marker, Visibility::Displayed).await.is_ok()
}
