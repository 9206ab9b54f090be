//! Authentication flow.

use crate::config::FlowConfig;
use wardflow_core::{
    click_first, resolve, typed_entry, wait_for, ClickFallback, FlowError, Locator, StepOutcome,
    Visibility,
};

fn username_field() -> Locator {
    Locator::css(r#"[name="username"]"#)
}

fn password_field() -> Locator {
    Locator::css(r#"[name="password"]"#)
}

fn submit_controls() -> Vec<Locator> {
    vec![
        Locator::css(r#"[name="submit"]"#),
        Locator::css("button[type='submit']"),
        Locator::xpath(r#"//button[contains(., "Sign in")]"#),
        Locator::xpath(r#"//input[@type="submit"]"#),
    ]
}

/// Something only a signed-in user sees: the application menu.
fn signed_in_marker() -> Locator {
    Locator::text("Ticketing")
        .or_text("Triage")
        .or_css(".ant-menu")
}

/// Sign in with the configured credentials.
///
/// The username field doubles as the precondition marker: if it is absent the
/// session is already authenticated and the flow skips without touching a
/// single field. Otherwise both credentials are typed with keystroke pacing
/// and the submit control is clicked exactly once, falling back to Enter when
/// no known submit control resolves.
pub async fn login<S>(session: &mut S, config: &FlowConfig) -> Result<StepOutcome, FlowError>
where
    S: wardflow_core::Session + ?Sized,
{
    tracing::info!(url = %config.base_url, "opening application");
    session.navigate(&config.base_url).await?;

    let username = match resolve(session, &username_field(), Visibility::Displayed).await {
        Ok(handle) => handle,
        Err(_) => {
            tracing::info!("login form absent, session already authenticated");
            return Ok(StepOutcome::Skipped);
        }
    };

    typed_entry(
        session,
        username,
        &config.credentials.username,
        &config.pacing,
    )
    .await?;

    let password = resolve(session, &password_field(), Visibility::Displayed).await?;
    typed_entry(
        session,
        password,
        &config.credentials.password,
        &config.pacing,
    )
    .await?;

    click_first(session, &submit_controls(), ClickFallback::EnterKey).await?;

    wait_for(
        session,
        &signed_in_marker(),
        Visibility::Displayed,
        config.pacing.wait_timeout(),
        config.pacing.poll_interval(),
    )
    .await?;

    tracing::info!("signed in");
    Ok(StepOutcome::Completed)
}
