//! Shared menu navigation.

use crate::auth::login;
use crate::config::FlowConfig;
use wardflow_core::{click, wait_for, FlowError, Locator, Session, Visibility};

/// A main-menu or submenu entry. Menu labels render as plain text, links, or
/// spans depending on nesting depth, so every shape is a candidate.
pub(crate) fn menu_item(label: &str) -> Locator {
    Locator::text(label)
        .or_xpath(format!(r#"//a[normalize-space(.)="{label}"]"#))
        .or_xpath(format!(r#"//span[normalize-space(.)="{label}"]"#))
}

/// Sign in (or reuse the active session) and open one main-menu section.
pub(crate) async fn open_section<S>(
    session: &mut S,
    config: &FlowConfig,
    label: &str,
) -> Result<(), FlowError>
where
    S: Session + ?Sized,
{
    login(session, config).await?;

    let entry = wait_for(
        session,
        &menu_item(label),
        Visibility::Displayed,
        config.pacing.wait_timeout(),
        config.pacing.poll_interval(),
    )
    .await?;
    session
        .click(entry)
        .await
        .map_err(|e| FlowError::ActionFailed {
            target: format!("{label} menu entry"),
            reason: e.to_string(),
        })?;
    tracing::debug!(section = label, "section opened");
    Ok(())
}

/// Open a page link inside an already-opened section.
pub(crate) async fn open_page<S>(session: &mut S, label: &str) -> Result<(), FlowError>
where
    S: Session + ?Sized,
{
    click(session, &menu_item(label)).await?;
    Ok(())
}
