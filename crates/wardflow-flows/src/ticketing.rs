//! Ticketing flows: create, reprint, display, and track tickets.

use crate::config::FlowConfig;
use crate::diagnostics::{page_text, visible_button_texts};
use crate::nav::{open_page, open_section};
use wardflow_core::{
    click_first, click_if_present, fill_field, wait_for, AbsencePolicy, ClickFallback, FlowError,
    Locator, Session, StepOutcome, Visibility,
};

/// Sign in and open the Ticketing section.
pub async fn open_ticketing<S>(session: &mut S, config: &FlowConfig) -> Result<(), FlowError>
where
    S: Session + ?Sized,
{
    open_section(session, config, "Ticketing").await
}

/// Create a walk-in ticket for a phone number and pay with the given method.
///
/// Failing to find the payment method is the most common breakage in this
/// flow, so that error carries the texts of every visible button for
/// diagnosis. The trailing Outpatient Consultation toggle only exists for
/// some service configurations and is skipped when absent.
pub async fn create_ticket<S>(
    session: &mut S,
    config: &FlowConfig,
    phone: &str,
    payment_method: &str,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    open_ticketing(session, config).await?;
    open_page(session, "Create Ticket").await?;

    fill_field(
        session,
        &Locator::css("input[type='tel']"),
        phone,
        AbsencePolicy::Required,
        &config.pacing,
    )
    .await?;

    let generate = Locator::text("Generate Ticket")
        .or_xpath(r#"//button[contains(., "Generate Ticket")]"#);
    let control = wait_for(
        session,
        &generate,
        Visibility::Displayed,
        config.pacing.wait_timeout(),
        config.pacing.poll_interval(),
    )
    .await?;
    session
        .click(control)
        .await
        .map_err(|e| FlowError::ActionFailed {
            target: "Generate Ticket".into(),
            reason: e.to_string(),
        })?;

    select_payment_method(session, payment_method).await?;

    let outpatient = click_if_present(session, &Locator::text("Outpatient Consultation")).await?;
    if outpatient.skipped() {
        tracing::debug!("no outpatient consultation toggle for this service");
    }

    tracing::info!(phone, payment_method, "ticket created");
    Ok(StepOutcome::Completed)
}

async fn select_payment_method<S>(session: &mut S, payment_method: &str) -> Result<(), FlowError>
where
    S: Session + ?Sized,
{
    let locators = vec![
        Locator::text_contains(payment_method),
        Locator::text(payment_method),
    ];
    match click_first(session, &locators, ClickFallback::None).await {
        Ok(_) => Ok(()),
        Err(FlowError::TargetNotFound(_)) => {
            let buttons = visible_button_texts(session).await;
            Err(FlowError::ActionFailed {
                target: format!("payment method \"{payment_method}\""),
                reason: format!("no matching button; visible buttons: [{}]", buttons.join(", ")),
            })
        }
        Err(err) => Err(err),
    }
}

/// Reprint the most recent ticket.
///
/// A queue with nothing to reprint is a valid state: when no Reprint button
/// appears but the page confirms it is the reprint view, the flow skips
/// instead of failing.
pub async fn reprint_ticket<S>(
    session: &mut S,
    config: &FlowConfig,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    open_ticketing(session, config).await?;
    open_page(session, "Ticket Reprint").await?;

    let reprint = Locator::xpath(r#"//button[contains(., "Reprint")]"#);
    match wait_for(
        session,
        &reprint,
        Visibility::Displayed,
        config.pacing.wait_timeout(),
        config.pacing.poll_interval(),
    )
    .await
    {
        Ok(control) => {
            session
                .click(control)
                .await
                .map_err(|e| FlowError::ActionFailed {
                    target: "Reprint".into(),
                    reason: e.to_string(),
                })?;
            Ok(StepOutcome::Completed)
        }
        Err(err) => {
            // The probe is diagnostic only and must not mask the resolution
            // failure on a page where scripts cannot run.
            let body = page_text(session).await.unwrap_or_default();
            if body.to_lowercase().contains("reprint") {
                tracing::warn!("reprint view open but no ticket rows to reprint");
                Ok(StepOutcome::Skipped)
            } else {
                Err(err.into())
            }
        }
    }
}

/// Open the public ticket display, optionally searching for one ticket.
pub async fn display_ticket<S>(
    session: &mut S,
    config: &FlowConfig,
    ticket_id: Option<&str>,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    open_ticketing(session, config).await?;
    open_page(session, "Ticket Display").await?;

    if let Some(id) = ticket_id {
        let searched = fill_field(
            session,
            &Locator::css(r#"[name="search"]"#).or_css("input[placeholder*='earch']"),
            id,
            AbsencePolicy::SkipIfAbsent,
            &config.pacing,
        )
        .await?;
        if searched.completed() {
            click_if_present(session, &Locator::xpath(r#"//button[contains(., "Search")]"#))
                .await?;
        }
    }
    Ok(StepOutcome::Completed)
}

/// Track a ticket's position in the queue.
pub async fn track_ticket<S>(
    session: &mut S,
    config: &FlowConfig,
    ticket_id: Option<&str>,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    open_ticketing(session, config).await?;
    open_page(session, "Ticket Tracking").await?;

    if let Some(id) = ticket_id {
        let entered = fill_field(
            session,
            &Locator::css(r#"[name="ticketId"]"#).or_css("input[placeholder*='icket']"),
            id,
            AbsencePolicy::SkipIfAbsent,
            &config.pacing,
        )
        .await?;
        if entered.completed() {
            click_first(
                session,
                &[
                    Locator::xpath(r#"//button[contains(., "Track")]"#),
                    Locator::xpath(r#"//button[contains(., "Search")]"#),
                ],
                ClickFallback::EnterKey,
            )
            .await?;
        }
    }
    Ok(StepOutcome::Completed)
}
