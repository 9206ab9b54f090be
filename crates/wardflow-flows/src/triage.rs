//! Triage flows: vitals capture, service assignment, and queue management.

use crate::config::FlowConfig;
use crate::diagnostics::page_text;
use crate::nav::open_section;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use wardflow_core::{
    click, click_first, click_if_present, fill_field, resolve, typed_entry, AbsencePolicy,
    Candidate, ClickFallback, FlowError, Locator, Pacing, Session, StepOutcome, Strategy,
    Visibility,
};

/// One set of vital-sign readings. Unset fields are left untouched on the
/// form, which fills its numeric inputs in a fixed order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vitals {
    pub temperature: Option<f32>,
    pub pulse: Option<u32>,
    pub blood_pressure_systolic: Option<u32>,
    pub blood_pressure_diastolic: Option<u32>,
    pub respiratory_rate: Option<u32>,
    pub oxygen_saturation: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub vital_records: u32,
    pub cardex_allergies: u32,
}

static VITAL_RECORDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Vital Records\D*(\d+)").unwrap());
static CARDEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Cardex\D*(\d+)").unwrap());

fn search_box() -> Locator {
    Locator::css(r#"input[placeholder*="Search by Ticket Number"]"#)
        .or_css("input[placeholder*='earch']")
}

fn actions_control() -> Locator {
    Locator::xpath(r#"//button[contains(., "Actions")]"#)
}

/// Sign in and open the Triage section.
pub async fn open_triage<S>(session: &mut S, config: &FlowConfig) -> Result<(), FlowError>
where
    S: Session + ?Sized,
{
    open_section(session, config, "Triage").await
}

/// Open the triage ticket queue and verify the queue table rendered.
pub async fn view_queue<S>(session: &mut S, config: &FlowConfig) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    open_triage(session, config).await?;
    click_if_present(session, &crate::nav::menu_item("Tickets Queue")).await?;
    resolve(
        session,
        &Locator::css("table").or_css(".ant-table"),
        Visibility::Present,
    )
    .await?;
    Ok(StepOutcome::Completed)
}

/// Record vitals for one ticket.
///
/// The ticket row is required; the save control is tolerated as absent
/// because some deployments auto-save on blur.
pub async fn record_vitals<S>(
    session: &mut S,
    config: &FlowConfig,
    ticket: &str,
    vitals: &Vitals,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    open_triage(session, config).await?;

    fill_field(
        session,
        &search_box(),
        ticket,
        AbsencePolicy::SkipIfAbsent,
        &config.pacing,
    )
    .await?;

    click(session, &Locator::text_contains(ticket)).await?;
    click_if_present(session, &actions_control()).await?;

    fill_vitals(session, vitals, &config.pacing).await?;

    let save = [
        Locator::xpath(r#"//button[contains(., "Save")]"#),
        Locator::xpath(r#"//button[contains(., "Submit")]"#),
    ];
    match click_first(session, &save, ClickFallback::None).await {
        Ok(_) => {}
        Err(FlowError::TargetNotFound(_)) => {
            tracing::warn!("no save control on vitals form, relying on auto-save")
        }
        Err(err) => return Err(err),
    }

    tracing::info!(ticket, "vitals recorded");
    Ok(StepOutcome::Completed)
}

/// The vitals form exposes unlabeled numeric inputs in a fixed order; consume
/// one input per supplied reading and stop when the form runs out.
async fn fill_vitals<S>(session: &mut S, vitals: &Vitals, pacing: &Pacing) -> Result<(), FlowError>
where
    S: Session + ?Sized,
{
    let readings: Vec<(&str, Option<String>)> = vec![
        ("temperature", vitals.temperature.map(|v| v.to_string())),
        ("pulse", vitals.pulse.map(|v| v.to_string())),
        (
            "bp_systolic",
            vitals.blood_pressure_systolic.map(|v| v.to_string()),
        ),
        (
            "bp_diastolic",
            vitals.blood_pressure_diastolic.map(|v| v.to_string()),
        ),
        (
            "respiratory_rate",
            vitals.respiratory_rate.map(|v| v.to_string()),
        ),
        (
            "oxygen_saturation",
            vitals.oxygen_saturation.map(|v| v.to_string()),
        ),
    ];

    let inputs = session
        .query(&Candidate::new(Strategy::Css, "input[type='number']"))
        .await?;
    let mut remaining = inputs.iter();

    for (name, reading) in readings {
        let Some(value) = reading else { continue };
        match remaining.next() {
            Some(&input) => {
                typed_entry(session, input, &value, pacing).await?;
                tracing::debug!(field = name, value, "vital entered");
            }
            None => {
                tracing::warn!(field = name, "vitals form has no input left for reading");
                break;
            }
        }
    }
    Ok(())
}

/// Assign a ticket to a clinical service.
pub async fn assign_service<S>(
    session: &mut S,
    config: &FlowConfig,
    ticket: &str,
    service: &str,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    open_triage(session, config).await?;

    fill_field(
        session,
        &search_box(),
        ticket,
        AbsencePolicy::SkipIfAbsent,
        &config.pacing,
    )
    .await?;
    click(session, &Locator::text_contains(ticket)).await?;
    click_if_present(session, &actions_control()).await?;

    let chosen = click_if_present(session, &Locator::text(service)).await?;
    if chosen.skipped() {
        tracing::warn!(service, "service option not offered for this ticket");
        return Ok(StepOutcome::Skipped);
    }

    let confirm = [
        Locator::xpath(r#"//button[contains(., "Confirm")]"#),
        Locator::xpath(r#"//button[contains(., "Assign")]"#),
    ];
    match click_first(session, &confirm, ClickFallback::None).await {
        Ok(_) => {}
        Err(FlowError::TargetNotFound(_)) => {
            tracing::debug!("assignment applied without confirmation dialog")
        }
        Err(err) => return Err(err),
    }

    tracing::info!(ticket, service, "service assigned");
    Ok(StepOutcome::Completed)
}

/// Move a ticket to a new queue status.
pub async fn update_status<S>(
    session: &mut S,
    config: &FlowConfig,
    ticket: &str,
    status: &str,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    open_triage(session, config).await?;

    fill_field(
        session,
        &search_box(),
        ticket,
        AbsencePolicy::SkipIfAbsent,
        &config.pacing,
    )
    .await?;
    click(session, &Locator::text_contains(ticket)).await?;
    click_if_present(session, &actions_control()).await?;

    let changed = click_if_present(session, &Locator::text(status)).await?;
    if changed.skipped() {
        tracing::warn!(status, "status option not offered for this ticket");
        return Ok(StepOutcome::Skipped);
    }

    tracing::info!(ticket, status, "status updated");
    Ok(StepOutcome::Completed)
}

/// Scrape headline counters from the triage dashboard.
pub async fn queue_stats<S>(session: &mut S, config: &FlowConfig) -> Result<QueueStats, FlowError>
where
    S: Session + ?Sized,
{
    open_triage(session, config).await?;
    let body = page_text(session).await?;
    Ok(QueueStats {
        vital_records: capture_count(&VITAL_RECORDS_RE, &body),
        cardex_allergies: capture_count(&CARDEX_RE, &body),
    })
}

fn capture_count(re: &Regex, body: &str) -> u32 {
    re.captures(body)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Refresh the queue view, preferring the in-page refresh control over a full
/// page reload.
pub async fn refresh_queue<S>(
    session: &mut S,
    config: &FlowConfig,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    open_triage(session, config).await?;

    let refreshed = click_if_present(
        session,
        &Locator::xpath(r#"//button[contains(., "Refresh")]"#).or_aria_label("reload"),
    )
    .await?;
    if refreshed.completed() {
        return Ok(StepOutcome::Completed);
    }

    tracing::debug!("no refresh control, reloading page");
    session.refresh().await?;
    Ok(StepOutcome::Completed)
}
