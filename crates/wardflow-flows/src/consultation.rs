//! Consultation flows: serving requests, pending consultations, and the
//! appointments calendar.

use crate::auth::login;
use crate::config::FlowConfig;
use crate::nav::menu_item;
use serde::{Deserialize, Serialize};
use wardflow_core::{
    click, click_first, click_if_present, dismiss_modal, fill_field, wait_for, AbsencePolicy,
    Candidate, ClickFallback, ElementHandle, FlowError, Locator, Session, StepOutcome, Strategy,
    Visibility,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsultationNotes {
    pub presenting_complaints: Option<String>,
    pub clinical_findings: Option<String>,
    pub history: Option<String>,
    pub treatment_plan: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdmitDetails {
    pub ward: Option<String>,
    pub urgency: Option<String>,
    pub instructions: Option<String>,
}

/// Everything needed to serve one consultation request end to end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServeRequest {
    pub notes: ConsultationNotes,
    pub diagnosis: String,
    pub admit: AdmitDetails,
}

/// The consultation submenu renders differently depending on which menu node
/// is active, so every known shape is tried.
fn submenu_controls() -> Vec<Locator> {
    vec![
        Locator::css("li.ant-menu-submenu-active > div > span"),
        Locator::css("li.ant-menu-submenu-open > div > span"),
        Locator::xpath(r#"//span[contains(text(), "Consultation")]"#),
        Locator::xpath(r#"//span[contains(text(), "Patient Management")]"#),
    ]
}

fn close_controls() -> Vec<Locator> {
    vec![
        Locator::aria_label("close"),
        Locator::css(".ant-modal-close"),
        Locator::css(".ant-drawer-close"),
        Locator::xpath(r#"//button[contains(., "Close")]"#),
    ]
}

/// The onboarding hint modal some deployments show on first entry.
fn got_it_controls() -> Vec<Locator> {
    vec![
        Locator::text("Got It"),
        Locator::css("div.ant-modal-confirm-btns button"),
        Locator::xpath(r#"//button[contains(., "Got It")]"#),
    ]
}

/// Expand the consultation submenu. An already-open submenu leaves nothing to
/// click, which is a skip, not a failure.
pub async fn open_consultation_menu<S>(
    session: &mut S,
    config: &FlowConfig,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    login(session, config).await?;

    for control in submenu_controls() {
        if click_if_present(session, &control).await?.completed() {
            return Ok(StepOutcome::Completed);
        }
    }
    tracing::debug!("consultation submenu already open");
    Ok(StepOutcome::Skipped)
}

/// Open one page inside the consultation submenu.
pub async fn open_consultation_page<S>(
    session: &mut S,
    config: &FlowConfig,
    page: &str,
) -> Result<(), FlowError>
where
    S: Session + ?Sized,
{
    open_consultation_menu(session, config).await?;
    let link = wait_for(
        session,
        &menu_item(page).or_css("li.ant-menu-item-active a"),
        Visibility::Displayed,
        config.pacing.wait_timeout(),
        config.pacing.poll_interval(),
    )
    .await?;
    session
        .click(link)
        .await
        .map_err(|e| FlowError::ActionFailed {
            target: format!("{page} link"),
            reason: e.to_string(),
        })?;
    Ok(())
}

/// Serve the first waiting consultation request end to end: open the request,
/// dismiss the onboarding hint if present, write the clinical notes, add a
/// diagnosis, then admit the patient.
pub async fn serve_request<S>(
    session: &mut S,
    config: &FlowConfig,
    request: &ServeRequest,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    open_consultation_page(session, config, "Requests").await?;

    let serve_controls = [
        Locator::css("tr.orange-row div:nth-of-type(3) span"),
        Locator::css("tr.orange-row button span"),
        Locator::css("tr.orange-row button"),
        Locator::css("table tbody tr button"),
    ];
    click_first(session, &serve_controls, ClickFallback::None).await?;

    dismiss_modal(session, &got_it_controls()).await?;

    fill_notes(session, config, &request.notes).await?;
    add_diagnosis(session, config, &request.diagnosis).await?;

    click(
        session,
        &Locator::text("Save Notes & Admit")
            .or_xpath(r#"//button[contains(., "Save Notes & Admit")]"#),
    )
    .await?;

    fill_admit(session, config, &request.admit).await?;

    click(
        session,
        &Locator::text("Save & Admit")
            .or_xpath(r#"//button[contains(., "Save & Admit") and not(contains(., "Notes"))]"#),
    )
    .await?;

    tracing::info!(diagnosis = %request.diagnosis, "consultation request served");
    Ok(StepOutcome::Completed)
}

async fn fill_notes<S>(
    session: &mut S,
    config: &FlowConfig,
    notes: &ConsultationNotes,
) -> Result<(), FlowError>
where
    S: Session + ?Sized,
{
    let sections = [
        ("#chief_complaint", &notes.presenting_complaints),
        ("#examination_notes", &notes.clinical_findings),
        ("#history_notes", &notes.history),
        ("#treatment_plan", &notes.treatment_plan),
    ];
    for (selector, text) in sections {
        let Some(text) = text else { continue };
        fill_field(
            session,
            &Locator::css(selector),
            text,
            AbsencePolicy::SkipIfAbsent,
            &config.pacing,
        )
        .await?;
    }
    Ok(())
}

/// Type into the diagnosis search box and pick the highlighted dropdown
/// option once it appears.
async fn add_diagnosis<S>(
    session: &mut S,
    config: &FlowConfig,
    diagnosis: &str,
) -> Result<(), FlowError>
where
    S: Session + ?Sized,
{
    if diagnosis.is_empty() {
        return Ok(());
    }

    click_first(
        session,
        &[
            Locator::text("Add New Diagnosis"),
            Locator::xpath(r#"//button[contains(., "Add New Diagnosis")]"#),
        ],
        ClickFallback::None,
    )
    .await?;

    fill_field(
        session,
        &Locator::css("[id$='_disease_description']")
            .or_css("input[placeholder*='diagnosis']")
            .or_aria_label("Search or type diagnosis"),
        diagnosis,
        AbsencePolicy::Required,
        &config.pacing,
    )
    .await?;

    let option = wait_for(
        session,
        &Locator::css("div.ant-select-item-option-active > div")
            .or_css("div.ant-select-item-option > div")
            .or_css(".ant-select-dropdown .ant-select-item"),
        Visibility::Displayed,
        config.pacing.wait_timeout(),
        config.pacing.poll_interval(),
    )
    .await?;
    session
        .click(option)
        .await
        .map_err(|e| FlowError::ActionFailed {
            target: "diagnosis dropdown option".into(),
            reason: e.to_string(),
        })?;
    Ok(())
}

async fn fill_admit<S>(
    session: &mut S,
    config: &FlowConfig,
    admit: &AdmitDetails,
) -> Result<(), FlowError>
where
    S: Session + ?Sized,
{
    if let Some(ward) = &admit.ward {
        let opened = click_if_present(session, &Locator::css("#ward_id")).await?;
        if opened.completed() {
            click_if_present(
                session,
                &Locator::css(format!(r#"div[title="{ward}"]"#))
                    .or_text(ward.clone())
                    .or_css("div.ant-select-item-option-active"),
            )
            .await?;
        }
    }

    if let Some(urgency) = &admit.urgency {
        let opened = click_if_present(session, &Locator::css("#urgency")).await?;
        if opened.completed() {
            click_if_present(
                session,
                &Locator::css(format!(r#"div[title="{urgency}"]"#))
                    .or_text(urgency.clone())
                    .or_css("div.ant-select-item-option-active"),
            )
            .await?;
        }
    }

    if let Some(instructions) = &admit.instructions {
        fill_field(
            session,
            &Locator::css("#admission_instructions"),
            instructions,
            AbsencePolicy::SkipIfAbsent,
            &config.pacing,
        )
        .await?;
    }

    Ok(())
}

fn pending_rows_candidate() -> Candidate {
    Candidate::new(
        Strategy::Css,
        "table tbody tr:not(.ant-table-measure-row)",
    )
}

/// Open the pending consultations list and return its row handles.
pub async fn list_pending<S>(
    session: &mut S,
    config: &FlowConfig,
) -> Result<Vec<ElementHandle>, FlowError>
where
    S: Session + ?Sized,
{
    open_consultation_page(session, config, "Pending Consultation").await?;
    let rows = session.query(&pending_rows_candidate()).await?;
    tracing::info!(count = rows.len(), "pending consultations listed");
    Ok(rows)
}

/// Open one pending consultation's detail view via its row action button,
/// then close whatever modal it opened.
pub async fn view_pending<S>(
    session: &mut S,
    config: &FlowConfig,
    row: usize,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    open_consultation_page(session, config, "Pending Consultation").await?;

    let rows = session.query(&pending_rows_candidate()).await?;
    if rows.is_empty() {
        tracing::warn!("no pending consultations to view");
        return Ok(StepOutcome::Skipped);
    }
    if row == 0 || row > rows.len() {
        return Err(FlowError::ActionFailed {
            target: format!("pending consultation row {row}"),
            reason: format!("only {} rows visible", rows.len()),
        });
    }

    click_row_action(session, row).await?;
    dismiss_modal(session, &close_controls()).await?;
    Ok(StepOutcome::Completed)
}

async fn click_row_action<S>(session: &mut S, row: usize) -> Result<(), FlowError>
where
    S: Session + ?Sized,
{
    let locators = [
        Locator::css(format!(
            "table tbody tr:nth-child({row}) div:nth-of-type(3) span"
        )),
        Locator::css(format!("table tbody tr:nth-child({row}) button span")),
        Locator::css(format!("table tbody tr:nth-child({row}) button")),
        Locator::css(format!(
            "table tbody tr:nth-child({row}) td:last-child button"
        )),
    ];
    click_first(session, &locators, ClickFallback::None).await?;
    Ok(())
}

/// Calendar event markers vary by calendar widget version.
fn event_candidates() -> Vec<Candidate> {
    vec![
        Candidate::new(Strategy::Css, ".ant-badge-status-text"),
        Candidate::new(Strategy::Css, ".ant-picker-calendar-date-content li"),
        Candidate::new(Strategy::Css, ".fc-event"),
        Candidate::new(Strategy::Css, ".fc-daygrid-event"),
        Candidate::new(Strategy::Css, "ul.events li"),
    ]
}

async fn calendar_events<S>(session: &mut S) -> Result<Vec<ElementHandle>, FlowError>
where
    S: Session + ?Sized,
{
    for candidate in event_candidates() {
        match session.query(&candidate).await {
            Ok(handles) if !handles.is_empty() => return Ok(handles),
            Ok(_) => continue,
            Err(err) => {
                tracing::debug!(candidate = %candidate, error = %err, "event probe failed");
                continue;
            }
        }
    }
    Ok(Vec::new())
}

/// Open the appointments calendar and return the event handles found.
pub async fn list_appointments<S>(
    session: &mut S,
    config: &FlowConfig,
) -> Result<Vec<ElementHandle>, FlowError>
where
    S: Session + ?Sized,
{
    open_consultation_page(session, config, "Appointments").await?;
    let events = calendar_events(session).await?;
    if events.is_empty() {
        tracing::warn!("no appointment events on the calendar");
    } else {
        tracing::info!(count = events.len(), "appointments listed");
    }
    Ok(events)
}

/// Open one appointment's detail popup by event index, then close it.
pub async fn view_appointment<S>(
    session: &mut S,
    config: &FlowConfig,
    index: usize,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    open_consultation_page(session, config, "Appointments").await?;

    let events = calendar_events(session).await?;
    if events.is_empty() {
        return Err(FlowError::ActionFailed {
            target: "appointment event".into(),
            reason: "no calendar events found".into(),
        });
    }
    let Some(&event) = events.get(index) else {
        return Err(FlowError::ActionFailed {
            target: format!("appointment event {index}"),
            reason: format!("only {} events visible", events.len()),
        });
    };

    session
        .click(event)
        .await
        .map_err(|e| FlowError::ActionFailed {
            target: format!("appointment event {index}"),
            reason: e.to_string(),
        })?;
    dismiss_modal(session, &close_controls()).await?;
    Ok(StepOutcome::Completed)
}
