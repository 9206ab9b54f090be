//! Patient management flows: search, registration, and record updates.

use crate::config::FlowConfig;
use crate::nav::{menu_item, open_section};
use serde::{Deserialize, Serialize};
use wardflow_core::{
    click, click_first, click_if_present, fill_field, resolve, AbsencePolicy, ClickFallback,
    FlowError, Locator, Pacing, Session, StepOutcome, Visibility,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientRecord {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl PatientRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

fn first_result_row() -> Locator {
    Locator::css("table tbody tr")
}

/// Sign in and open the Patient Management section.
pub async fn open_patient_management<S>(
    session: &mut S,
    config: &FlowConfig,
) -> Result<(), FlowError>
where
    S: Session + ?Sized,
{
    open_section(session, config, "Patient Management").await
}

async fn open_patient_editor<S>(session: &mut S, config: &FlowConfig) -> Result<(), FlowError>
where
    S: Session + ?Sized,
{
    open_patient_management(session, config).await?;
    click(session, &menu_item("Patient Editor")).await?;
    Ok(())
}

/// Search for a patient by name or identifier.
pub async fn search_patient<S>(
    session: &mut S,
    config: &FlowConfig,
    term: &str,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    open_patient_editor(session, config).await?;

    fill_field(
        session,
        &Locator::css("#patient_name"),
        term,
        AbsencePolicy::Required,
        &config.pacing,
    )
    .await?;
    click_if_present(
        session,
        &Locator::xpath(r#"//button[contains(., "Search Patient")]"#),
    )
    .await?;

    tracing::info!(term, "patient search submitted");
    Ok(StepOutcome::Completed)
}

/// Search for a patient and open the first matching record. An empty result
/// set is a failure: the caller asked for a specific patient.
pub async fn patient_details<S>(
    session: &mut S,
    config: &FlowConfig,
    term: &str,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    search_patient(session, config, term).await?;
    click(session, &first_result_row()).await?;
    Ok(StepOutcome::Completed)
}

/// Register a new patient.
pub async fn register_patient<S>(
    session: &mut S,
    config: &FlowConfig,
    record: &PatientRecord,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    open_patient_management(session, config).await?;
    click(
        session,
        &menu_item("Patient Registration")
            .or_xpath(r#"//span[text()="Patient Registration"]"#),
    )
    .await?;

    fill_patient_form(session, record, &config.pacing).await?;

    click_first(
        session,
        &[
            Locator::xpath(r#"//button[contains(., "Submit")]"#),
            Locator::xpath(r#"//button[contains(., "Register")]"#),
            Locator::css("button[type='submit']"),
        ],
        ClickFallback::None,
    )
    .await?;

    tracing::info!(name = %record.full_name(), "patient registered");
    Ok(StepOutcome::Completed)
}

/// Update an existing patient's contact details.
pub async fn update_patient_info<S>(
    session: &mut S,
    config: &FlowConfig,
    term: &str,
    updates: &PatientRecord,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    search_patient(session, config, term).await?;
    click(session, &first_result_row()).await?;

    fill_patient_form(session, updates, &config.pacing).await?;

    match click_first(
        session,
        &[
            Locator::xpath(r#"//button[contains(., "Save")]"#),
            Locator::xpath(r#"//button[contains(., "Update")]"#),
            Locator::xpath(r#"//button[contains(., "Submit")]"#),
        ],
        ClickFallback::None,
    )
    .await
    {
        Ok(_) => {}
        Err(FlowError::TargetNotFound(_)) => {
            tracing::warn!("no save control on patient form, relying on auto-save")
        }
        Err(err) => return Err(err),
    }

    tracing::info!(term, "patient record updated");
    Ok(StepOutcome::Completed)
}

/// Open the patient queue and verify the table rendered.
pub async fn view_patient_queue<S>(
    session: &mut S,
    config: &FlowConfig,
) -> Result<StepOutcome, FlowError>
where
    S: Session + ?Sized,
{
    open_patient_management(session, config).await?;
    click_if_present(session, &menu_item("Patient Queue")).await?;
    resolve(
        session,
        &Locator::css("table").or_css(".ant-table"),
        Visibility::Present,
    )
    .await?;
    Ok(StepOutcome::Completed)
}

/// Fill whichever contact fields the current form variant exposes. The name
/// field is shared between registration and editing; the rest are optional
/// per deployment, so absence is tolerated everywhere.
async fn fill_patient_form<S>(
    session: &mut S,
    record: &PatientRecord,
    pacing: &Pacing,
) -> Result<(), FlowError>
where
    S: Session + ?Sized,
{
    let name = record.full_name();
    if !name.is_empty() {
        fill_field(
            session,
            &Locator::css("#patient_name").or_css(r#"[name="name"]"#),
            &name,
            AbsencePolicy::SkipIfAbsent,
            pacing,
        )
        .await?;
    }

    if let Some(phone) = &record.phone_number {
        fill_field(
            session,
            &Locator::css("input[type='tel']")
                .or_css("input[placeholder*='hone']")
                .or_css("input[placeholder*='obile']"),
            phone,
            AbsencePolicy::SkipIfAbsent,
            pacing,
        )
        .await?;
    }

    if let Some(email) = &record.email {
        fill_field(
            session,
            &Locator::css("input[type='email']"),
            email,
            AbsencePolicy::SkipIfAbsent,
            pacing,
        )
        .await?;
    }

    if let Some(address) = &record.address {
        // matches both "Address" and "address" placeholders
        fill_field(
            session,
            &Locator::css("input[placeholder*='ddress']"),
            address,
            AbsencePolicy::SkipIfAbsent,
            pacing,
        )
        .await?;
    }

    Ok(())
}
