use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wardflow_core::StepOutcome;
use wardflow_flows::consultation::{AdmitDetails, ConsultationNotes, ServeRequest};
use wardflow_flows::patients::PatientRecord;
use wardflow_flows::triage::Vitals;
use wardflow_flows::{auth, consultation, diagnostics, patients, ticketing, triage, ConfigLoader};
use wardflow_webdriver::{chrome_capabilities, WebdriverSession};

#[derive(Parser)]
#[command(name = "wardflow", version, about = "Hospital-management UI flow runner")]
struct Args {
    /// Config file (defaults to ./wardflow.yaml, then ~/.wardflow/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// WebDriver server URL
    #[arg(long, default_value = "http://localhost:4444")]
    driver_url: String,

    /// Run the browser headless
    #[arg(long)]
    headless: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and stop
    Login,
    /// Ticketing flows
    Ticket {
        #[command(subcommand)]
        action: TicketAction,
    },
    /// Triage flows
    Triage {
        #[command(subcommand)]
        action: TriageAction,
    },
    /// Patient management flows
    Patient {
        #[command(subcommand)]
        action: PatientAction,
    },
    /// Consultation flows
    Consult {
        #[command(subcommand)]
        action: ConsultAction,
    },
}

#[derive(Subcommand)]
enum TicketAction {
    /// Create a walk-in ticket
    Create {
        #[arg(long)]
        phone: String,
        #[arg(long, default_value = "Cash")]
        payment: String,
    },
    /// Reprint the most recent ticket
    Reprint,
    /// Open the public ticket display
    Display {
        #[arg(long)]
        ticket: Option<String>,
    },
    /// Track a ticket through the queue
    Track {
        #[arg(long)]
        ticket: Option<String>,
    },
}

#[derive(Subcommand)]
enum TriageAction {
    /// Open the triage ticket queue
    Queue,
    /// Record vitals for a ticket
    Vitals {
        #[arg(long)]
        ticket: String,
        #[arg(long)]
        temperature: Option<f32>,
        #[arg(long)]
        pulse: Option<u32>,
        #[arg(long)]
        systolic: Option<u32>,
        #[arg(long)]
        diastolic: Option<u32>,
        #[arg(long)]
        respiratory_rate: Option<u32>,
        #[arg(long)]
        oxygen_saturation: Option<u32>,
    },
    /// Assign a ticket to a clinical service
    Assign {
        #[arg(long)]
        ticket: String,
        #[arg(long)]
        service: String,
    },
    /// Move a ticket to a new status
    Status {
        #[arg(long)]
        ticket: String,
        #[arg(long)]
        status: String,
    },
    /// Scrape the dashboard counters
    Stats,
    /// Refresh the queue view
    Refresh,
}

#[derive(Subcommand)]
enum PatientAction {
    /// Search for a patient
    Search {
        #[arg(long)]
        term: String,
    },
    /// Open the first matching patient record
    Details {
        #[arg(long)]
        term: String,
    },
    /// Register a new patient
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Open the patient queue
    Queue,
}

#[derive(Subcommand)]
enum ConsultAction {
    /// Serve the first waiting consultation request
    Serve {
        #[arg(long, default_value = "")]
        diagnosis: String,
        #[arg(long)]
        complaints: Option<String>,
        #[arg(long)]
        findings: Option<String>,
        #[arg(long)]
        history: Option<String>,
        #[arg(long)]
        plan: Option<String>,
        #[arg(long)]
        ward: Option<String>,
        #[arg(long)]
        urgency: Option<String>,
        #[arg(long)]
        instructions: Option<String>,
    },
    /// List pending consultations
    Pending,
    /// Open one pending consultation's detail view (1-based row)
    ViewPending {
        #[arg(long, default_value_t = 1)]
        row: usize,
    },
    /// List appointment calendar events
    Appointments,
    /// Open one appointment's detail popup (0-based index)
    ViewAppointment {
        #[arg(long, default_value_t = 0)]
        event: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ConfigLoader::load_from(path).await?,
        None => ConfigLoader::load_default().await?,
    };

    let mut session =
        WebdriverSession::connect(&args.driver_url, chrome_capabilities(args.headless)).await?;

    let result = run(&mut session, &args.command, &config).await;
    if result.is_err() {
        diagnostics::dump_interactive(&mut session).await;
    }
    if let Err(err) = session.close().await {
        tracing::warn!(error = %err, "failed to close browser session");
    }

    result.map_err(Into::into)
}

async fn run(
    session: &mut WebdriverSession,
    command: &Command,
    config: &wardflow_flows::FlowConfig,
) -> Result<(), wardflow_core::FlowError> {
    match command {
        Command::Login => report(auth::login(session, config).await?),
        Command::Ticket { action } => match action {
            TicketAction::Create { phone, payment } => {
                report(ticketing::create_ticket(session, config, phone, payment).await?)
            }
            TicketAction::Reprint => report(ticketing::reprint_ticket(session, config).await?),
            TicketAction::Display { ticket } => {
                report(ticketing::display_ticket(session, config, ticket.as_deref()).await?)
            }
            TicketAction::Track { ticket } => {
                report(ticketing::track_ticket(session, config, ticket.as_deref()).await?)
            }
        },
        Command::Triage { action } => match action {
            TriageAction::Queue => report(triage::view_queue(session, config).await?),
            TriageAction::Vitals {
                ticket,
                temperature,
                pulse,
                systolic,
                diastolic,
                respiratory_rate,
                oxygen_saturation,
            } => {
                let vitals = Vitals {
                    temperature: *temperature,
                    pulse: *pulse,
                    blood_pressure_systolic: *systolic,
                    blood_pressure_diastolic: *diastolic,
                    respiratory_rate: *respiratory_rate,
                    oxygen_saturation: *oxygen_saturation,
                };
                report(triage::record_vitals(session, config, ticket, &vitals).await?)
            }
            TriageAction::Assign { ticket, service } => {
                report(triage::assign_service(session, config, ticket, service).await?)
            }
            TriageAction::Status { ticket, status } => {
                report(triage::update_status(session, config, ticket, status).await?)
            }
            TriageAction::Stats => {
                let stats = triage::queue_stats(session, config).await?;
                println!(
                    "vital_records={} cardex_allergies={}",
                    stats.vital_records, stats.cardex_allergies
                );
            }
            TriageAction::Refresh => report(triage::refresh_queue(session, config).await?),
        },
        Command::Patient { action } => match action {
            PatientAction::Search { term } => {
                report(patients::search_patient(session, config, term).await?)
            }
            PatientAction::Details { term } => {
                report(patients::patient_details(session, config, term).await?)
            }
            PatientAction::Register {
                first_name,
                last_name,
                phone,
                email,
                address,
            } => {
                let record = PatientRecord {
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                    phone_number: phone.clone(),
                    email: email.clone(),
                    address: address.clone(),
                };
                report(patients::register_patient(session, config, &record).await?)
            }
            PatientAction::Queue => report(patients::view_patient_queue(session, config).await?),
        },
        Command::Consult { action } => match action {
            ConsultAction::Serve {
                diagnosis,
                complaints,
                findings,
                history,
                plan,
                ward,
                urgency,
                instructions,
            } => {
                let request = ServeRequest {
                    notes: ConsultationNotes {
                        presenting_complaints: complaints.clone(),
                        clinical_findings: findings.clone(),
                        history: history.clone(),
                        treatment_plan: plan.clone(),
                    },
                    diagnosis: diagnosis.clone(),
                    admit: AdmitDetails {
                        ward: ward.clone(),
                        urgency: urgency.clone(),
                        instructions: instructions.clone(),
                    },
                };
                report(consultation::serve_request(session, config, &request).await?)
            }
            ConsultAction::Pending => {
                let rows = consultation::list_pending(session, config).await?;
                println!("pending={}", rows.len());
            }
            ConsultAction::ViewPending { row } => {
                report(consultation::view_pending(session, config, *row).await?)
            }
            ConsultAction::Appointments => {
                let events = consultation::list_appointments(session, config).await?;
                println!("appointments={}", events.len());
            }
            ConsultAction::ViewAppointment { event } => {
                report(consultation::view_appointment(session, config, *event).await?)
            }
        },
    }
    Ok(())
}

fn report(outcome: StepOutcome) {
    match outcome {
        StepOutcome::Completed => println!("completed"),
        StepOutcome::Skipped => println!("skipped"),
    }
}
