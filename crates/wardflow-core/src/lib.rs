pub mod action;
pub mod locator;
pub mod pacing;
pub mod resolve;
pub mod session;
pub mod wait;

pub use action::{
    click, click_first, click_if_present, dismiss_modal, fill_field, precondition_met,
    typed_entry, AbsencePolicy, ClickFallback, FlowError, StepOutcome,
};
pub use locator::{Candidate, Locator, Strategy};
pub use pacing::Pacing;
pub use resolve::{resolve, ResolveError, Visibility};
pub use session::{ElementHandle, Session, SessionError};
pub use wait::wait_for;
