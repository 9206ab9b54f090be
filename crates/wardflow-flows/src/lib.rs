//! Flow helpers: per-feature-area user journeys against the
//! hospital-management application.
//!
//! Control flow is strictly top-down: scenarios call flow helpers, flow
//! helpers call action primitives, action primitives call the resolver. Every
//! helper takes its session explicitly; there is no ambient browser state.

pub mod auth;
pub mod config;
mod nav;
pub mod consultation;
pub mod diagnostics;
pub mod patients;
pub mod ticketing;
pub mod triage;

pub use config::{ConfigLoader, Credentials, FlowConfig};
