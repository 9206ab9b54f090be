//! WebDriver-backed [`wardflow_core::Session`] implementation built on
//! fantoccini.

mod caps;
mod session;

pub use caps::chrome_capabilities;
pub use session::WebdriverSession;
