//! Bounded polling wait, the one place temporal tolerance lives.
//!
//! Resolution itself never retries; callers that need "wait for this to
//! appear" wrap it here with an explicit timeout and polling interval. A step
//! that exceeds its bound returns the final resolution failure, which
//! terminates the enclosing scenario.

use crate::locator::Locator;
use crate::resolve::{resolve, ResolveError, Visibility};
use crate::session::{ElementHandle, Session};
use std::time::{Duration, Instant};

/// Poll [`resolve`] until it succeeds or `timeout` elapses.
///
/// Suspension between attempts goes through [`Session::pause`], so mock
/// sessions control the clock. On deadline the last `TargetNotFound` is
/// returned unchanged.
pub async fn wait_for<S>(
    session: &mut S,
    locator: &Locator,
    visibility: Visibility,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<ElementHandle, ResolveError>
where
    S: Session + ?Sized,
{
    let deadline = Instant::now() + timeout;
    loop {
        match resolve(session, locator, visibility).await {
            Ok(handle) => return Ok(handle),
            Err(err) => {
                if Instant::now() >= deadline {
                    tracing::debug!(%locator, timeout_ms = timeout.as_millis() as u64, "wait timed out");
                    return Err(err);
                }
                session.pause(poll_interval).await;
            }
        }
    }
}
