//! Phase window validation.

use crate::{
    error::EscrowError,
    types::{Stage, Timelocks},
};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current wall-clock time as Unix seconds.
pub fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|elapsed| elapsed.as_secs()).unwrap_or(0)
}

/// Checks that the current time falls inside `[start, end)`.
///
/// `slack` shifts the evaluated clock forward; it compensates for skew
/// against the counterpart chain and should be zero in production.
pub fn validate_window(
    timelocks: &Timelocks,
    start: Stage,
    end: Option<Stage>,
    slack: Duration,
) -> Result<(), EscrowError> {
    validate_window_at(timelocks, start, end, unix_now() + slack.as_secs())
}

fn validate_window_at(
    timelocks: &Timelocks,
    start: Stage,
    end: Option<Stage>,
    now: u64,
) -> Result<(), EscrowError> {
    let opens_at = timelocks.stage_time(start);
    if now < opens_at {
        return Err(EscrowError::NotYetOpen { stage: start, opens_at });
    }
    if let Some(end) = end {
        let closed_at = timelocks.stage_time(end);
        if now >= closed_at {
            return Err(EscrowError::WindowClosed { stage: end, closed_at });
        }
    }
    Ok(())
}
