//! The phases of one account pass.
//!
//! Each phase is best-effort: its failure is logged by the pass and the
//! next phase still runs. Only an authentication failure ends the pass.

pub mod gacha;
pub mod merge;
pub mod missions;
pub mod pvp;
pub mod rewards;

use tracing::warn;

use crate::error::RunnerError;

/// Log a failed request and carry on, unless the failure ends the pass.
///
/// Returns `Ok(None)` for a tolerated failure so the caller can skip the
/// work that depended on the result.
///
/// # Errors
///
/// Returns the error when it ends the pass.
pub fn tolerate<T>(
    what: &'static str,
    result: Result<T, RunnerError>,
) -> Result<Option<T>, RunnerError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            warn!(request = what, error = %e, "request failed");
            Ok(None)
        }
    }
}
