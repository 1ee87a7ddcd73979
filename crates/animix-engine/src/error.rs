//! Error types for the allocation engine.
//!
//! Infeasible allocations are not errors; they surface as empty reports.
//! These variants cover the cases where the engine cannot run at all or
//! where remote data is malformed.

/// Errors that can occur while indexing or allocating.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A snapshot the allocation depends on could not be fetched.
    #[error("snapshot unavailable: {what}")]
    SnapshotUnavailable {
        /// Which snapshot was missing (`pets`, `missions`, ...).
        what: &'static str,
    },

    /// A packed pairing goal id could not be decoded.
    #[error("malformed pairing goal {packed}: {reason}")]
    MalformedPairingGoal {
        /// The packed value as received.
        packed: u64,
        /// Why it was rejected.
        reason: String,
    },

    /// Fewer than three distinct pets are available for an attack team.
    #[error("cannot form a team of three from {owned} distinct pets")]
    TeamUnavailable {
        /// Distinct pets owned.
        owned: usize,
    },
}
