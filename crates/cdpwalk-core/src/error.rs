use thiserror::Error;

/// Errors surfaced by the SNMP session collaborator.
///
/// `Unreachable` triggers the one name-to-IP fallback at the visit level;
/// `Timeout` ends the visit with no further retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Device unreachable: {0}")]
    Unreachable(String),

    #[error("Request timed out")]
    Timeout,
}
