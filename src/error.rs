// Tot Tally - Error Taxonomy

use thiserror::Error;

/// Errors surfaced by the core operations.
///
/// Everything here bubbles unchanged to the caller: the library never logs,
/// never retries, and never crashes the process on a single bad request.
#[derive(Debug, Error)]
pub enum TallyError {
    /// Bad input from the caller: empty or over-long name, unknown kind
    /// key, timezone that does not resolve to an IANA zone. Recoverable.
    #[error("validation: {0}")]
    Validation(String),

    /// Unknown tot id. Recoverable, surfaced as "does not exist".
    #[error("not found: {0}")]
    NotFound(String),

    /// Storage engine failure. No retry, no partial-write recovery.
    #[error("storage: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, TallyError>;

impl TallyError {
    pub fn is_validation(&self) -> bool {
        matches!(self, TallyError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TallyError::NotFound(_))
    }
}
