/// Domain-level error type shared across the workspace.
///
/// HTTP mapping happens in the api crate; nothing here knows about
/// status codes.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup came back empty.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity kind, e.g. `"Project config"`.
        entity: &'static str,
        /// The id that missed.
        id: String,
    },

    /// Input failed a domain validation rule.
    #[error("{0}")]
    Validation(String),

    /// The operation conflicts with current state.
    #[error("{0}")]
    Conflict(String),

    /// The caller's usage quota is exhausted for the current period.
    #[error("{0}")]
    QuotaExceeded(String),

    /// An unexpected internal failure.
    #[error("{0}")]
    Internal(String),
}
