use thiserror::Error;

/// Easy alias for error handling
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can happen while moving replica state in or out of the process.
/// The set operations themselves never fail.
#[derive(Debug, Error)]
pub enum Error {
    /// We couldn't encode or decode state as JSON, for example if a peer sent
    /// something that isn't an LWW-Element-Set.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
