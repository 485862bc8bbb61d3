use thiserror::Error;

/// Everything that can go wrong inside the conversion pipeline.
///
/// The set is closed on purpose: the orchestrator decides per-variant whether
/// a failure is fatal to the whole run (configuration and storage errors) or
/// only to the master currently being converted (substitution errors), so
/// callers must be able to match exhaustively.
#[derive(Debug, Error)]
pub enum RamError {
    /// A conversion entry in the ramfile has no `master` field.
    #[error("conversion entry has no master")]
    UnnamedConversion,

    /// A conversion entry is structurally invalid.
    #[error("invalid conversion: {0}")]
    InvalidConversion(String),

    /// A conversion references a template that is not defined.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// A `{token}` placeholder has no matching entry in the parameter bag.
    #[error("unbound parameter: {0}")]
    UnboundParameter(String),

    /// A width/height expression is outside the literal/multiplication grammar.
    #[error("invalid dimension expression: {0:?}")]
    ExpressionError(String),

    /// The tracked-file store does not exist yet.
    #[error("ram index does not exist. Have you called init?")]
    NotInitialized,

    /// The tracked-file store already exists.
    #[error("folder already ram managed")]
    AlreadyInitialized,

    /// The store exists but an operation on it failed.
    #[error("index error: {0}")]
    Store(#[from] rusqlite::Error),
}
