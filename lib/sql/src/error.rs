use thiserror::Error;

#[derive(Error, Debug)]
pub enum SQLError {
    #[error("query error: {0}")]
    Query(String),

    #[error("execution error: {0}")]
    Execution(String),

    #[error("connection error: {0}")]
    Connection(String),
}

impl SQLError {
    /// True if this error came from a UNIQUE constraint violation.
    ///
    /// Services use this to turn an insert race into a conflict
    /// (create-or-fetch) instead of a storage failure.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            SQLError::Query(m) | SQLError::Execution(m) | SQLError::Connection(m) => {
                m.contains("UNIQUE constraint")
            }
        }
    }
}
