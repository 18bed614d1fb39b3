// Error types for the generator.
//
// Generation is all-or-nothing: any internal failure surfaces as a single
// user-visible error. Diagnostic detail is logged at the point of failure
// and carried in the source chain.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog parse failed: {0}")]
    CatalogParse(#[from] serde_json::Error),
    #[error("{0} catalog has no templates")]
    EmptyCatalog(&'static str),
}

pub type Result<T> = std::result::Result<T, GenerateError>;
