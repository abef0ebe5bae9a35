//! Error taxonomy shared by the analytics engines

use thiserror::Error;

/// Errors surfaced by the loader and the analytics engines.
///
/// `CustomerNotFound` is deliberately its own variant so callers can tell
/// "no such customer" apart from malformed input or an empty population.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Input rows missing required fields, non-numeric amounts or
    /// unparseable dates. Aborts the run immediately.
    #[error("invalid input data: {0}")]
    DataFormat(String),

    /// A computation needs at least one customer or product and got none.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// The requested customer identifier has no purchase history.
    #[error("customer {0} not found")]
    CustomerNotFound(String),

    /// No products exist at all, so even the popularity fallback is empty.
    #[error("no products in dataset")]
    EmptyCatalog,

    /// Engine configuration outside its documented range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
