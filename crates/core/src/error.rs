use thiserror::Error;

/// Errors raised by the pure parts of the billing pipeline
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV export produced invalid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
