use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Timestamp at index {index} is not strictly after the previous one")]
    NonMonotonicTimestamp { index: usize },

    #[error("Price at index {index} must be positive and finite, got {price}")]
    InvalidPrice { index: usize, price: f64 },
}
