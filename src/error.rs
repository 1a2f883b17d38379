//! Error types for the back-office engine.
//!
//! Validation outcomes (bad CPF, insufficient balance, inactive account,
//! disallowed transfer type) are expressed as data and never appear here.
//! These variants cover structural failures only: they abort the current
//! load, save or batch run.

use thiserror::Error;

/// Result type alias for back-office operations
pub type Result<T> = std::result::Result<T, BackofficeError>;

/// Errors that can occur during store and batch operations.
#[derive(Error, Debug)]
pub enum BackofficeError {
    /// Failed to open, read, write or remove a backing file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// A store file contains two rows with the same key
    #[error("duplicate key {key} in {path}")]
    DuplicateKey { path: String, key: String },

    /// A pending batch row carries a negative amount
    #[error("negative amount at row {row} of {path}")]
    NegativeAmount { path: String, row: usize },

    /// Account allocation probed every slot of a branch without success
    #[error("branch {branch} has no free account numbers")]
    BranchFull { branch: u32 },

    /// Missing data directory argument
    #[error("Missing data directory argument. Usage: backoffice <data-dir> [bank-code]")]
    MissingArgument,

    /// The bank-code argument is not an unsigned integer
    #[error("Invalid bank code '{0}'")]
    InvalidBankCode(String),
}
