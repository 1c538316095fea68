//! Error types for the IIF converter.

use crate::classify::Category;
use crate::money::Money;
use thiserror::Error;

/// Result type alias for converter operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur during a conversion.
///
/// `Unbalanced`, `AmountOverflow` and `NotPostable` come from building a
/// single group; the row is reported and skipped. Every other variant aborts
/// the whole batch.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Failed to open, read or write a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration file could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Input had no header row
    #[error("Input contains no rows")]
    EmptyInput,

    /// Header row lacks columns needed to classify transactions
    #[error("Missing required column(s): {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// Ledger lines of a group do not net to zero
    #[error("{category:?} entry does not balance (lines sum to {total})")]
    Unbalanced { category: Category, total: Money },

    /// Line amounts of a group cannot be summed without overflowing
    #[error("{0:?} entry amounts are out of range")]
    AmountOverflow(Category),

    /// Only payments, withdrawals and fees have a ledger layout
    #[error("{0:?} rows cannot be posted")]
    NotPostable(Category),
}
