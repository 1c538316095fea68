//! # Float IIF
//!
//! Converts a mobile-money float account export (CSV) into an IIF
//! double-entry import file.
//!
//! ## Pipeline
//!
//! Raw rows are normalized, classified by an ordered rule table, turned into
//! balanced ledger entry groups and serialized:
//!
//! - **Never fails per row**: bad fields degrade to defaults, unpostable rows
//!   are skipped and counted
//! - **Fixed-point arithmetic**: 2 decimal places via `rust_decimal`
//! - **Strict invariant**: every emitted group sums to exactly zero
//! - **Deterministic output**: groups appear in input row order
//!
//! ## Example
//!
//! ```
//! use float_iif::IifConverter;
//! use std::io::Cursor;
//!
//! let csv = "Transaction Type,Transaction Status,Date,Account Name,Amount\n\
//!            Payment,Successful,01/02/2024,254700 - Acme,1000.00\n";
//! let mut converter = IifConverter::default();
//! converter.process_csv(Cursor::new(csv)).unwrap();
//!
//! let iif = converter.render().unwrap();
//! assert!(iif.contains("TRNS\tBILLPMT\t01/02/2024\tOpenfloat\tAcme\t-1000.00"));
//! ```

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod iif;
pub mod ledger;
pub mod money;
pub mod normalize;
pub mod transaction;

pub use classify::{Category, Classification, ClassifiedRow, DropReason};
pub use config::Config;
pub use engine::{ConversionSummary, IifConverter};
pub use error::{ConvertError, Result};
pub use ledger::{EntryBuilder, EntryGroup, LedgerLine, TrnsType};
pub use money::Money;
pub use transaction::{NormalizedRow, RawRow, TransactionType};
