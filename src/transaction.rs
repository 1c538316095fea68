//! Row models: raw export rows and their normalized form.

use crate::money::Money;
use chrono::NaiveDate;
use csv::StringRecord;

/// Raw row as read from the export, keyed by column name.
///
/// Columns keep their file order. Nothing is validated here; ragged records
/// simply yield fewer fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: Vec<(String, String)>,
}

impl RawRow {
    /// Pairs a CSV record with the header row.
    pub fn from_record(headers: &StringRecord, record: &StringRecord) -> Self {
        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.trim().to_string(), value.to_string()))
            .collect();
        RawRow { fields }
    }

    /// Builds a row from `(column, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        RawRow {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into().trim().to_string(), v.into()))
                .collect(),
        }
    }

    /// Returns the value of the first alias present among the columns.
    ///
    /// Column names are compared trimmed and case-insensitively.
    pub fn get(&self, aliases: &[String]) -> Option<&str> {
        aliases.iter().find_map(|alias| {
            let alias = alias.trim();
            self.fields
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(alias))
                .map(|(_, value)| value.as_str())
        })
    }

    /// Like [`RawRow::get`], but blank values count as absent.
    pub fn get_non_blank(&self, aliases: &[String]) -> Option<&str> {
        self.get(aliases).filter(|v| !v.trim().is_empty())
    }
}

/// Transaction type as reported by the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionType {
    /// Outgoing bill payment from the float.
    Payment,

    /// Settlement of float funds to the external account.
    Withdrawal,

    /// Standalone charge row.
    Charges,

    /// Standalone commission row.
    Commission,

    /// Anything else, kept verbatim (trimmed) for logging.
    Other(String),
}

impl TransactionType {
    /// Parses a type cell. Matching is trimmed and case-insensitive.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "payment" => TransactionType::Payment,
            "pesapalwithdrawal" | "withdrawal" => TransactionType::Withdrawal,
            "charges" => TransactionType::Charges,
            "commission" => TransactionType::Commission,
            _ => TransactionType::Other(trimmed.to_string()),
        }
    }

    /// Returns `true` for the fee-only row types.
    pub fn is_fee(&self) -> bool {
        matches!(self, TransactionType::Charges | TransactionType::Commission)
    }
}

/// A row with every field reduced to a canonical type.
///
/// Built by [`crate::normalize::normalize`], which never fails: bad dates
/// become `None`, bad amounts become zero.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub date: Option<NaiveDate>,

    /// Lowercased with whitespace collapsed.
    pub status: String,

    pub transaction_type: TransactionType,

    /// Display name with paybill and phone codes removed. Never empty.
    pub payee: String,

    pub remark: String,

    /// Reference or document number, `"N/A"` when absent.
    pub reference_id: String,

    pub amount: Money,
    pub charges: Money,
    pub commission: Money,
    pub credit: Money,
    pub debit: Money,
}

impl NormalizedRow {
    /// Returns `true` if the export reported the transaction as completed.
    pub fn is_successful(&self) -> bool {
        self.status == "successful"
    }

    /// Sum of charges and commission on this row, `None` if it overflows.
    pub fn fee_total(&self) -> Option<Money> {
        self.charges.checked_add(self.commission)
    }
}
