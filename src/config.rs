//! Converter configuration.
//!
//! Every section has defaults matching the Openfloat export and a stock
//! QuickBooks chart of accounts, so a JSON file only needs the keys that
//! differ for a given deployment.

use crate::error::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Full converter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ledger account names written to the document.
    pub accounts: Accounts,

    /// Column-name aliases for the input file.
    pub columns: ColumnAliases,

    /// Number of preamble lines before the header row.
    pub skip_rows: usize,

    /// How withdrawals are amounted and signed.
    pub withdrawal: WithdrawalConvention,

    /// Interpretation of ambiguous `NN/NN/YYYY` dates.
    pub date_order: DateOrder,

    /// Payee used when the name column is absent or has nothing left after cleaning.
    pub unknown_payee: String,
}

impl Config {
    /// Loads a configuration from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses a configuration from a JSON string. Missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            accounts: Accounts::default(),
            columns: ColumnAliases::default(),
            skip_rows: 0,
            withdrawal: WithdrawalConvention::default(),
            date_order: DateOrder::default(),
            unknown_payee: "Unknown Payee".to_string(),
        }
    }
}

/// Chart-of-accounts names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Accounts {
    /// Holding account for funds at the aggregator.
    pub float_account: String,

    /// External bank or wallet account that withdrawals settle into.
    pub bank_account: String,

    /// Expense account for charges and commissions.
    pub bank_fees_account: String,

    pub accounts_payable: String,
}

impl Default for Accounts {
    fn default() -> Self {
        Accounts {
            float_account: "Openfloat".to_string(),
            bank_account: "Pesapal".to_string(),
            bank_fees_account: "Bank Service Charges".to_string(),
            accounts_payable: "Accounts Payable".to_string(),
        }
    }
}

/// Column-name aliases per logical field.
///
/// The first alias present in the header row wins. Header names are
/// compared trimmed and case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnAliases {
    pub transaction_type: Vec<String>,
    pub status: Vec<String>,
    pub date: Vec<String>,
    pub payee: Vec<String>,
    pub remark: Vec<String>,
    pub reference: Vec<String>,
    pub amount: Vec<String>,
    pub charges: Vec<String>,
    pub commission: Vec<String>,
    pub credit: Vec<String>,
    pub debit: Vec<String>,
}

fn aliases(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

impl Default for ColumnAliases {
    fn default() -> Self {
        ColumnAliases {
            transaction_type: aliases(&["Transaction Type", "Type"]),
            status: aliases(&["Transaction Status", "Status"]),
            date: aliases(&["Date", "Transaction Date"]),
            payee: aliases(&["Account Name", "Payee"]),
            remark: aliases(&["Remark", "Remarks", "Narration"]),
            reference: aliases(&["Reference Id", "Reference", "Reference ID"]),
            amount: aliases(&["Amount"]),
            charges: aliases(&["Charges"]),
            commission: aliases(&["Commission Amount", "Commission"]),
            credit: aliases(&["Credit"]),
            debit: aliases(&["Debit"]),
        }
    }
}

/// Source column that carries a withdrawal's amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalField {
    #[default]
    Credit,
    Debit,
}

/// Which side of a withdrawal the external bank account sits on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalSign {
    /// Bank line carries `-amount`, float line `+amount`.
    #[default]
    CreditBank,

    /// Bank line carries `+amount`, float line `-amount`.
    DebitBank,
}

/// Withdrawal amount source and sign convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WithdrawalConvention {
    pub amount_field: WithdrawalField,
    pub sign: WithdrawalSign,
}

/// Field order for numeric dates such as `01/02/2024`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    #[default]
    MonthFirst,
    DayFirst,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.accounts.float_account, "Openfloat");
        assert_eq!(config.accounts.bank_account, "Pesapal");
        assert_eq!(config.skip_rows, 0);
        assert_eq!(config.withdrawal.amount_field, WithdrawalField::Credit);
        assert_eq!(config.withdrawal.sign, WithdrawalSign::CreditBank);
        assert_eq!(config.date_order, DateOrder::MonthFirst);
        assert_eq!(config.unknown_payee, "Unknown Payee");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(
            r#"{
                "accounts": { "float_account": "Mobile Float" },
                "skip_rows": 3,
                "withdrawal": { "amount_field": "debit" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.accounts.float_account, "Mobile Float");
        assert_eq!(config.accounts.accounts_payable, "Accounts Payable");
        assert_eq!(config.skip_rows, 3);
        assert_eq!(config.withdrawal.amount_field, WithdrawalField::Debit);
        assert_eq!(config.withdrawal.sign, WithdrawalSign::CreditBank);
        assert_eq!(config.columns, ColumnAliases::default());
    }

    #[test]
    fn test_column_aliases_override() {
        let config = Config::from_json(r#"{ "columns": { "payee": ["Merchant"] } }"#).unwrap();
        assert_eq!(config.columns.payee, vec!["Merchant".to_string()]);
        assert_eq!(config.columns.date, ColumnAliases::default().date);
    }

    #[test]
    fn test_enum_spellings() {
        let config = Config::from_json(
            r#"{ "date_order": "day_first", "withdrawal": { "sign": "debit_bank" } }"#,
        )
        .unwrap();
        assert_eq!(config.date_order, DateOrder::DayFirst);
        assert_eq!(config.withdrawal.sign, WithdrawalSign::DebitBank);
    }

    #[test]
    fn test_command_line_spellings() {
        assert_eq!(
            WithdrawalSign::from_str("debit-bank", false),
            Ok(WithdrawalSign::DebitBank)
        );
        assert_eq!(
            WithdrawalField::from_str("credit", false),
            Ok(WithdrawalField::Credit)
        );
        assert!(WithdrawalSign::from_str("debit_bank", false).is_err());
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = Config::from_json("{ not json").unwrap_err();
        assert!(matches!(err, crate::error::ConvertError::Config(_)));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "unknown_payee": "Walk-in" }"#).unwrap();

        let config = Config::from_path(&path).unwrap();
        assert_eq!(config.unknown_payee, "Walk-in");
    }
}
