//! Ledger entry groups and the builder that produces them.
//!
//! Maintains the invariant: the signed amounts of every group sum to zero.

use crate::classify::{Category, ClassifiedRow};
use crate::config::{Accounts, Config, WithdrawalSign};
use crate::error::{ConvertError, Result};
use crate::money::Money;
use crate::normalize::build_memo;
use chrono::NaiveDate;

/// IIF transaction type written in the `TRNSTYPE` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrnsType {
    BillPayment,
    Transfer,
    Check,
}

impl TrnsType {
    /// Code understood by the accounting package.
    pub fn code(&self) -> &'static str {
        match self {
            TrnsType::BillPayment => "BILLPMT",
            TrnsType::Transfer => "TRANSFER",
            TrnsType::Check => "CHECK",
        }
    }
}

/// One posting within a group.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerLine {
    pub trns_type: TrnsType,
    pub date: NaiveDate,
    pub account: String,

    /// Payee, written as an empty cell when absent.
    pub name: Option<String>,

    /// Signed amount. Negative credits the account.
    pub amount: Money,

    /// Reference number; only ever set on the header line.
    pub doc_num: Option<String>,

    pub memo: String,
    pub cleared: bool,
}

/// A balanced transaction: one header line followed by its splits.
///
/// # Invariants
///
/// - At least one split line follows the header
/// - The amounts of all lines sum to exactly zero
///
/// Both are checked by [`EntryGroup::new`]; a group that exists is balanced.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryGroup {
    category: Category,
    date: NaiveDate,
    memo: String,
    lines: Vec<LedgerLine>,
}

impl EntryGroup {
    /// Creates a group, rejecting it if the lines do not net to zero.
    ///
    /// Returns [`ConvertError::AmountOverflow`] if summing the lines overflows.
    pub fn new(
        category: Category,
        header: LedgerLine,
        splits: Vec<LedgerLine>,
    ) -> Result<Self> {
        let has_splits = !splits.is_empty();
        let date = header.date;
        let memo = header.memo.clone();
        let mut lines = Vec::with_capacity(splits.len() + 1);
        lines.push(header);
        lines.extend(splits);

        let total = Money::checked_sum(lines.iter().map(|l| l.amount))
            .ok_or(ConvertError::AmountOverflow(category))?;
        if !has_splits || !total.is_zero() {
            return Err(ConvertError::Unbalanced { category, total });
        }

        Ok(EntryGroup {
            category,
            date,
            memo,
            lines,
        })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn memo(&self) -> &str {
        &self.memo
    }

    /// The header (`TRNS`) line.
    pub fn header(&self) -> &LedgerLine {
        &self.lines[0]
    }

    /// The split (`SPL`) lines.
    pub fn splits(&self) -> &[LedgerLine] {
        &self.lines[1..]
    }

    /// All lines, header first.
    pub fn lines(&self) -> &[LedgerLine] {
        &self.lines
    }

    /// Sum of all line amounts, summed header first.
    ///
    /// Always `Some(Money::ZERO)`: construction already ran the same sum.
    pub fn total(&self) -> Option<Money> {
        Money::checked_sum(self.lines.iter().map(|l| l.amount))
    }
}

/// Builds entry groups from classified rows.
///
/// Deterministic: the same row and configuration always produce the same
/// lines.
#[derive(Debug, Clone)]
pub struct EntryBuilder {
    accounts: Accounts,
    withdrawal_sign: WithdrawalSign,
}

impl EntryBuilder {
    pub fn new(config: &Config) -> Self {
        EntryBuilder {
            accounts: config.accounts.clone(),
            withdrawal_sign: config.withdrawal.sign,
        }
    }

    /// Builds the group for a classified row.
    ///
    /// Returns [`ConvertError::Unbalanced`] if the lines fail to net to zero
    /// and [`ConvertError::NotPostable`] for unclassified rows.
    pub fn build(&self, classified: &ClassifiedRow) -> Result<EntryGroup> {
        match classified.category {
            Category::Payment => self.payment(classified),
            Category::Withdrawal => self.withdrawal(classified),
            Category::Fee => self.fee(classified),
            Category::Unclassified => Err(ConvertError::NotPostable(Category::Unclassified)),
        }
    }

    /// Money leaves the float account and settles a payable.
    fn payment(&self, c: &ClassifiedRow) -> Result<EntryGroup> {
        let row = &c.row;
        let memo = build_memo(&row.payee, &row.remark);
        let line = |account: &str, amount: Money| LedgerLine {
            trns_type: TrnsType::BillPayment,
            date: c.date,
            account: account.to_string(),
            name: Some(row.payee.clone()),
            amount,
            doc_num: None,
            memo: memo.clone(),
            cleared: false,
        };

        let mut header = line(&self.accounts.float_account, -c.amount);
        header.doc_num = Some(row.reference_id.clone());
        let split = line(&self.accounts.accounts_payable, c.amount);

        EntryGroup::new(Category::Payment, header, vec![split])
    }

    /// Funds move between the float and the external account.
    fn withdrawal(&self, c: &ClassifiedRow) -> Result<EntryGroup> {
        let row = &c.row;
        let memo = build_memo(&row.payee, &row.remark);
        let bank_amount = match self.withdrawal_sign {
            WithdrawalSign::CreditBank => -c.amount,
            WithdrawalSign::DebitBank => c.amount,
        };

        let header = LedgerLine {
            trns_type: TrnsType::Transfer,
            date: c.date,
            account: self.accounts.bank_account.clone(),
            name: Some(row.payee.clone()),
            amount: bank_amount,
            doc_num: Some(row.reference_id.clone()),
            memo: memo.clone(),
            cleared: false,
        };
        let split = LedgerLine {
            trns_type: TrnsType::Transfer,
            date: c.date,
            account: self.accounts.float_account.clone(),
            name: None,
            amount: -bank_amount,
            doc_num: None,
            memo,
            cleared: false,
        };

        EntryGroup::new(Category::Withdrawal, header, vec![split])
    }

    /// Charges and commission expensed out of the float account.
    fn fee(&self, c: &ClassifiedRow) -> Result<EntryGroup> {
        let row = &c.row;
        let memo = if row.remark.is_empty() {
            "Bank Fees".to_string()
        } else {
            format!("Bank Fees - {}", row.remark)
        };
        let line = |account: &str, amount: Money| LedgerLine {
            trns_type: TrnsType::Check,
            date: c.date,
            account: account.to_string(),
            name: Some(row.payee.clone()),
            amount,
            doc_num: None,
            memo: memo.clone(),
            cleared: false,
        };

        let mut header = line(&self.accounts.float_account, -c.amount);
        header.doc_num = Some(row.reference_id.clone());
        let split = line(&self.accounts.bank_fees_account, c.amount);

        EntryGroup::new(Category::Fee, header, vec![split])
    }
}
