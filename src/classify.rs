//! Transaction classification.
//!
//! Rows are run through [`RULES`] in order and the first rule that reaches a
//! verdict decides. A row no rule accepts is dropped as unclassified.
//! Dropping is policy, not failure: the batch always continues.

use crate::config::WithdrawalField;
use crate::money::Money;
use crate::transaction::{NormalizedRow, TransactionType};
use chrono::NaiveDate;
use std::fmt;

/// Ledger category assigned to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Bill payment out of the float account.
    Payment,

    /// Float funds settled to the external account.
    Withdrawal,

    /// Charges and commission taken by the aggregator.
    Fee,

    /// No rule matched; nothing is emitted.
    Unclassified,
}

/// Why a row produced no ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// Status other than "Successful".
    NotSuccessful,

    /// Date missing or unrecognized.
    InvalidDate,

    /// Fee row whose charges and commission sum to zero or less.
    NoFeeAmount,

    /// An amount on the row is too large to post.
    AmountOverflow,

    /// No classification rule matched.
    Unclassified,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DropReason::NotSuccessful => "status is not successful",
            DropReason::InvalidDate => "date is missing or invalid",
            DropReason::NoFeeAmount => "fee total is not positive",
            DropReason::AmountOverflow => "amount out of range",
            DropReason::Unclassified => "no classification rule matched",
        };
        f.write_str(text)
    }
}

/// A row accepted for posting, with the amount that drives its entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRow {
    pub category: Category,
    pub date: NaiveDate,

    /// Payment amount, withdrawal amount or fee total. Always positive.
    pub amount: Money,

    pub row: NormalizedRow,
}

/// Outcome of classifying one row.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Classified(ClassifiedRow),
    Dropped(DropReason),
}

impl Classification {
    /// Category of the row, `Unclassified` when dropped.
    pub fn category(&self) -> Category {
        match self {
            Classification::Classified(c) => c.category,
            Classification::Dropped(_) => Category::Unclassified,
        }
    }
}

/// Decision reached by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept(Category, Money),
    Drop(DropReason),
}

/// A classification rule. Returns `None` to defer to the next rule.
pub type RuleFn = fn(&NormalizedRow, WithdrawalField) -> Option<Verdict>;

/// A named entry in the rule table.
pub struct Rule {
    pub name: &'static str,
    pub check: RuleFn,
}

/// Classification rules in priority order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "successful-status",
        check: require_successful,
    },
    Rule {
        name: "valid-date",
        check: require_date,
    },
    Rule {
        name: "payment",
        check: payment,
    },
    Rule {
        name: "withdrawal",
        check: withdrawal,
    },
    Rule {
        name: "fee",
        check: fee,
    },
];

fn require_successful(row: &NormalizedRow, _: WithdrawalField) -> Option<Verdict> {
    (!row.is_successful()).then_some(Verdict::Drop(DropReason::NotSuccessful))
}

fn require_date(row: &NormalizedRow, _: WithdrawalField) -> Option<Verdict> {
    row.date
        .is_none()
        .then_some(Verdict::Drop(DropReason::InvalidDate))
}

fn payment(row: &NormalizedRow, _: WithdrawalField) -> Option<Verdict> {
    (row.transaction_type == TransactionType::Payment && row.amount.is_positive())
        .then_some(Verdict::Accept(Category::Payment, row.amount))
}

fn withdrawal(row: &NormalizedRow, field: WithdrawalField) -> Option<Verdict> {
    let amount = match field {
        WithdrawalField::Credit => row.credit,
        WithdrawalField::Debit => row.debit,
    };
    (row.transaction_type == TransactionType::Withdrawal && amount.is_positive())
        .then_some(Verdict::Accept(Category::Withdrawal, amount))
}

fn fee(row: &NormalizedRow, _: WithdrawalField) -> Option<Verdict> {
    if !(row.transaction_type.is_fee() || row.charges.is_positive() || row.commission.is_positive())
    {
        return None;
    }

    let verdict = match row.fee_total() {
        Some(total) if total.is_positive() => Verdict::Accept(Category::Fee, total),
        Some(_) => Verdict::Drop(DropReason::NoFeeAmount),
        None => Verdict::Drop(DropReason::AmountOverflow),
    };
    Some(verdict)
}

/// Runs the rule table against `row`.
///
/// Returns the verdict and the name of the rule that reached it.
pub fn evaluate(row: &NormalizedRow, field: WithdrawalField) -> (Verdict, &'static str) {
    RULES
        .iter()
        .find_map(|rule| (rule.check)(row, field).map(|v| (v, rule.name)))
        .unwrap_or((Verdict::Drop(DropReason::Unclassified), "fallthrough"))
}

/// Classifies a normalized row.
pub fn classify(row: NormalizedRow, field: WithdrawalField) -> Classification {
    match evaluate(&row, field).0 {
        Verdict::Drop(reason) => Classification::Dropped(reason),
        Verdict::Accept(category, amount) => match row.date {
            Some(date) => Classification::Classified(ClassifiedRow {
                category,
                date,
                amount,
                row,
            }),
            None => Classification::Dropped(DropReason::InvalidDate),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn money(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    fn row(tx_type: TransactionType) -> NormalizedRow {
        NormalizedRow {
            date: NaiveDate::from_ymd_opt(2024, 1, 2),
            status: "successful".to_string(),
            transaction_type: tx_type,
            payee: "Acme".to_string(),
            remark: String::new(),
            reference_id: "N/A".to_string(),
            amount: Money::ZERO,
            charges: Money::ZERO,
            commission: Money::ZERO,
            credit: Money::ZERO,
            debit: Money::ZERO,
        }
    }

    fn verdict(row: &NormalizedRow) -> Verdict {
        evaluate(row, WithdrawalField::Credit).0
    }

    #[test]
    fn test_rule_order() {
        let names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            ["successful-status", "valid-date", "payment", "withdrawal", "fee"]
        );
    }

    #[test]
    fn test_payment() {
        let mut r = row(TransactionType::Payment);
        r.amount = money("1000");
        assert_eq!(verdict(&r), Verdict::Accept(Category::Payment, money("1000")));
    }

    #[test]
    fn test_payment_with_zero_amount_is_unclassified() {
        let r = row(TransactionType::Payment);
        assert_eq!(verdict(&r), Verdict::Drop(DropReason::Unclassified));
    }

    #[test]
    fn test_status_checked_before_everything() {
        let mut r = row(TransactionType::Payment);
        r.amount = money("500");
        r.status = "pending".to_string();
        r.date = None;
        assert_eq!(
            evaluate(&r, WithdrawalField::Credit),
            (Verdict::Drop(DropReason::NotSuccessful), "successful-status")
        );
    }

    #[test]
    fn test_invalid_date_dropped() {
        let mut r = row(TransactionType::Payment);
        r.amount = money("500");
        r.date = None;
        assert_eq!(verdict(&r), Verdict::Drop(DropReason::InvalidDate));
    }

    #[test]
    fn test_withdrawal_uses_configured_field() {
        let mut r = row(TransactionType::Withdrawal);
        r.credit = money("300");

        assert_eq!(
            evaluate(&r, WithdrawalField::Credit).0,
            Verdict::Accept(Category::Withdrawal, money("300"))
        );
        assert_eq!(
            evaluate(&r, WithdrawalField::Debit).0,
            Verdict::Drop(DropReason::Unclassified)
        );

        r.debit = money("250");
        assert_eq!(
            evaluate(&r, WithdrawalField::Debit).0,
            Verdict::Accept(Category::Withdrawal, money("250"))
        );
    }

    #[test]
    fn test_fee_by_type() {
        let mut r = row(TransactionType::Charges);
        r.charges = money("50");
        r.commission = money("25");
        assert_eq!(verdict(&r), Verdict::Accept(Category::Fee, money("75")));
    }

    #[test]
    fn test_fee_by_amount_on_other_type() {
        let mut r = row(TransactionType::Other("Collection".to_string()));
        r.commission = money("12.5");
        assert_eq!(verdict(&r), Verdict::Accept(Category::Fee, money("12.50")));
    }

    #[test]
    fn test_fee_type_without_amount_dropped() {
        let r = row(TransactionType::Commission);
        assert_eq!(
            evaluate(&r, WithdrawalField::Credit),
            (Verdict::Drop(DropReason::NoFeeAmount), "fee")
        );
    }

    #[test]
    fn test_fee_overflow_dropped() {
        let mut r = row(TransactionType::Charges);
        r.charges = Money::from(rust_decimal::Decimal::MAX);
        r.commission = Money::from(rust_decimal::Decimal::MAX);
        assert_eq!(
            evaluate(&r, WithdrawalField::Credit),
            (Verdict::Drop(DropReason::AmountOverflow), "fee")
        );
    }

    #[test]
    fn test_payment_takes_priority_over_fee() {
        let mut r = row(TransactionType::Payment);
        r.amount = money("100");
        r.charges = money("5");
        assert_eq!(verdict(&r), Verdict::Accept(Category::Payment, money("100")));
    }

    #[test]
    fn test_unknown_type_unclassified() {
        let mut r = row(TransactionType::Other("Deposit".to_string()));
        r.amount = money("100");
        assert_eq!(
            evaluate(&r, WithdrawalField::Credit),
            (Verdict::Drop(DropReason::Unclassified), "fallthrough")
        );
    }

    #[test]
    fn test_classify_carries_row() {
        let mut r = row(TransactionType::Payment);
        r.amount = money("10");

        match classify(r.clone(), WithdrawalField::Credit) {
            Classification::Classified(c) => {
                assert_eq!(c.category, Category::Payment);
                assert_eq!(c.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
                assert_eq!(c.amount, money("10"));
                assert_eq!(c.row, r);
            }
            other => panic!("Expected Classified, got {:?}", other),
        }
    }

    #[test]
    fn test_dropped_category_is_unclassified() {
        let r = row(TransactionType::Payment);
        let result = classify(r, WithdrawalField::Credit);
        assert_eq!(result, Classification::Dropped(DropReason::Unclassified));
        assert_eq!(result.category(), Category::Unclassified);
    }
}
