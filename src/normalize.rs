//! Row normalization.
//!
//! Turns a [`RawRow`] into a [`NormalizedRow`]. None of these functions fail;
//! a field that cannot be read degrades to a safe default instead.

use crate::config::{Config, DateOrder};
use crate::money::Money;
use crate::transaction::{NormalizedRow, RawRow, TransactionType};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

/// Placeholder written when a row carries no reference number.
pub const NO_REFERENCE: &str = "N/A";

/// Minimum digit count for a token to be treated as a paybill or phone code.
const MIN_CODE_DIGITS: usize = 5;

/// Earliest year accepted. `%Y` reads any digit count, so "01/02/24" would
/// otherwise parse as year 1 under `%Y/%m/%d`.
const MIN_YEAR: i32 = 1900;

const ISO_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

// Two-digit year formats come first: `%Y` would read "24" as year 24 AD.
const MONTH_FIRST_FORMATS: &[&str] = &["%m/%d/%y", "%m/%d/%Y", "%m-%d-%y", "%m-%d-%Y"];
const DAY_FIRST_FORMATS: &[&str] = &["%d/%m/%y", "%d/%m/%Y", "%d-%m-%y", "%d-%m-%Y"];

const OTHER_FORMATS: &[&str] = &[
    "%d.%m.%Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%b %d %Y",
];

fn time_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:T|\s+)\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?\s*(?:[AaPp]\.?[Mm]\.?)?\s*(?:Z|[+-]\d{2}:?\d{2})?$",
        )
        .expect("time suffix regex")
    })
}

fn numeric_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?(\d+)$").expect("numeric code regex"))
}

fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-|/:–—]+$").expect("separator regex"))
}

/// Normalizes one raw export row.
pub fn normalize(raw: &RawRow, config: &Config) -> NormalizedRow {
    let columns = &config.columns;
    let text = |aliases: &[String]| raw.get(aliases).unwrap_or("").trim().to_string();
    let money = |aliases: &[String]| raw.get(aliases).map(parse_amount).unwrap_or_default();

    NormalizedRow {
        date: raw
            .get(&columns.date)
            .and_then(|d| parse_date(d, config.date_order)),
        status: normalize_status(raw.get(&columns.status).unwrap_or("")),
        transaction_type: TransactionType::parse(raw.get(&columns.transaction_type).unwrap_or("")),
        payee: clean_payee(raw.get_non_blank(&columns.payee), &config.unknown_payee),
        remark: text(&columns.remark),
        reference_id: reference_or_placeholder(raw.get(&columns.reference)),
        amount: money(&columns.amount),
        charges: money(&columns.charges),
        commission: money(&columns.commission),
        credit: money(&columns.credit),
        debit: money(&columns.debit),
    }
}

/// Parses an amount cell. Alias of [`Money::parse_lenient`].
pub fn parse_amount(raw: &str) -> Money {
    Money::parse_lenient(raw)
}

/// Parses a calendar date, ignoring any trailing time of day.
///
/// Numeric dates are read in `order` first and in the opposite order only if
/// that fails, so `13/02/2024` still resolves under month-first.
pub fn parse_date(raw: &str, order: DateOrder) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (preferred, fallback) = match order {
        DateOrder::MonthFirst => (MONTH_FIRST_FORMATS, DAY_FIRST_FORMATS),
        DateOrder::DayFirst => (DAY_FIRST_FORMATS, MONTH_FIRST_FORMATS),
    };

    ISO_FORMATS
        .iter()
        .chain(preferred)
        .chain(fallback)
        .chain(OTHER_FORMATS)
        .find_map(|fmt| parse_date_with(raw, fmt))
}

fn parse_date_with(raw: &str, fmt: &str) -> Option<NaiveDate> {
    let (date, rest) = NaiveDate::parse_and_remainder(raw, fmt).ok()?;
    if date.year() < MIN_YEAR {
        return None;
    }
    if rest.trim().is_empty() || time_suffix_re().is_match(rest.trim_end()) {
        Some(date)
    } else {
        None
    }
}

/// Renders a date the way the IIF document expects it.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

/// Lowercases a status and collapses inner whitespace.
pub fn normalize_status(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn is_numeric_code(token: &str) -> bool {
    numeric_code_re()
        .captures(token)
        .map(|caps| caps[1].len() >= MIN_CODE_DIGITS)
        .unwrap_or(false)
}

fn is_separator(word: &str) -> bool {
    separator_re().is_match(word)
}

/// Strips paybill and phone codes from a display name.
///
/// A whitespace-separated word, or a hyphen-joined part of one, made only of
/// digits (optionally `+`-prefixed) with at least five digits is removed.
/// Adjacent digit-only words count as one code, so a number written in
/// groups like "0712 345 678" goes as a whole.
/// Separators left dangling at either end are dropped and repeated
/// separators collapse to one. Short numbers such as "7-Eleven" or
/// "Route 66" survive. Returns `placeholder` when nothing is left.
///
/// ```
/// use float_iif::normalize::clean_payee;
///
/// assert_eq!(clean_payee(Some("254700 - Acme"), "Unknown"), "Acme");
/// assert_eq!(clean_payee(Some("0712345678"), "Unknown"), "Unknown");
/// assert_eq!(clean_payee(Some("0712 345 678 - Jane"), "Unknown"), "Jane");
/// assert_eq!(clean_payee(None, "Unknown"), "Unknown");
/// ```
pub fn clean_payee(raw: Option<&str>, placeholder: &str) -> String {
    let Some(raw) = raw else {
        return placeholder.to_string();
    };

    let mut words: Vec<String> = Vec::new();
    for word in drop_code_runs(raw.split_whitespace()) {
        let kept = if is_separator(word) {
            word.to_string()
        } else {
            word.split('-')
                .filter(|part| !is_numeric_code(part))
                .collect::<Vec<_>>()
                .join("-")
        };

        if kept.is_empty() {
            continue;
        }
        let previous_is_separator = words.last().map(|w| is_separator(w)).unwrap_or(true);
        if is_separator(&kept) && previous_is_separator {
            continue;
        }
        words.push(kept);
    }

    while words.last().map(|w| is_separator(w)).unwrap_or(false) {
        words.pop();
    }

    if words.is_empty() {
        placeholder.to_string()
    } else {
        words.join(" ")
    }
}

// Drops runs of digit-only words whose digits together reach the code length.
// A `+` prefix always starts a new run.
fn drop_code_runs<'a>(words: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut kept = Vec::new();
    let mut run = Vec::new();
    for word in words {
        if !numeric_code_re().is_match(word) {
            flush_code_run(&mut run, &mut kept);
            kept.push(word);
            continue;
        }
        if word.starts_with('+') {
            flush_code_run(&mut run, &mut kept);
        }
        run.push(word);
    }
    flush_code_run(&mut run, &mut kept);
    kept
}

fn flush_code_run<'a>(run: &mut Vec<&'a str>, kept: &mut Vec<&'a str>) {
    let digits: usize = run.iter().map(|w| w.trim_start_matches('+').len()).sum();
    if digits < MIN_CODE_DIGITS {
        kept.extend(run.iter().copied());
    }
    run.clear();
}

/// Builds `"{payee} - {remark}"`, trimming stray spaces and hyphens.
pub fn build_memo(payee: &str, remark: &str) -> String {
    format!("{} - {}", payee, remark)
        .trim_matches(|c: char| c == ' ' || c == '-')
        .to_string()
}

fn reference_or_placeholder(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(r) if !r.is_empty() => r.to_string(),
        _ => NO_REFERENCE.to_string(),
    }
}
