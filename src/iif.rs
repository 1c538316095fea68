//! IIF document serialization.
//!
//! The document opens with a fixed declaration block, then each group as one
//! `TRNS` record, its `SPL` records and an `ENDTRNS` terminator. Groups are
//! written in the order given.

use crate::error::Result;
use crate::ledger::{EntryGroup, LedgerLine};
use crate::normalize::format_date;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::io::Write;

/// Column declaration for header lines.
pub const TRNS_COLUMNS: [&str; 9] = [
    "!TRNS", "TRNSTYPE", "DATE", "ACCNT", "NAME", "AMOUNT", "DOCNUM", "MEMO", "CLEAR",
];

/// Column declaration for split lines.
pub const SPL_COLUMNS: [&str; 8] = [
    "!SPL", "TRNSTYPE", "DATE", "ACCNT", "NAME", "AMOUNT", "MEMO", "CLEAR",
];

/// Group terminator declaration.
pub const ENDTRNS_COLUMNS: [&str; 1] = ["!ENDTRNS"];

// IIF has no quoting, so field separators inside values are flattened.
fn cell(value: &str) -> String {
    value
        .chars()
        .map(|c| if matches!(c, '\t' | '\r' | '\n') { ' ' } else { c })
        .collect()
}

fn clear_flag(line: &LedgerLine) -> &'static str {
    if line.cleared {
        "Y"
    } else {
        "N"
    }
}

fn trns_record(line: &LedgerLine) -> [String; 9] {
    [
        "TRNS".to_string(),
        line.trns_type.code().to_string(),
        format_date(line.date),
        cell(&line.account),
        cell(line.name.as_deref().unwrap_or("")),
        line.amount.to_string(),
        cell(line.doc_num.as_deref().unwrap_or("")),
        cell(&line.memo),
        clear_flag(line).to_string(),
    ]
}

fn spl_record(line: &LedgerLine) -> [String; 8] {
    [
        "SPL".to_string(),
        line.trns_type.code().to_string(),
        format_date(line.date),
        cell(&line.account),
        cell(line.name.as_deref().unwrap_or("")),
        line.amount.to_string(),
        cell(&line.memo),
        clear_flag(line).to_string(),
    ]
}

/// Writes the full document for `groups` to `writer`.
pub fn write_document<W: Write>(writer: W, groups: &[EntryGroup]) -> Result<()> {
    let mut iif_writer = WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(writer);

    iif_writer.write_record(TRNS_COLUMNS)?;
    iif_writer.write_record(SPL_COLUMNS)?;
    iif_writer.write_record(ENDTRNS_COLUMNS)?;

    for group in groups {
        iif_writer.write_record(trns_record(group.header()))?;
        for split in group.splits() {
            iif_writer.write_record(spl_record(split))?;
        }
        iif_writer.write_record(["ENDTRNS"])?;
    }

    iif_writer.flush()?;
    Ok(())
}

/// Renders the full document into a string.
pub fn render_document(groups: &[EntryGroup]) -> Result<String> {
    let mut buffer = Vec::new();
    write_document(&mut buffer, groups)?;
    // Every cell is built from `String`s, so the buffer is valid UTF-8.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Category;
    use crate::ledger::TrnsType;
    use crate::money::Money;
    use chrono::NaiveDate;
    use std::str::FromStr;

    const HEADER_BLOCK: &str = "!TRNS\tTRNSTYPE\tDATE\tACCNT\tNAME\tAMOUNT\tDOCNUM\tMEMO\tCLEAR\n\
                                !SPL\tTRNSTYPE\tDATE\tACCNT\tNAME\tAMOUNT\tMEMO\tCLEAR\n\
                                !ENDTRNS\n";

    fn line(account: &str, name: Option<&str>, amount: &str, memo: &str) -> LedgerLine {
        LedgerLine {
            trns_type: TrnsType::Transfer,
            date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            account: account.to_string(),
            name: name.map(str::to_string),
            amount: Money::from_str(amount).unwrap(),
            doc_num: None,
            memo: memo.to_string(),
            cleared: false,
        }
    }

    fn group(memo: &str) -> EntryGroup {
        let mut header = line("Pesapal", Some("Acme"), "-300", memo);
        header.doc_num = Some("W1".to_string());
        EntryGroup::new(
            Category::Withdrawal,
            header,
            vec![line("Openfloat", None, "300", memo)],
        )
        .unwrap()
    }

    #[test]
    fn test_empty_document_has_header_block() {
        assert_eq!(render_document(&[]).unwrap(), HEADER_BLOCK);
    }

    #[test]
    fn test_group_layout() {
        let output = render_document(&[group("Acme")]).unwrap();
        let expected = format!(
            "{}TRNS\tTRANSFER\t03/09/2024\tPesapal\tAcme\t-300.00\tW1\tAcme\tN\n\
             SPL\tTRANSFER\t03/09/2024\tOpenfloat\t\t300.00\tAcme\tN\n\
             ENDTRNS\n",
            HEADER_BLOCK
        );
        assert_eq!(output, expected);
    }

    #[test]
    fn test_missing_optional_fields_are_empty_cells() {
        let output = render_document(&[group("Acme")]).unwrap();
        let spl = output.lines().find(|l| l.starts_with("SPL")).unwrap();
        assert_eq!(spl.split('\t').count(), SPL_COLUMNS.len());
        assert_eq!(spl.split('\t').nth(4), Some(""));

        let trns = output.lines().find(|l| l.starts_with("TRNS")).unwrap();
        assert_eq!(trns.split('\t').count(), TRNS_COLUMNS.len());
    }

    #[test]
    fn test_groups_keep_order() {
        let output = render_document(&[group("first"), group("second")]).unwrap();
        let first = output.find("\tfirst\t").unwrap();
        let second = output.find("\tsecond\t").unwrap();
        assert!(first < second);
        assert_eq!(output.matches("\nENDTRNS\n").count(), 2);
    }

    #[test]
    fn test_tabs_and_newlines_flattened() {
        let output = render_document(&[group("multi\tline\nmemo")]).unwrap();
        assert!(output.contains("\tmulti line memo\t"));
        assert_eq!(output.lines().count(), 6);
    }

    #[test]
    fn test_quotes_written_verbatim() {
        let output = render_document(&[group("say \"hi\", ok")]).unwrap();
        assert!(output.contains("\tsay \"hi\", ok\t"));
    }
}
