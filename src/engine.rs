//! Batch conversion engine.
//!
//! Reads an export, runs every row through normalize → classify → build, and
//! keeps the resulting groups in input order. Rows are independent; a row
//! that cannot be posted is logged and skipped without affecting the others.

use crate::classify::{classify, Classification, DropReason};
use crate::config::Config;
use crate::error::{ConvertError, Result};
use crate::iif;
use crate::ledger::{EntryBuilder, EntryGroup};
use crate::normalize::normalize;
use crate::transaction::RawRow;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, error, info, warn};
use std::fmt;
use std::io::{BufRead, BufReader, Read, Write};

/// Per-batch counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub rows_read: usize,
    pub groups_emitted: usize,
    pub not_successful: usize,
    pub invalid_date: usize,
    pub no_fee_amount: usize,
    pub amount_overflow: usize,
    pub unclassified: usize,
    pub unbalanced: usize,
    pub malformed: usize,
}

impl ConversionSummary {
    fn record_drop(&mut self, reason: DropReason) {
        match reason {
            DropReason::NotSuccessful => self.not_successful += 1,
            DropReason::InvalidDate => self.invalid_date += 1,
            DropReason::NoFeeAmount => self.no_fee_amount += 1,
            DropReason::AmountOverflow => self.amount_overflow += 1,
            DropReason::Unclassified => self.unclassified += 1,
        }
    }

    /// Rows read that produced no group.
    pub fn dropped(&self) -> usize {
        self.not_successful
            + self.invalid_date
            + self.no_fee_amount
            + self.amount_overflow
            + self.unclassified
            + self.unbalanced
    }
}

impl fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows read, {} entries written, {} dropped \
             (not successful: {}, invalid date: {}, no fee: {}, out of range: {}, \
             unclassified: {}, unbalanced: {}), \
             {} malformed records skipped",
            self.rows_read,
            self.groups_emitted,
            self.dropped(),
            self.not_successful,
            self.invalid_date,
            self.no_fee_amount,
            self.amount_overflow,
            self.unclassified,
            self.unbalanced,
            self.malformed,
        )
    }
}

/// The export-to-IIF converter.
///
/// Holds the configuration and the groups built so far. Output order always
/// matches input row order.
pub struct IifConverter {
    config: Config,
    builder: EntryBuilder,
    groups: Vec<EntryGroup>,
    summary: ConversionSummary,
}

impl IifConverter {
    /// Creates a converter with the given configuration.
    pub fn new(config: Config) -> Self {
        let builder = EntryBuilder::new(&config);
        IifConverter {
            config,
            builder,
            groups: Vec::new(),
            summary: ConversionSummary::default(),
        }
    }

    /// Converts a CSV export.
    ///
    /// The first `skip_rows` lines are discarded, the next line is the header.
    /// Fails without adding any groups if the input is unreadable, empty, or
    /// lacks a required column. Malformed individual records are logged at
    /// warn level and skipped.
    pub fn process_csv<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut reader = BufReader::new(reader);
        // Preamble bytes are discarded undecoded; they need not be UTF-8
        let mut preamble = Vec::new();
        for _ in 0..self.config.skip_rows {
            preamble.clear();
            if reader.read_until(b'\n', &mut preamble)? == 0 {
                break;
            }
        }

        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        self.check_headers(&headers)?;

        let mut rows = Vec::new();
        for (row_idx, result) in csv_reader.records().enumerate() {
            // 1-indexed, accounting for preamble and header row
            let row_num = self.config.skip_rows + row_idx + 2;

            match result {
                Ok(record) => rows.push((row_num, RawRow::from_record(&headers, &record))),
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    warn!("Row {}: CSV parse error: {}", row_num, e);
                    self.summary.malformed += 1;
                }
            }
        }

        self.process_numbered(rows);
        Ok(())
    }

    /// Converts rows that were already read as a table.
    ///
    /// Row numbers in log messages start at 1.
    pub fn process_rows<I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = RawRow>,
    {
        let numbered = rows
            .into_iter()
            .enumerate()
            .map(|(idx, row)| (idx + 1, row))
            .collect::<Vec<_>>();
        self.process_numbered(numbered);
    }

    fn process_numbered(&mut self, rows: Vec<(usize, RawRow)>) {
        let before = self.summary;
        for (row_num, raw) in rows {
            self.process_row(&raw, row_num);
        }

        let batch = ConversionSummary {
            rows_read: self.summary.rows_read - before.rows_read,
            groups_emitted: self.summary.groups_emitted - before.groups_emitted,
            not_successful: self.summary.not_successful - before.not_successful,
            invalid_date: self.summary.invalid_date - before.invalid_date,
            no_fee_amount: self.summary.no_fee_amount - before.no_fee_amount,
            amount_overflow: self.summary.amount_overflow - before.amount_overflow,
            unclassified: self.summary.unclassified - before.unclassified,
            unbalanced: self.summary.unbalanced - before.unbalanced,
            malformed: self.summary.malformed - before.malformed,
        };
        info!("{}", batch);
    }

    /// Processes a single raw row.
    fn process_row(&mut self, raw: &RawRow, row: usize) {
        self.summary.rows_read += 1;

        let normalized = normalize(raw, &self.config);
        match classify(normalized, self.config.withdrawal.amount_field) {
            Classification::Dropped(reason) => {
                debug!("Row {}: Skipped, {}", row, reason);
                self.summary.record_drop(reason);
            }
            Classification::Classified(classified) => match self.builder.build(&classified) {
                Ok(group) => {
                    debug!(
                        "Row {}: {:?} of {} on {}",
                        row,
                        group.category(),
                        classified.amount,
                        group.date()
                    );
                    self.groups.push(group);
                    self.summary.groups_emitted += 1;
                }
                Err(e) => {
                    error!("Row {}: {}, skipping", row, e);
                    match e {
                        ConvertError::AmountOverflow(_) => self.summary.amount_overflow += 1,
                        ConvertError::NotPostable(_) => self.summary.unclassified += 1,
                        _ => self.summary.unbalanced += 1,
                    }
                }
            },
        }
    }

    fn check_headers(&self, headers: &StringRecord) -> Result<()> {
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(ConvertError::EmptyInput);
        }

        let columns = &self.config.columns;
        let required = [
            &columns.status,
            &columns.transaction_type,
            &columns.date,
        ];

        let missing: Vec<String> = required
            .iter()
            .filter(|aliases| {
                !aliases.iter().any(|alias| {
                    headers
                        .iter()
                        .any(|h| h.trim().eq_ignore_ascii_case(alias.trim()))
                })
            })
            .map(|aliases| aliases.join(" / "))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConvertError::MissingColumns { missing })
        }
    }

    /// Groups built so far, in input order.
    pub fn groups(&self) -> &[EntryGroup] {
        &self.groups
    }

    /// Counters accumulated over every batch processed.
    pub fn summary(&self) -> &ConversionSummary {
        &self.summary
    }

    /// Writes the IIF document.
    pub fn write_output<W: Write>(&self, writer: W) -> Result<()> {
        iif::write_document(writer, &self.groups)
    }

    /// Renders the IIF document into a string.
    pub fn render(&self) -> Result<String> {
        iif::render_document(&self.groups)
    }
}

impl Default for IifConverter {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
