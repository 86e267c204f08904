//! Readers for the fixed-layout QC metric TSV files written by QCCalculator.
//!
//! Each dialect is a [`QcFormat`]: the header it must carry and the typed
//! columns its rows map onto. [`read_qc_table`] is the shared driver.

use std::io::BufRead;

use crate::cancel::CancelToken;
use crate::data::CoercePolicy;
use crate::error::ReadError;
use crate::rows::{Cardinality, LineParser};
use crate::schema::{Column, ColumnType, Schema};
use crate::table::{Table, TableBuilder};

/// One fixed-layout QC TSV dialect.
///
/// The header line must match `expected_header` name for name. Data rows are
/// parsed positionally against `schema`; tokens past the schema width are
/// always ignored, the tolerance flags only relax the header check.
pub trait QcFormat {
    fn expected_header(&self) -> &'static [&'static str];

    fn schema(&self) -> Schema;

    /// Extra header columns are tolerated instead of rejected.
    fn ignore_additional(&self) -> bool {
        false
    }

    /// Missing trailing header columns are tolerated.
    fn ignore_missing(&self) -> bool {
        false
    }
}

/// Per-precursor metrics: retention time, mass-to-charge, charge, signal
/// quality.
pub struct PrecursorFormat;

impl QcFormat for PrecursorFormat {
    fn expected_header(&self) -> &'static [&'static str] {
        &[
            "MS:1000894_[sec]",
            "MS:1000040",
            "MS:1000041",
            "S/N",
            "peak_count",
        ]
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Column::new("RT", ColumnType::Double),
            Column::new("Precursor", ColumnType::Double),
            Column::new("Charge", ColumnType::Integer),
            Column::new("S/N", ColumnType::Double),
            Column::new("Peak Count", ColumnType::Integer),
        ])
    }
}

/// Per-identification metrics with mass deviation in ppm.
pub struct IdFormat;

impl QcFormat for IdFormat {
    fn expected_header(&self) -> &'static [&'static str] {
        &[
            "RT",
            "MZ",
            "Score",
            "PeptideSequence",
            "Charge",
            "TheoreticalWeight",
            "delta_ppm",
        ]
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Column::new("RT", ColumnType::Double),
            Column::new("MZ", ColumnType::Double),
            Column::new("Score", ColumnType::Double),
            Column::new("PeptideSequence", ColumnType::String),
            Column::new("Charge", ColumnType::Integer),
            Column::new("TheoreticalWeight", ColumnType::Double),
            Column::new("DeltaPpm", ColumnType::Double),
        ])
    }

    fn ignore_additional(&self) -> bool {
        true
    }
}

/// Per-run average MS1 ion injection time.
pub struct IonInjectionFormat;

impl QcFormat for IonInjectionFormat {
    fn expected_header(&self) -> &'static [&'static str] {
        &["run_id", "ion_inj_time_ms1_avg"]
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            Column::new("RunId", ColumnType::String),
            Column::new("IonInjectionTimeAverage", ColumnType::Double),
        ])
    }

    fn ignore_additional(&self) -> bool {
        true
    }
}

/// Reads one QC TSV file: the first line must be the format's header, every
/// following non-empty line becomes one row.
pub fn read_qc_table(
    format: &dyn QcFormat,
    input: impl BufRead,
    cancel: &CancelToken,
) -> Result<Table, ReadError> {
    let mut lines = input.lines();
    let header = lines.next().transpose()?;
    validate_header(format, header.as_deref())?;

    let policy = CoercePolicy::strict();
    let mut builder = TableBuilder::new(format.schema());
    let mut line_no: u64 = 1;
    for line in lines {
        let line = line?;
        line_no += 1;
        cancel.check()?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parser = LineParser::new(builder.schema(), policy.clone(), "\t")
            .cardinality(Cardinality::AtLeast);
        let row = parser.parse(trimmed, line_no)?;
        builder.push(row);
    }
    Ok(builder.finish())
}

fn validate_header(format: &dyn QcFormat, header: Option<&str>) -> Result<(), ReadError> {
    let Some(header) = header else {
        return Err(ReadError::InvalidHeader(
            "Could not extract a header from the given file.".to_string(),
        ));
    };
    let names: Vec<&str> = header.trim().split('\t').collect();
    let expected = format.expected_header();
    if names.len() > expected.len() && !format.ignore_additional() {
        return Err(ReadError::HeaderWidth {
            expected: expected.len(),
            actual: names.len(),
        });
    }
    if names.len() < expected.len() && !format.ignore_missing() {
        return Err(ReadError::HeaderWidth {
            expected: expected.len(),
            actual: names.len(),
        });
    }
    for (want, got) in expected.iter().zip(&names) {
        if want != got {
            return Err(ReadError::HeaderName {
                expected: (*want).to_string(),
                actual: (*got).to_string(),
            });
        }
    }
    Ok(())
}
