//! CSV batch-import row parsing and validation.
//!
//! Input format: ordered columns `subscriber_no, month, year` with a
//! header row that is skipped. The year column is optional and defaults
//! to the supplied year. A bad row never aborts the parse; it is carried
//! through as a failed row so the final report preserves input order.

use std::io::Read;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use telbill_shared::types::BillingPeriod;

/// Errors reading the CSV stream itself (not individual rows).
#[derive(Debug, Error)]
pub enum ImportError {
    /// The CSV stream could not be read at all.
    #[error("failed to read CSV: {0}")]
    Unreadable(#[from] csv::Error),
}

/// A validated billing job for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportJob {
    /// Subscriber number.
    pub subscriber_no: String,
    /// Billing period to calculate.
    pub period: BillingPeriod,
}

/// Input fields echoed back alongside each row's outcome, as far as
/// they could be read from the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowEcho {
    /// Subscriber number as given, if the field was present.
    pub subscriber_no: Option<String>,
    /// Month as given, if the field parsed as an integer.
    pub month: Option<i32>,
    /// Year as given, or the batch default.
    pub year: i32,
}

/// One parsed row: either a job to run or the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// 1-based data row number (header excluded).
    pub line: usize,
    /// Input fields to echo in the report.
    pub echo: RowEcho,
    /// The validated job, or a row-level rejection message.
    pub job: Result<ImportJob, String>,
}

/// Final per-row outcome after calculation, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status")]
pub enum RowOutcome {
    /// The row produced (or refreshed) a bill.
    #[serde(rename = "Success")]
    Imported {
        /// ID of the upserted bill.
        bill_id: Uuid,
    },
    /// The row was rejected or its calculation failed.
    #[serde(rename = "Error")]
    Failed {
        /// Human-readable reason.
        message: String,
    },
}

/// Outcome of one input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowReport {
    /// 1-based data row number (header excluded).
    pub line: usize,
    /// The input fields the row named.
    #[serde(flatten)]
    pub echo: RowEcho,
    /// What happened to the row.
    #[serde(flatten)]
    pub outcome: RowOutcome,
}

/// Parses and validates a CSV stream into per-row jobs.
///
/// Rows with missing or malformed fields come back as `Err` entries with a
/// specific message; parsing continues with the next row.
///
/// # Errors
///
/// Returns `ImportError::Unreadable` only if the stream itself cannot be
/// read as CSV at all.
pub fn parse_csv<R: Read>(reader: R, default_year: i32) -> Result<Vec<ParsedRow>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();

    for (index, record) in csv_reader.records().enumerate() {
        let line = index + 1;
        let (echo, job) = match record {
            Ok(record) => validate_record(&record, default_year),
            Err(e) => (
                RowEcho {
                    subscriber_no: None,
                    month: None,
                    year: default_year,
                },
                Err(format!("unreadable row: {e}")),
            ),
        };
        rows.push(ParsedRow { line, echo, job });
    }

    Ok(rows)
}

/// Validates one record against the `subscriber_no, month, year` layout.
///
/// The echo side fills in as fields are read, so a rejected row still
/// reports whatever it did name.
fn validate_record(
    record: &csv::StringRecord,
    default_year: i32,
) -> (RowEcho, Result<ImportJob, String>) {
    let mut echo = RowEcho {
        subscriber_no: None,
        month: None,
        year: default_year,
    };

    let job = (|| {
        let subscriber_no = record
            .get(0)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "subscriber_no is required".to_string())?;
        echo.subscriber_no = Some(subscriber_no.to_string());

        let month_field = record
            .get(1)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "month is required".to_string())?;

        let month: i32 = month_field
            .parse()
            .map_err(|_| format!("month must be an integer, got '{month_field}'"))?;
        echo.month = Some(month);

        let year = match record.get(2).map(str::trim).filter(|s| !s.is_empty()) {
            Some(field) => field
                .parse()
                .map_err(|_| format!("year must be an integer, got '{field}'"))?,
            None => default_year,
        };
        echo.year = year;

        let period = BillingPeriod::new(month, year).map_err(|e| e.to_string())?;

        Ok(ImportJob {
            subscriber_no: subscriber_no.to_string(),
            period,
        })
    })();

    (echo, job)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &str) -> Vec<ParsedRow> {
        parse_csv(data.as_bytes(), 2025).unwrap()
    }

    #[test]
    fn test_header_is_skipped() {
        let rows = parse("subscriber_no,month,year\n5551234567,4,2025\n");
        assert_eq!(rows.len(), 1);
        let job = rows[0].job.as_ref().unwrap();
        assert_eq!(job.subscriber_no, "5551234567");
        assert_eq!(job.period, BillingPeriod::new(4, 2025).unwrap());
    }

    #[test]
    fn test_year_defaults_to_current() {
        let rows = parse("subscriber_no,month,year\n5551234567,4\n5559876543,7,\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].job.as_ref().unwrap().period.year, 2025);
        assert_eq!(rows[1].job.as_ref().unwrap().period.year, 2025);
    }

    #[test]
    fn test_bad_row_does_not_abort_batch() {
        // 3 rows, row 2 has an empty subscriber_no.
        let rows = parse(
            "subscriber_no,month,year\n\
             5551111111,1,2025\n\
             ,2,2025\n\
             5553333333,3,2025\n",
        );
        assert_eq!(rows.len(), 3);
        assert!(rows[0].job.is_ok());
        assert_eq!(
            rows[1].job.as_ref().unwrap_err(),
            "subscriber_no is required"
        );
        assert!(rows[2].job.is_ok());
        // Input order preserved.
        assert_eq!(rows.iter().map(|r| r.line).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_month_rejected() {
        let rows = parse("subscriber_no,month,year\n5551234567\n");
        assert_eq!(rows[0].job.as_ref().unwrap_err(), "month is required");
    }

    #[test]
    fn test_malformed_fields_rejected() {
        let rows = parse(
            "subscriber_no,month,year\n\
             5551234567,abc,2025\n\
             5551234567,4,20x5\n\
             5551234567,13,2025\n",
        );
        assert!(rows[0].job.as_ref().unwrap_err().starts_with("month must be an integer"));
        assert!(rows[1].job.as_ref().unwrap_err().starts_with("year must be an integer"));
        assert_eq!(
            rows[2].job.as_ref().unwrap_err(),
            "month must be between 1 and 12, got 13"
        );
    }

    #[test]
    fn test_rows_echo_their_input_fields() {
        let rows = parse(
            "subscriber_no,month,year\n\
             5551111111,4,2024\n\
             5552222222,6\n\
             ,2,2025\n",
        );
        assert_eq!(
            rows[0].echo,
            RowEcho {
                subscriber_no: Some("5551111111".to_string()),
                month: Some(4),
                year: 2024,
            }
        );
        // A missing year echoes the batch default.
        assert_eq!(rows[1].echo.year, 2025);
        // A rejected row still echoes what it did name.
        assert_eq!(rows[2].echo.subscriber_no, None);
        assert_eq!(rows[2].echo.year, 2025);
    }

    #[test]
    fn test_row_report_serialization() {
        let report = RowReport {
            line: 2,
            echo: RowEcho {
                subscriber_no: Some("5551234567".to_string()),
                month: Some(13),
                year: 2025,
            },
            outcome: RowOutcome::Failed {
                message: "month must be between 1 and 12, got 13".to_string(),
            },
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "Error");
        assert_eq!(value["line"], 2);
        assert_eq!(value["subscriber_no"], "5551234567");
        assert_eq!(value["month"], 13);
        assert_eq!(value["year"], 2025);
        assert_eq!(value["message"], "month must be between 1 and 12, got 13");
    }
}
