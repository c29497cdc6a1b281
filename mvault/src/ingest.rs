//! Replay of tab-delimited membership exports into the Vault.
//!
//! Export columns, after one header row:
//! `first_name, last_name, offer, membership_id, start_date, expire_date, email`.
//! Dates are `MM/DD/YYYY` and are read as local midnight in one time zone.
//! Fields may be double-quoted, so a quoted field can hold a tab.
//! Every replayed member is forced to status `On`.

use crate::{
    error::{MemberError, VaultError},
    member::{Member, STATUS_ON},
    provider::MembershipProvider,
    response::VaultOutcome,
};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use csv::{ByteRecord, ReaderBuilder};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::Utf8Error;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info, instrument, warn};

/// Zone export dates are localized to unless configured otherwise.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::US::Pacific;

const DATE_FORMAT: &str = "%m/%d/%Y";
const COLUMNS: [&str; 7] = [
    "first_name",
    "last_name",
    "offer",
    "membership_id",
    "start_date",
    "expire_date",
    "email",
];

/// What to do when a row cannot be parsed or its upsert fails in transit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failing row; later rows are not sent
    #[default]
    Abort,
    /// Record the failure and carry on with the next row
    Continue,
}

/// Ingest options.
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// Zone export dates are localized to
    pub timezone: Tz,
    /// Partial-failure policy
    pub policy: FailurePolicy,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE,
            policy: FailurePolicy::Abort,
        }
    }
}

impl IngestOptions {
    /// Set the time zone.
    #[must_use]
    pub const fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Set the failure policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Why a single row could not be replayed.
#[derive(Error, Debug)]
pub enum RowError {
    /// Fewer columns than the export format defines
    #[error("Expected {expected} columns, found {found}")]
    MissingColumns {
        /// Column count of the export format
        expected: usize,
        /// Columns present in the row
        found: usize,
    },

    /// A date column is not `MM/DD/YYYY`
    #[error("Invalid {field} {value:?}, expected MM/DD/YYYY")]
    InvalidDate {
        /// Column name
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// Local midnight does not exist on that date in the zone
    #[error("Midnight on {date} does not exist in {timezone}")]
    NonexistentLocalTime {
        /// Date that was read
        date: NaiveDate,
        /// Zone it was localized to
        timezone: Tz,
    },

    /// A field is not UTF-8 text
    #[error("Column {column} is not valid UTF-8: {source}")]
    InvalidUtf8 {
        /// 1-based column number
        column: usize,
        /// Decoding error
        source: Utf8Error,
    },

    /// Member could not be built from the row
    #[error(transparent)]
    Member(#[from] MemberError),

    /// Upsert failed before the Vault answered
    #[error(transparent)]
    Vault(#[from] VaultError),
}

/// Ingest errors.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Input file could not be opened
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        /// Input path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Input could not be read
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// Input is not a readable tab-delimited export
    #[error("Failed to parse input: {0}")]
    Csv(#[from] csv::Error),

    /// Input is empty
    #[error("Input has no header row")]
    MissingHeader,

    /// A row failed under [`FailurePolicy::Abort`]
    #[error("Line {line}: {source}")]
    Row {
        /// 1-based line number, the header being line 1
        line: usize,
        /// Row failure
        source: RowError,
    },
}

/// What happened to one data row.
#[derive(Debug)]
pub enum RowStatus {
    /// The Vault accepted the upsert
    Upserted,
    /// The Vault answered with an error
    Rejected {
        /// HTTP status
        status: StatusCode,
        /// Vault error message
        message: String,
    },
    /// The row was not parsed or the request never got an answer
    Failed(RowError),
}

/// Outcome of one data row.
#[derive(Debug)]
pub struct RowOutcome {
    /// 1-based line number
    pub line: usize,
    /// Membership ID, when the row got far enough to have one
    pub membership_id: Option<String>,
    /// Result
    pub status: RowStatus,
}

/// Per-row outcomes of an ingest run, in file order.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Row outcomes
    pub rows: Vec<RowOutcome>,
}

impl IngestReport {
    /// Rows the Vault accepted.
    #[must_use]
    pub fn upserted(&self) -> usize {
        self.count(|s| matches!(s, RowStatus::Upserted))
    }

    /// Rows the Vault rejected.
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.count(|s| matches!(s, RowStatus::Rejected { .. }))
    }

    /// Rows that failed locally or in transit.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, RowStatus::Failed(_)))
    }

    /// Check if every row was accepted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.upserted() == self.rows.len()
    }

    fn count(&self, pred: impl Fn(&RowStatus) -> bool) -> usize {
        self.rows.iter().filter(|row| pred(&row.status)).count()
    }
}

/// Build a member from one export row.
///
/// Extra trailing columns are ignored.
///
/// # Errors
///
/// Returns an error if the row is short or a date does not parse.
pub fn parse_row(fields: &[&str], timezone: Tz) -> Result<Member, RowError> {
    if fields.len() < COLUMNS.len() {
        return Err(RowError::MissingColumns {
            expected: COLUMNS.len(),
            found: fields.len(),
        });
    }

    let mut source = Map::new();
    for (&name, &value) in COLUMNS.iter().zip(fields) {
        let value = match name {
            "start_date" | "expire_date" => localize(name, value, timezone)?.to_rfc3339(),
            _ => value.to_string(),
        };
        source.insert(name.to_string(), Value::String(value));
    }
    source.insert("status".to_string(), Value::String(STATUS_ON.to_string()));

    Ok(Member::from_mapping(&source)?)
}

fn localize(
    field: &'static str,
    value: &str,
    timezone: Tz,
) -> Result<DateTime<FixedOffset>, RowError> {
    let invalid = || RowError::InvalidDate {
        field,
        value: value.to_string(),
    };
    if !has_date_shape(value) {
        return Err(invalid());
    }
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())?;

    timezone
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .map(|local| local.fixed_offset())
        .ok_or(RowError::NonexistentLocalTime { date, timezone })
}

/// Check for `M/D/YYYY` digits: one or two for month and day, four for the year.
fn has_date_shape(value: &str) -> bool {
    fn digits(part: Option<&str>, len: RangeInclusive<usize>) -> bool {
        part.is_some_and(|p| len.contains(&p.len()) && p.bytes().all(|b| b.is_ascii_digit()))
    }

    let mut parts = value.split('/');
    digits(parts.next(), 1..=2)
        && digits(parts.next(), 1..=2)
        && digits(parts.next(), 4..=4)
        && parts.next().is_none()
}

/// Replay an export file.
///
/// # Errors
///
/// See [`ingest_reader`].
pub async fn ingest_file<P>(
    provider: &P,
    path: &Path,
    options: &IngestOptions,
) -> Result<IngestReport, IngestError>
where
    P: MembershipProvider + ?Sized,
{
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|source| IngestError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    ingest_reader(provider, file, options).await
}

/// Replay export rows read from `reader`, one upsert at a time in order.
///
/// Blank lines are skipped. Vault rejections are recorded and never stop the
/// run; other row failures, undecodable rows included, follow `options.policy`.
///
/// # Errors
///
/// Returns an error if the input cannot be read, has no header, or a row
/// fails under [`FailurePolicy::Abort`].
#[instrument(skip_all, fields(timezone = %options.timezone, policy = ?options.policy))]
pub async fn ingest_reader<P, R>(
    provider: &P,
    mut reader: R,
    options: &IngestOptions,
) -> Result<IngestReport, IngestError>
where
    P: MembershipProvider + ?Sized,
    R: AsyncRead + Unpin,
{
    let mut input = Vec::new();
    reader.read_to_end(&mut input).await?;

    let mut rows = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(input.as_slice());
    if rows.byte_headers()?.is_empty() {
        return Err(IngestError::MissingHeader);
    }

    let mut report = IngestReport::default();
    let mut record = ByteRecord::new();

    while rows.read_byte_record(&mut record)? {
        let line_no = record
            .position()
            .and_then(|pos| usize::try_from(pos.line()).ok())
            .unwrap_or_default();

        let member = match decode_record(&record)
            .and_then(|fields| parse_row(&fields, options.timezone))
        {
            Ok(member) => member,
            Err(error) => {
                record_failure(&mut report, options.policy, line_no, None, error)?;
                continue;
            }
        };

        match provider.upsert_member(&member).await {
            Ok(VaultOutcome::Success(())) => {
                debug!(line = line_no, membership_id = %member.membership_id, "Upserted");
                report.rows.push(RowOutcome {
                    line: line_no,
                    membership_id: Some(member.membership_id),
                    status: RowStatus::Upserted,
                });
            }
            Ok(VaultOutcome::Failure { status, message }) => {
                warn!(line = line_no, membership_id = %member.membership_id, %status, error = %message, "Vault rejected member");
                report.rows.push(RowOutcome {
                    line: line_no,
                    membership_id: Some(member.membership_id),
                    status: RowStatus::Rejected { status, message },
                });
            }
            Err(error) => {
                record_failure(
                    &mut report,
                    options.policy,
                    line_no,
                    Some(member.membership_id),
                    error.into(),
                )?;
            }
        }
    }

    info!(
        rows = report.rows.len(),
        upserted = report.upserted(),
        rejected = report.rejected(),
        failed = report.failed(),
        "Ingest finished"
    );
    Ok(report)
}

fn decode_record(record: &ByteRecord) -> Result<Vec<&str>, RowError> {
    record
        .iter()
        .enumerate()
        .map(|(i, field)| {
            std::str::from_utf8(field).map_err(|source| RowError::InvalidUtf8 {
                column: i + 1,
                source,
            })
        })
        .collect()
}

fn record_failure(
    report: &mut IngestReport,
    policy: FailurePolicy,
    line: usize,
    membership_id: Option<String>,
    error: RowError,
) -> Result<(), IngestError> {
    match policy {
        FailurePolicy::Abort => Err(IngestError::Row {
            line,
            source: error,
        }),
        FailurePolicy::Continue => {
            warn!(line, error = %error, "Skipping row");
            report.rows.push(RowOutcome {
                line,
                membership_id,
                status: RowStatus::Failed(error),
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const ROW: [&str; 7] = [
        "Mary",
        "Member",
        "123",
        "000001",
        "01/01/2024",
        "12/31/2024",
        "m@x.org",
    ];

    #[test]
    fn test_parse_row() {
        let member = parse_row(&ROW, DEFAULT_TIMEZONE).unwrap();

        assert_eq!(member.first_name, "Mary");
        assert_eq!(member.last_name, "Member");
        assert_eq!(member.offer, "123");
        assert_eq!(member.membership_id, "000001");
        assert_eq!(member.email, "m@x.org");
        assert_eq!(member.status, STATUS_ON);
        assert_eq!(member.notes, "");

        let start = member.start_date.unwrap();
        assert_eq!((start.year(), start.month(), start.day()), (2024, 1, 1));
        assert_eq!(start.hour(), 0);
        assert_eq!(start.offset().local_minus_utc(), -8 * 3600);

        let expire = member.expire_date.unwrap();
        assert_eq!((expire.year(), expire.month(), expire.day()), (2024, 12, 31));
    }

    #[test]
    fn test_parse_row_summer_offset() {
        let mut row = ROW;
        row[4] = "07/04/2024";
        let member = parse_row(&row, DEFAULT_TIMEZONE).unwrap();
        assert_eq!(
            member.start_date.unwrap().offset().local_minus_utc(),
            -7 * 3600
        );
    }

    #[test]
    fn test_parse_row_other_timezone() {
        let member = parse_row(&ROW, chrono_tz::America::New_York).unwrap();
        assert_eq!(
            member.start_date.unwrap().offset().local_minus_utc(),
            -5 * 3600
        );
    }

    #[test]
    fn test_parse_row_ignores_extra_columns() {
        let mut row = ROW.to_vec();
        row.push("unused");
        assert!(parse_row(&row, DEFAULT_TIMEZONE).is_ok());
    }

    #[test]
    fn test_parse_row_short() {
        let err = parse_row(&ROW[..6], DEFAULT_TIMEZONE).unwrap_err();
        assert!(matches!(
            err,
            RowError::MissingColumns {
                expected: 7,
                found: 6
            }
        ));
    }

    #[test]
    fn test_parse_row_bad_date() {
        let mut row = ROW;
        row[5] = "2024-12-31";
        let err = parse_row(&row, DEFAULT_TIMEZONE).unwrap_err();
        assert!(matches!(
            err,
            RowError::InvalidDate {
                field: "expire_date",
                ..
            }
        ));

        row[5] = "13/01/2024";
        assert!(parse_row(&row, DEFAULT_TIMEZONE).is_err());
    }

    #[test]
    fn test_parse_row_two_digit_year() {
        let row = ["A", "B", "1", "9", "01/01/24", "12/31/24", ""];
        let err = parse_row(&row, DEFAULT_TIMEZONE).unwrap_err();
        assert!(matches!(
            err,
            RowError::InvalidDate {
                field: "start_date",
                ref value,
            } if value == "01/01/24"
        ));
    }

    #[test]
    fn test_date_shape() {
        assert!(has_date_shape("01/01/2024"));
        assert!(has_date_shape("1/1/2024"));
        assert!(!has_date_shape("01/01/24"));
        assert!(!has_date_shape("01/01/02024"));
        assert!(!has_date_shape("001/01/2024"));
        assert!(!has_date_shape("01/01/+024"));
        assert!(!has_date_shape(" 1/01/2024"));
        assert!(!has_date_shape("01/01/2024/"));
        assert!(!has_date_shape("01-01-2024"));
    }

    #[test]
    fn test_decode_record_names_bad_column() {
        let record = ByteRecord::from(vec![&b"Jos\xe9"[..], &b"Member"[..]]);
        assert!(matches!(
            decode_record(&record),
            Err(RowError::InvalidUtf8 { column: 1, .. })
        ));

        let record = ByteRecord::from(vec!["Mary", "Member"]);
        assert_eq!(decode_record(&record).unwrap(), ["Mary", "Member"]);
    }

    #[test]
    fn test_report_counts() {
        let report = IngestReport {
            rows: vec![
                RowOutcome {
                    line: 2,
                    membership_id: Some("1".to_string()),
                    status: RowStatus::Upserted,
                },
                RowOutcome {
                    line: 3,
                    membership_id: Some("2".to_string()),
                    status: RowStatus::Rejected {
                        status: StatusCode::BAD_REQUEST,
                        message: "Invalid offer".to_string(),
                    },
                },
                RowOutcome {
                    line: 4,
                    membership_id: None,
                    status: RowStatus::Failed(RowError::MissingColumns {
                        expected: 7,
                        found: 1,
                    }),
                },
            ],
        };

        assert_eq!(report.upserted(), 1);
        assert_eq!(report.rejected(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_clean());
        assert!(IngestReport::default().is_clean());
    }

    #[test]
    fn test_default_options() {
        let options = IngestOptions::default();
        assert_eq!(options.timezone, chrono_tz::US::Pacific);
        assert_eq!(options.policy, FailurePolicy::Abort);

        let options = options
            .with_timezone(chrono_tz::UTC)
            .with_policy(FailurePolicy::Continue);
        assert_eq!(options.timezone, chrono_tz::UTC);
        assert_eq!(options.policy, FailurePolicy::Continue);
    }
}
