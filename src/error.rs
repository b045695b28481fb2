use chrono::NaiveDate;

/// Top-level error carried to the binary's exit code.
///
/// Exit codes:
/// - `2` invalid input or configuration
/// - `3` no usable data (empty series, alignment failures, malformed series)
/// - `4` runtime failures (network, filesystem, unexpected responses)
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// A series violated the ascending, unique-date invariant at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    OutOfOrder {
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },
    DuplicateDate {
        date: NaiveDate,
    },
}

impl std::fmt::Display for SeriesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesError::OutOfOrder {
                index,
                previous,
                date,
            } => write!(f, "Sample {index} ({date}) is earlier than the preceding sample ({previous})."),
            SeriesError::DuplicateDate { date } => write!(f, "Duplicate sample date {date}."),
        }
    }
}

impl std::error::Error for SeriesError {}

/// Input series cannot be brought onto a common date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignmentError {
    /// The series at `position` (in the order supplied) has no samples.
    EmptySeries { position: usize },
    /// The latest first date is after the earliest last date.
    NoOverlap { start: NaiveDate, end: NaiveDate },
    /// Two series that must share dates sample-for-sample diverge at `index`.
    DateMismatch {
        index: usize,
        left: Option<NaiveDate>,
        right: Option<NaiveDate>,
    },
}

impl std::fmt::Display for AlignmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignmentError::EmptySeries { position } => {
                write!(f, "Input series #{position} is empty; nothing to align.")
            }
            AlignmentError::NoOverlap { start, end } => write!(
                f,
                "Input series do not overlap (latest start {start} is after earliest end {end})."
            ),
            AlignmentError::DateMismatch { index, left, right } => write!(
                f,
                "Series dates diverge at sample {index}: {} vs {}.",
                fmt_opt_date(*left),
                fmt_opt_date(*right)
            ),
        }
    }
}

impl std::error::Error for AlignmentError {}

fn fmt_opt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "<end>".to_string())
}

impl From<SeriesError> for AppError {
    fn from(err: SeriesError) -> Self {
        AppError::new(3, format!("Invalid series: {err}"))
    }
}

impl From<AlignmentError> for AppError {
    fn from(err: AlignmentError) -> Self {
        AppError::new(3, format!("Alignment failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_errors_map_to_no_data_exit_code() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        let err: AppError = AlignmentError::NoOverlap { start, end }.into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().contains("2020-01-01"));
    }
}
