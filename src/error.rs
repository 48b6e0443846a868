use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("time of day must be HH:MM, got {0:?}")]
    MalformedTime(String),

    #[error("end must be after start ({start} - {end})")]
    EndNotAfterStart { start: String, end: String },

    #[error("{field} must be numeric, got {value}")]
    NonNumeric { field: &'static str, value: String },

    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    #[error("expense description must not be empty")]
    EmptyDescription,

    #[error("assignment is marked both approved and rejected")]
    ConflictingApprovalFlags,

    #[error("local time {0} does not exist in time zone {1}")]
    NonexistentLocalTime(String, String),

    #[error("unknown time zone {0:?}")]
    UnknownTimeZone(String),

    #[error("invalid calendar date {0:?}")]
    MalformedDate(String),

    #[error("{field} is not a timestamp, got {value}")]
    MalformedTimestamp { field: &'static str, value: String },

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} is too large to compute")]
    AmountOutOfRange { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApprovalError {
    #[error("hours were already approved at {0}")]
    AlreadyApproved(DateTime<Utc>),

    #[error("hours were rejected at {0}")]
    AlreadyRejected(DateTime<Utc>),

    #[error("hours are still pending, approve them before editing")]
    NotApproved,

    #[error("no assignment for employee {0}")]
    UnknownEmployee(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("event {event_id}: {source}")]
    Event {
        event_id: String,
        #[source]
        source: ValidationError,
    },

    #[error("event {event_id}, employee {employee_id}: {source}")]
    Assignment {
        event_id: String,
        employee_id: String,
        #[source]
        source: ValidationError,
    },

    #[error("totals: {0}")]
    Totals(#[source] ValidationError),

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
