use chrono::NaiveDate;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid date `{value}` for `{param}` (expected YYYY-MM-DD or RFC 3339)")]
    InvalidDate { param: &'static str, value: String },
    #[error("`from` ({from}) is after `to` ({to})")]
    WindowReversed { from: NaiveDate, to: NaiveDate },
    #[error("invalid value `{value}` for `{param}` (expected {expected})")]
    InvalidParameter { param: &'static str, value: String, expected: &'static str },
}
