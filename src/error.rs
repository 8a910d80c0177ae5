use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("Event '{title}' ends ({end}) before it starts ({start})")]
    InvertedRange {
        title: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Holiday '{title}' has no date {month:02}-{day:02} in {year}")]
    NonexistentHolidayDate {
        title: String,
        year: i32,
        month: u32,
        day: u32,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid school year '{0}', expected YYYY-YYYY with consecutive years")]
    SchoolYear(String),

    #[error("Invalid month '{0}', expected YYYY-MM")]
    Month(String),

    #[error("Invalid week start '{0}', expected 'monday' or 'sunday'")]
    WeekStart(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid stored event: {0}")]
    InvalidRow(#[from] EventError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Event(#[from] EventError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    BadRequest(#[from] ParseError),

    #[error(transparent)]
    Internal(#[from] AggregateError),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Internal(err) => {
                error!("Calendar request failed: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}
