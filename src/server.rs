use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tokio::signal;
use tracing::{debug, info};

use crate::aggregate::{aggregate, AggregateResponse};
use crate::cache::Cache;
use crate::error::{AggregateError, AppError};
use crate::event::CalendarEvent;
use crate::grid::{build_month, events_in_month, CalendarMonthView, WeekStart};
use crate::ics::{ics_filename, to_ics};
use crate::query::{CalendarQuery, RawCalendarQuery, YearMonth};
use crate::store::EventStore;

pub const CALENDAR_PATH: &str = "/calendar";
pub const MONTH_PATH: &str = "/calendar/month";
pub const ICS_PATH: &str = "/calendar/ics";

pub type EventCache = Cache<CalendarQuery, Vec<CalendarEvent>>;

pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub cache: Arc<EventCache>,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>, cache: Arc<EventCache>) -> Arc<Self> {
        Arc::new(Self { store, cache })
    }

    async fn events(&self, query: CalendarQuery) -> Result<Arc<Vec<CalendarEvent>>, AggregateError> {
        if let Some(events) = self.cache.get(&query).await {
            debug!("Serving cached calendar for {query:?}");
            return Ok(events);
        }

        let events = aggregate(self.store.as_ref(), &query).await?;
        Ok(self.cache.insert(query, events).await)
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(CALENDAR_PATH, get(handle_calendar))
        .route(MONTH_PATH, get(handle_month))
        .route(ICS_PATH, get(handle_ics))
        .fallback(|| async { (StatusCode::NOT_FOUND, "Not found") })
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct MonthQuery {
    month: Option<String>,
    week_start: Option<String>,
    school_year: Option<String>,
    semester: Option<String>,
    event_type: Option<String>,
}

impl MonthQuery {
    fn month(&self) -> Result<YearMonth, AppError> {
        match self.month.as_deref().filter(|month| !month.is_empty()) {
            Some(month) => Ok(month.parse()?),
            None => Ok(YearMonth::current()),
        }
    }

    fn week_start(&self) -> Result<WeekStart, AppError> {
        match self.week_start.as_deref().filter(|day| !day.is_empty()) {
            Some(day) => Ok(day.parse()?),
            None => Ok(WeekStart::default()),
        }
    }

    fn calendar_query(&self) -> Result<CalendarQuery, AppError> {
        let raw = RawCalendarQuery {
            school_year: self.school_year.clone(),
            semester: self.semester.clone(),
            event_type: self.event_type.clone(),
        };
        Ok(CalendarQuery::from_raw(raw, Utc::now().date_naive())?)
    }
}

async fn handle_calendar(
    State(state): State<Arc<AppState>>,
    Query(raw): Query<RawCalendarQuery>,
) -> Result<Json<AggregateResponse>, AppError> {
    let query = CalendarQuery::from_raw(raw, Utc::now().date_naive())?;
    debug!("Calendar requested for {query:?}");

    let school_year = query.school_year;
    let events = state.events(query).await?;

    Ok(Json(AggregateResponse::new(school_year, (*events).clone())))
}

async fn handle_month(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<CalendarMonthView>, AppError> {
    let month = params.month()?;
    let week_start = params.week_start()?;
    let query = params.calendar_query()?;
    debug!("Month {month} requested for {query:?}");

    let events = state.events(query).await?;
    Ok(Json(build_month(month.first_day(), &events, week_start)))
}

async fn handle_ics(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MonthQuery>,
) -> Result<Response, AppError> {
    let month = params.month()?;
    let query = params.calendar_query()?;
    debug!("ICS export of {month} requested for {query:?}");

    let events = state.events(query).await?;
    let body = to_ics(&events_in_month(&events, month));

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", ics_filename(month)),
            ),
        ],
        body,
    )
        .into_response())
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
