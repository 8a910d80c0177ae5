use serde::Serialize;
use tracing::debug;

use crate::error::AggregateError;
use crate::event::CalendarEvent;
use crate::query::{CalendarQuery, SchoolYear};
use crate::store::EventStore;

/// Outbound shape of the aggregated calendar.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResponse {
    pub school_year: SchoolYear,
    pub total_events: usize,
    pub events: Vec<CalendarEvent>,
}

impl AggregateResponse {
    pub fn new(school_year: SchoolYear, events: Vec<CalendarEvent>) -> Self {
        Self {
            school_year,
            total_events: events.len(),
            events,
        }
    }
}

/// Merges university events and holidays into one list ordered by start date.
///
/// Holidays are pinned to the first calendar year of the school year, so a
/// January 1st holiday in `2025-2026` lands on 2025-01-01. Both reads run
/// concurrently and either failing fails the whole call.
pub async fn aggregate<S>(store: &S, query: &CalendarQuery) -> Result<Vec<CalendarEvent>, AggregateError>
where
    S: EventStore + ?Sized,
{
    let (university, holidays) = tokio::try_join!(store.university_events(query), store.holidays())?;

    let base_year = query.school_year.start_year();
    let mut events = university;
    events.reserve(holidays.len());

    for holiday in &holidays {
        events.push(holiday.materialize(base_year)?);
    }

    // Stable, so university events stay ahead of holidays on the same day.
    events.sort_by_key(|event| event.start_date);

    debug!(
        "Aggregated {} events ({} holidays) for {}",
        events.len(),
        holidays.len(),
        query.school_year
    );

    Ok(events)
}
