use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{
    postgres::{PgPool, PgPoolOptions},
    FromRow, Postgres, QueryBuilder,
};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::event::{CalendarEvent, EventSource, Holiday};
use crate::query::{CalendarQuery, SchoolYear};

/// Read-only source of university events and recurring holidays.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// University events of `query.school_year`, narrowed by the optional
    /// semester and event type (exact matches, combined with AND).
    async fn university_events(&self, query: &CalendarQuery)
        -> Result<Vec<CalendarEvent>, StoreError>;

    async fn holidays(&self) -> Result<Vec<Holiday>, StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct UniversityRow {
    id: i32,
    title: String,
    semester: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    event_type: String,
}

#[derive(FromRow)]
struct HolidayRow {
    id: i32,
    title: String,
    month: i32,
    day: i32,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        info!("Connecting to PostgreSQL");
        let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
        Ok(Self::new(pool))
    }
}

/// Binds the school year first, then the optional semester and event type.
fn university_query(query: &CalendarQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        "SELECT id, title, semester, start_date, end_date, event_type \
         FROM university_calendar WHERE school_year = ",
    );
    builder.push_bind(query.school_year.to_string());

    if let Some(semester) = &query.semester {
        builder.push(" AND semester = ").push_bind(semester.clone());
    }

    if let Some(event_type) = &query.event_type {
        builder.push(" AND event_type = ").push_bind(event_type.clone());
    }

    builder.push(" ORDER BY start_date, id");
    builder
}

#[async_trait]
impl EventStore for PgStore {
    async fn university_events(
        &self,
        query: &CalendarQuery,
    ) -> Result<Vec<CalendarEvent>, StoreError> {
        let mut builder = university_query(query);
        let rows: Vec<UniversityRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        debug!("Fetched {} university events for {}", rows.len(), query.school_year);

        rows.into_iter()
            .map(|row| -> Result<CalendarEvent, StoreError> {
                let event = CalendarEvent::new(
                    row.id.into(),
                    row.title,
                    row.start_date,
                    row.end_date,
                    row.event_type,
                    EventSource::University,
                )?;

                Ok(match row.semester {
                    Some(semester) => event.with_semester(semester),
                    None => event,
                })
            })
            .collect()
    }

    async fn holidays(&self) -> Result<Vec<Holiday>, StoreError> {
        const SQL: &str = "SELECT id, title, month, day FROM holiday_calendar ORDER BY month, day, id";

        let rows: Vec<HolidayRow> = sqlx::query_as(SQL).fetch_all(&self.pool).await?;
        debug!("Fetched {} holidays", rows.len());

        // Out of range values become month/day 0, which never materializes.
        Ok(rows
            .into_iter()
            .map(|row| {
                Holiday::new(
                    row.id.into(),
                    row.title,
                    u32::try_from(row.month).unwrap_or(0),
                    u32::try_from(row.day).unwrap_or(0),
                )
            })
            .collect())
    }
}

/// In-memory store, used when no database is configured and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    university: Vec<(SchoolYear, CalendarEvent)>,
    holidays: Vec<Holiday>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every read fails.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_event(mut self, school_year: SchoolYear, event: CalendarEvent) -> Self {
        self.university.push((school_year, event));
        self
    }

    #[must_use]
    pub fn with_holiday(mut self, holiday: Holiday) -> Self {
        self.holidays.push(holiday);
        self
    }

    /// The portal's 2025-2026 second semester events and national holidays.
    pub fn portal_fixture() -> Self {
        let school_year = SchoolYear::new(2025);
        let date = |m, d| NaiveDate::from_ymd_opt(2026, m, d).unwrap_or(NaiveDate::MIN);

        let university = [
            (1, "Enrollment Period", date(1, 5), date(1, 9), "academic"),
            (2, "Start of Classes", date(1, 12), date(1, 12), "academic"),
            (3, "Midterm Examinations", date(3, 9), date(3, 14), "exam"),
            (4, "Final Examinations", date(5, 18), date(5, 23), "exam"),
            (5, "End of Semester", date(5, 26), date(5, 26), "academic"),
        ];

        let store = university
            .into_iter()
            .filter_map(|(id, title, start, end, kind)| {
                CalendarEvent::new(id, title, start, end, kind, EventSource::University)
                    .ok()
                    .map(|event| event.with_semester("2nd"))
            })
            .fold(Self::new(), |store, event| store.with_event(school_year, event));

        [
            (1, "New Year", 1, 1),
            (2, "Araw ng Kagitingan", 4, 9),
            (3, "Labor Day", 5, 1),
            (4, "Independence Day", 6, 12),
            (5, "Bonifacio Day", 11, 30),
            (6, "Christmas Day", 12, 25),
            (7, "Rizal Day", 12, 30),
        ]
        .into_iter()
        .fold(store, |store, (id, title, month, day)| {
            store.with_holiday(Holiday::new(id, title, month, day))
        })
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("memory store marked unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn university_events(
        &self,
        query: &CalendarQuery,
    ) -> Result<Vec<CalendarEvent>, StoreError> {
        self.check_available()?;

        Ok(self
            .university
            .iter()
            .filter(|(school_year, _)| *school_year == query.school_year)
            .map(|(_, event)| event)
            .filter(|event| {
                query
                    .semester
                    .as_ref()
                    .map_or(true, |semester| event.semester.as_ref() == Some(semester))
            })
            .filter(|event| {
                query
                    .event_type
                    .as_ref()
                    .map_or(true, |event_type| &event.event_type == event_type)
            })
            .cloned()
            .collect())
    }

    async fn holidays(&self) -> Result<Vec<Holiday>, StoreError> {
        self.check_available()?;
        Ok(self.holidays.clone())
    }
}
