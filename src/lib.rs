//! Academic calendar service for the QCU student portal.
//!
//! University events and recurring holidays are merged by [`aggregate`],
//! laid out as month grids by [`build_month`] and exported as iCalendar
//! documents by [`to_ics`]. The [`server`] module puts the three behind an
//! axum router.

pub mod aggregate;
pub mod cache;
pub mod cli;
pub mod error;
pub mod event;
pub mod grid;
pub mod ics;
pub mod navigation;
pub mod query;
pub mod server;
pub mod store;

pub use aggregate::{aggregate, AggregateResponse};
pub use error::{AggregateError, AppError, EventError, ParseError, StoreError};
pub use event::{CalendarEvent, EventSource, Holiday};
pub use grid::{build_month, events_in_month, CalendarMonthView, DayCell, WeekStart};
pub use self::ics::{ics_filename, to_ics};
pub use navigation::{MonthBounds, MonthCursor, Semester};
pub use query::{CalendarQuery, SchoolYear, YearMonth};
pub use store::{EventStore, MemoryStore, PgStore};
