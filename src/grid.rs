use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::event::CalendarEvent;
use crate::query::YearMonth;

/// First day of a rendered week. The dashboard widget starts weeks on
/// Monday, the full calendar page on Sunday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Monday,
    #[default]
    Sunday,
}

impl WeekStart {
    pub fn first_weekday(self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }

    /// Column of `date` in a week, 0 through 6.
    fn column(self, date: NaiveDate) -> u64 {
        let weekday = date.weekday();
        u64::from(match self {
            WeekStart::Monday => weekday.num_days_from_monday(),
            WeekStart::Sunday => weekday.num_days_from_sunday(),
        })
    }

    /// Weekdays in column order.
    pub fn weekdays(self) -> [Weekday; 7] {
        let mut days = [self.first_weekday(); 7];
        for idx in 1..7 {
            days[idx] = days[idx - 1].succ();
        }
        days
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WeekStart::Monday => "monday",
            WeekStart::Sunday => "sunday",
        })
    }
}

impl FromStr for WeekStart {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monday" | "mon" => Ok(WeekStart::Monday),
            "sunday" | "sun" => Ok(WeekStart::Sunday),
            _ => Err(ParseError::WeekStart(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_current_month: bool,
    pub events: Vec<CalendarEvent>,
}

impl DayCell {
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn is_today(&self, today: NaiveDate) -> bool {
        self.date == today
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarMonthView {
    pub reference_month: YearMonth,
    pub week_starts_on: WeekStart,
    pub cells: Vec<DayCell>,
}

impl CalendarMonthView {
    /// Rows of seven cells.
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(7)
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&DayCell> {
        self.cells.iter().find(|cell| cell.date == date)
    }
}

/// Lays out the month containing `reference_date`, padded with days of the
/// neighbouring months to whole weeks. Each cell carries the events whose
/// inclusive range covers its date.
pub fn build_month(
    reference_date: NaiveDate,
    events: &[CalendarEvent],
    week_start: WeekStart,
) -> CalendarMonthView {
    let month = YearMonth::of(reference_date);
    let month_start = month.first_day();
    let month_end = month.last_day();

    let first = month_start - Days::new(week_start.column(month_start));
    let last = month_end + Days::new(6 - week_start.column(month_end));

    let cells = first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| DayCell {
            date,
            in_current_month: month_start <= date && date <= month_end,
            events: events
                .iter()
                .filter(|event| event.covers(date))
                .cloned()
                .collect(),
        })
        .collect();

    CalendarMonthView {
        reference_month: month,
        week_starts_on: week_start,
        cells,
    }
}

/// Events with at least one day inside `month`, in their original order.
pub fn events_in_month(events: &[CalendarEvent], month: YearMonth) -> Vec<CalendarEvent> {
    events
        .iter()
        .filter(|event| event.overlaps(month.first_day(), month.last_day()))
        .cloned()
        .collect()
}
