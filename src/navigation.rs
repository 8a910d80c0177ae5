use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::query::YearMonth;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Semester {
    pub fn new(label: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            label: label.into(),
            start,
            end,
        }
    }

    pub fn bounds(&self) -> MonthBounds {
        MonthBounds::new(YearMonth::of(self.start), YearMonth::of(self.end))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Month shown first: today's month during the semester, the semester's
    /// first month otherwise.
    pub fn initial_month(&self, today: NaiveDate) -> YearMonth {
        if self.contains(today) {
            YearMonth::of(today)
        } else {
            YearMonth::of(self.start)
        }
    }
}

/// Inclusive range of months a calendar may show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthBounds {
    pub first: YearMonth,
    pub last: YearMonth,
}

impl MonthBounds {
    /// Swaps the ends if they are given in reverse.
    pub fn new(first: YearMonth, last: YearMonth) -> Self {
        if last < first {
            Self {
                first: last,
                last: first,
            }
        } else {
            Self { first, last }
        }
    }

    pub fn contains(&self, month: YearMonth) -> bool {
        self.first <= month && month <= self.last
    }

    pub fn clamp(&self, month: YearMonth) -> YearMonth {
        month.clamp(self.first, self.last)
    }
}

/// Currently displayed month, kept within its bounds. Moves that would leave
/// the bounds leave the cursor where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    current: YearMonth,
    bounds: MonthBounds,
}

impl MonthCursor {
    pub fn new(start: YearMonth, bounds: MonthBounds) -> Self {
        Self {
            current: bounds.clamp(start),
            bounds,
        }
    }

    pub fn for_semester(semester: &Semester, today: NaiveDate) -> Self {
        Self::new(semester.initial_month(today), semester.bounds())
    }

    pub fn current(&self) -> YearMonth {
        self.current
    }

    pub fn bounds(&self) -> MonthBounds {
        self.bounds
    }

    pub fn can_go_previous(&self) -> bool {
        self.bounds.contains(self.current.pred())
    }

    pub fn can_go_next(&self) -> bool {
        self.bounds.contains(self.current.succ())
    }

    /// Returns whether the cursor moved.
    pub fn previous(&mut self) -> bool {
        self.step(self.current.pred())
    }

    /// Returns whether the cursor moved.
    pub fn next(&mut self) -> bool {
        self.step(self.current.succ())
    }

    fn step(&mut self, target: YearMonth) -> bool {
        if !self.bounds.contains(target) {
            return false;
        }
        self.current = target;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    fn second_semester() -> Semester {
        Semester::new("2nd Semester", date(2026, 1, 12), date(2026, 5, 26))
    }

    #[test]
    fn initial_month_depends_on_today() {
        let semester = second_semester();

        assert_eq!(semester.initial_month(date(2026, 3, 15)), month(2026, 3));
        assert_eq!(semester.initial_month(date(2026, 10, 18)), month(2026, 1));
        // Before the 12th the semester has not started yet.
        assert_eq!(semester.initial_month(date(2026, 1, 5)), month(2026, 1));
    }

    #[test]
    fn navigation_stops_at_bounds() {
        let mut cursor = MonthCursor::for_semester(&second_semester(), date(2026, 1, 20));

        assert!(!cursor.can_go_previous());
        assert!(!cursor.previous());
        assert_eq!(cursor.current(), month(2026, 1));

        for expected in 2..=5 {
            assert!(cursor.next());
            assert_eq!(cursor.current(), month(2026, expected));
        }

        assert!(!cursor.can_go_next());
        assert!(!cursor.next());
        assert_eq!(cursor.current(), month(2026, 5));

        assert!(cursor.previous());
        assert_eq!(cursor.current(), month(2026, 4));
    }

    #[test]
    fn bounds_crossing_a_year() {
        let semester = Semester::new("1st Semester", date(2025, 8, 11), date(2025, 12, 19));
        let mut cursor = MonthCursor::new(month(2025, 12), semester.bounds());

        assert!(!cursor.next());
        assert!(cursor.previous());
        assert_eq!(cursor.current(), month(2025, 11));

        let wide = MonthBounds::new(month(2026, 2), month(2025, 11));
        assert_eq!(wide.first, month(2025, 11));
        assert!(wide.contains(month(2026, 1)));
        assert!(!wide.contains(month(2026, 3)));
    }

    #[test]
    fn start_outside_bounds_is_clamped() {
        let cursor = MonthCursor::new(month(2027, 1), second_semester().bounds());
        assert_eq!(cursor.current(), month(2026, 5));
    }
}
