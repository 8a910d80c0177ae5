use ::ics::{
    components::Parameter,
    escape_text,
    properties::{CalScale, DtEnd, DtStart, Method, Summary},
    ICalendar,
};
use chrono::Days;

use crate::event::{CalendarEvent, EventSource};
use crate::query::YearMonth;

const PRODID: &str = "-//QCU Student Portal//Calendar//EN";

/// Renders all-day events as an iCalendar document.
pub fn to_ics(events: &[CalendarEvent]) -> String {
    let mut icalendar = ICalendar::new("2.0", PRODID);
    icalendar.push(CalScale::new("GREGORIAN"));
    icalendar.push(Method::new("PUBLISH"));

    for event in events {
        icalendar.add_event(event.to_ics());
    }

    icalendar.to_string()
}

/// Download name for the events of `month`.
pub fn ics_filename(month: YearMonth) -> String {
    format!("qcu_calendar_{:04}_{:02}.ics", month.year(), month.month())
}

impl CalendarEvent {
    /// DTEND is the day after `end_date`, as all-day events are end-exclusive.
    #[must_use]
    pub fn to_ics(&self) -> ::ics::Event<'_> {
        let start = self.start_date.format("%Y%m%d").to_string();
        let end = self
            .end_date
            .checked_add_days(Days::new(1))
            .unwrap_or(self.end_date)
            .format("%Y%m%d")
            .to_string();

        let source = match self.source {
            EventSource::University => "university",
            EventSource::Holiday => "holiday",
        };
        let id = format!("{source}-{}-{start}@qcu-portal", self.id);

        let mut ics_event = ::ics::Event::new(id, format!("{start}T000000Z"));

        let mut dtstart = DtStart::new(start);
        dtstart.add(Parameter::new("VALUE", "DATE"));
        let mut dtend = DtEnd::new(end);
        dtend.add(Parameter::new("VALUE", "DATE"));

        ics_event.push(Summary::new(escape_text(self.title.as_str())));
        ics_event.push(dtstart);
        ics_event.push(dtend);

        ics_event
    }
}
