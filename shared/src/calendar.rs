//! iCal export for saved date plans.
//!
//! Output depends only on the plan: the timestamp comes from `created_at`
//! and the UID from the plan id, so the same plan always renders to the
//! same bytes.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use ics::components::Parameter;
use ics::properties::{CalScale, Description, DtEnd, DtStart, Location, Method, Summary};
use ics::{Event, ICalendar};

use crate::models::DatePlan;

const PRODID: &str = "-//DateThinker//Date Plan Export//EN";

/// Length of a scheduled date, in hours.
pub const DEFAULT_EVENT_HOURS: i64 = 3;

/// Escape a TEXT value for a property.
///
/// Line breaks become LF and other control characters are dropped before
/// the `ics` escaping of backslash, semicolon, comma and newline.
pub fn escape_text(input: &str) -> String {
    let normalized: String = input
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .chars()
        .filter(|c| *c == '\n' || !c.is_control())
        .collect();

    ics::escape_text(normalized).into_owned()
}

fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

fn format_date(date: &NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

fn describe_venues(plan: &DatePlan) -> Option<String> {
    if plan.venues.is_empty() {
        return None;
    }

    let lines: Vec<String> = plan
        .venues
        .iter()
        .enumerate()
        .map(|(idx, venue)| {
            escape_text(&format!(
                "{}. {} ({}) - {}",
                idx + 1,
                venue.name,
                venue.category,
                venue.address
            ))
        })
        .collect();

    Some(lines.join("\\n"))
}

fn build_event(plan: &DatePlan) -> Event<'static> {
    let mut event = Event::new(
        format!("{}@datethinker", plan.id),
        format_utc(&plan.created_at),
    );

    match plan.scheduled_for {
        Some(start) => {
            let end = start + Duration::hours(DEFAULT_EVENT_HOURS);
            event.push(DtStart::new(format_utc(&start)));
            event.push(DtEnd::new(format_utc(&end)));
        }
        None => {
            // All-day on the creation date; DTEND is exclusive.
            let day = plan.created_at.date_naive();
            let next = day.succ_opt().unwrap_or(day);

            let mut start = DtStart::new(format_date(&day));
            start.add(Parameter::new("VALUE", "DATE"));
            let mut end = DtEnd::new(format_date(&next));
            end.add(Parameter::new("VALUE", "DATE"));

            event.push(start);
            event.push(end);
        }
    }

    event.push(Summary::new(escape_text(&plan.title)));

    if let Some(description) = describe_venues(plan) {
        event.push(Description::new(description));
    }

    if let Some(first) = plan.venues.first() {
        event.push(Location::new(escape_text(&first.address)));
    }

    event
}

/// Render a date plan as a single-event iCal document.
pub fn generate_ical_event(plan: &DatePlan) -> String {
    let mut calendar = ICalendar::new("2.0", PRODID);
    calendar.push(CalScale::new("GREGORIAN"));
    calendar.push(Method::new("PUBLISH"));
    calendar.add_event(build_event(plan));

    calendar.to_string()
}

/// Download name for a plan's calendar file.
pub fn calendar_filename(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .take(80)
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        "date-plan.ics".to_string()
    } else {
        format!("{}.ics", cleaned)
    }
}
