//! Booking rules: date/time formats, the daily slot grid and what can still
//! be booked at a given moment.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::Rejection;
use crate::types::Appointment;

/// Bookable times of a day, in order.
pub const SLOTS: [&str; 8] = [
    "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00",
];

/// Same-day bookings close at this hour.
const CLOSING_HOUR: u32 = 16;

/// Parse a strict `YYYY-MM-DD` date.
pub fn validate_date(date: &str) -> Result<NaiveDate, Rejection> {
    let bytes = date.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(Rejection::InvalidDate(date.to_string()));
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| Rejection::InvalidDate(date.to_string()))
}

/// Parse a strict `HH:MM` time with two-digit fields.
pub fn validate_time(time: &str) -> Result<NaiveTime, Rejection> {
    let invalid = || Rejection::InvalidTime(time.to_string());

    let (hours, minutes) = time.split_once(':').ok_or_else(invalid)?;
    if hours.len() != 2 || minutes.len() != 2 {
        return Err(invalid());
    }
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(invalid)
}

/// `SLOTS` minus every reserved time.
pub fn available_times<'a, I>(reserved: I) -> Vec<&'static str>
where
    I: IntoIterator<Item = &'a str>,
{
    let reserved: Vec<&str> = reserved.into_iter().collect();
    SLOTS
        .iter()
        .copied()
        .filter(|slot| !reserved.contains(slot))
        .collect()
}

/// Order appointments by date, then time. Valid dates and times sort
/// correctly as strings.
pub fn sort_by_schedule(appointments: &mut [Appointment]) {
    appointments.sort_by(|a, b| (&a.date, &a.time).cmp(&(&b.date, &b.time)));
}

/// Check that `date` at `time` may still be booked at `now`. Formats must
/// already be valid; slot availability is checked separately.
pub fn check_bookable(date: NaiveDate, time: NaiveTime, now: NaiveDateTime) -> Result<(), Rejection> {
    let today = now.date();
    if date < today {
        return Err(Rejection::PastDate(date.to_string()));
    }
    if date == today {
        if now.hour() >= CLOSING_HOUR {
            return Err(Rejection::DayClosed);
        }
        if time <= now.time() {
            return Err(Rejection::TimeNotInFuture(time.format("%H:%M").to_string()));
        }
    }
    Ok(())
}
