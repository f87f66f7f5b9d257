//! DateTime display utilities.
//!
//! Deadlines are instants at the start of a civil day in the bot's timezone,
//! so they are always rendered in an explicitly supplied zone rather than the
//! host's.

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

/// Formats a timestamp as `YYYY-MM-DD HH:MM TZ` in the given timezone.
pub struct LocalDateTime<'a>(pub &'a Timestamp, pub &'a TimeZone);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0.to_zoned(self.1.clone()).strftime("%Y-%m-%d %H:%M %Z")
        )
    }
}

/// Formats the civil date of a timestamp as `YYYY-MM-DD` in the given
/// timezone.
pub struct LocalDate<'a>(pub &'a Timestamp, pub &'a TimeZone);

impl fmt::Display for LocalDate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_zoned(self.1.clone()).date())
    }
}

/// Renders a value whose output depends on a timezone.
///
/// Display implementations for the wrapped types live next to the other model
/// formatting in [`super::models`].
pub struct InZone<'a, T>(pub &'a T, pub &'a TimeZone);

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn test_local_date_uses_given_zone() {
        let tz = TimeZone::get("Europe/Moscow").unwrap();
        let midnight = date(2024, 3, 10).to_zoned(tz.clone()).unwrap().timestamp();

        assert_eq!(LocalDate(&midnight, &tz).to_string(), "2024-03-10");
        // 21:00 UTC on the previous day
        assert_eq!(LocalDate(&midnight, &TimeZone::UTC).to_string(), "2024-03-09");
        assert_eq!(
            LocalDateTime(&midnight, &TimeZone::UTC).to_string(),
            "2024-03-09 21:00 UTC"
        );
    }
}
