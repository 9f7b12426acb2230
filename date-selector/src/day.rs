//! Calendar-day helpers shared by the window and the item adapter.
//!
//! The strip works on time-zone-naive calendar days. Anything carrying a
//! time of day is normalized through [`IntoDay`] before it is compared, and
//! the per-item timestamp is the epoch milliseconds of local midnight.

use chrono::{
    DateTime, Days, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone,
};

use crate::error::SelectorError;

/// Conversion of date-like values into a calendar day, discarding the time
/// of day.
pub trait IntoDay {
    /// Returns the calendar day this value falls on.
    fn into_day(self) -> NaiveDate;
}

impl IntoDay for NaiveDate {
    fn into_day(self) -> NaiveDate {
        self
    }
}

impl IntoDay for NaiveDateTime {
    fn into_day(self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> IntoDay for DateTime<Tz> {
    /// Zoned values are first moved into the local zone so that "today"
    /// means the same thing to the parent and to the strip.
    fn into_day(self) -> NaiveDate {
        self.with_timezone(&Local).date_naive()
    }
}

/// Returns the current local calendar day.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Epoch milliseconds of local midnight on `date`.
pub fn midnight_millis(date: NaiveDate) -> i64 {
    midnight_millis_in(date, &Local)
}

/// Epoch milliseconds at which `date` begins in `tz`.
///
/// When a transition skips midnight the day begins at the transition itself,
/// which is midnight read with the offset in force just before it.
fn midnight_millis_in<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> i64 {
    let midnight = date.and_time(NaiveTime::MIN);
    if let Some(start) = tz.from_local_datetime(&midnight).earliest() {
        return start.timestamp_millis();
    }
    let offset_before = midnight
        .checked_sub_signed(TimeDelta::hours(12))
        .and_then(|noon_before| tz.offset_from_local_datetime(&noon_before).earliest());
    let utc_millis = midnight.and_utc().timestamp_millis();
    match offset_before {
        Some(offset) => utc_millis - i64::from(offset.fix().local_minus_utc()) * 1000,
        None => utc_millis,
    }
}

/// Moves `date` by a signed number of days.
pub fn shift_days(date: NaiveDate, days: i64) -> Result<NaiveDate, SelectorError> {
    let magnitude = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    };
    shifted.ok_or(SelectorError::DateOutOfRange { date, days })
}

/// Whole days from `from` to `to`; negative when `to` is earlier.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Short weekday name, e.g. `Mon`.
pub fn weekday_label(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

/// Day of month without padding, e.g. `5`.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%-d").to_string()
}

/// Abbreviated month and year, e.g. `Jun 2024`.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, MappedLocalTime, Utc};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn naive_datetime_drops_time_of_day() {
        let evening = date(2024, 6, 15).and_hms_opt(23, 59, 59).unwrap();
        assert_eq!(evening.into_day(), date(2024, 6, 15));
    }

    #[test]
    fn zoned_value_lands_on_its_local_day() {
        let local_noon = Local
            .from_local_datetime(&date(2024, 6, 15).and_hms_opt(12, 0, 0).unwrap())
            .earliest()
            .unwrap();
        assert_eq!(local_noon.with_timezone(&Utc).into_day(), date(2024, 6, 15));
    }

    #[test]
    fn midnight_millis_is_monotonic_per_day() {
        let a = midnight_millis(date(2024, 3, 9));
        let b = midnight_millis(date(2024, 3, 10));
        let c = midnight_millis(date(2024, 3, 11));
        assert!(a < b && b < c);
        assert_eq!(midnight_millis(date(2024, 3, 10)), b);
    }

    /// +01:00 until 2024-03-30T23:00Z, +02:00 afterwards: local midnight of
    /// 2024-03-31 does not exist.
    #[derive(Debug, Clone, Copy)]
    struct SkipsMidnight;

    impl SkipsMidnight {
        fn transition() -> NaiveDateTime {
            date(2024, 3, 30).and_hms_opt(23, 0, 0).unwrap()
        }

        fn before() -> FixedOffset {
            FixedOffset::east_opt(3600).unwrap()
        }

        fn after() -> FixedOffset {
            FixedOffset::east_opt(7200).unwrap()
        }
    }

    impl TimeZone for SkipsMidnight {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            SkipsMidnight
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> MappedLocalTime<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(
            &self,
            local: &NaiveDateTime,
        ) -> MappedLocalTime<FixedOffset> {
            let transition = Self::transition();
            let before = *local - TimeDelta::hours(1) < transition;
            let after = *local - TimeDelta::hours(2) >= transition;
            match (before, after) {
                (true, true) => MappedLocalTime::Ambiguous(Self::before(), Self::after()),
                (true, false) => MappedLocalTime::Single(Self::before()),
                (false, true) => MappedLocalTime::Single(Self::after()),
                (false, false) => MappedLocalTime::None,
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::transition() {
                Self::before()
            } else {
                Self::after()
            }
        }
    }

    #[test]
    fn skipped_midnight_starts_the_day_at_the_transition() {
        let skipped = midnight_millis_in(date(2024, 3, 31), &SkipsMidnight);
        assert_eq!(skipped, SkipsMidnight::transition().and_utc().timestamp_millis());

        let previous = midnight_millis_in(date(2024, 3, 30), &SkipsMidnight);
        let next = midnight_millis_in(date(2024, 4, 1), &SkipsMidnight);
        assert_eq!(
            previous,
            date(2024, 3, 29).and_hms_opt(23, 0, 0).unwrap().and_utc().timestamp_millis()
        );
        assert_eq!(
            next,
            date(2024, 3, 31).and_hms_opt(22, 0, 0).unwrap().and_utc().timestamp_millis()
        );
        assert!(previous < skipped && skipped < next);
    }

    #[test]
    fn shift_days_crosses_leap_day() {
        assert_eq!(shift_days(date(2024, 6, 15), -182).unwrap(), date(2023, 12, 16));
        assert_eq!(shift_days(date(2024, 6, 15), 182).unwrap(), date(2024, 12, 14));
        assert_eq!(shift_days(date(2024, 2, 28), 1).unwrap(), date(2024, 2, 29));
    }

    #[test]
    fn shift_days_reports_overflow() {
        let err = shift_days(NaiveDate::MIN, -1).unwrap_err();
        assert_eq!(
            err,
            SelectorError::DateOutOfRange {
                date: NaiveDate::MIN,
                days: -1
            }
        );
    }

    #[test]
    fn days_between_is_signed() {
        assert_eq!(days_between(date(2024, 6, 15), date(2024, 6, 20)), 5);
        assert_eq!(days_between(date(2024, 6, 20), date(2024, 6, 15)), -5);
    }

    #[test]
    fn labels() {
        let d = date(2024, 6, 5);
        assert_eq!(weekday_label(d), "Wed");
        assert_eq!(day_label(d), "5");
        assert_eq!(month_label(d), "Jun 2024");
    }
}
