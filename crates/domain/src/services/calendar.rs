//! Business-day calendar.
//!
//! A business day is a calendar day that is neither a weekend day nor a
//! configured holiday. The holiday set is static configuration; swapping
//! years or jurisdictions is a config change, not a logic change.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::collections::HashSet;

/// Korean public holidays for 2026, the shipped default calendar.
pub const KR_HOLIDAYS_2026: &[&str] = &[
    "2026-01-01", // New Year's Day
    "2026-02-16", // Seollal holidays
    "2026-02-17",
    "2026-02-18",
    "2026-03-01", // Independence Movement Day
    "2026-03-02", // substitute holiday
    "2026-05-05", // Children's Day
    "2026-05-24", // Buddha's Birthday
    "2026-05-25", // substitute holiday
    "2026-06-06", // Memorial Day
    "2026-08-15", // Liberation Day
    "2026-08-17", // substitute holiday
    "2026-09-24", // Chuseok holidays
    "2026-09-25",
    "2026-09-26",
    "2026-10-03", // National Foundation Day
    "2026-10-05", // substitute holiday
    "2026-10-09", // Hangul Day
    "2026-12-25", // Christmas
];

/// Weekend/holiday-aware date arithmetic. Pure; no clock access.
#[derive(Debug, Clone)]
pub struct BusinessCalendar {
    holidays: HashSet<NaiveDate>,
}

impl BusinessCalendar {
    /// Builds a calendar from ISO `YYYY-MM-DD` date strings.
    ///
    /// Unparseable entries are skipped with a warning rather than rejected,
    /// so a typo in one config line does not take the service down.
    pub fn from_iso_dates<'a, I: IntoIterator<Item = &'a str>>(dates: I) -> Self {
        let holidays = dates
            .into_iter()
            .filter_map(|s| match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                Ok(d) => Some(d),
                Err(_) => {
                    tracing::warn!(date = s, "Skipping unparseable holiday entry");
                    None
                }
            })
            .collect();
        Self { holidays }
    }

    /// The shipped default: Korean public holidays for 2026.
    pub fn kr_2026() -> Self {
        Self::from_iso_dates(KR_HOLIDAYS_2026.iter().copied())
    }

    /// True iff `date` is neither a weekend day nor a configured holiday.
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        !weekend && !self.holidays.contains(&date)
    }

    /// Walks forward from `today`, counting business days until `n` have been
    /// counted, and returns the n-th qualifying date. `today` itself is never
    /// counted.
    pub fn business_date_floor(&self, today: NaiveDate, n: u32) -> NaiveDate {
        let mut date = today;
        let mut counted = 0;
        while counted < n {
            date = date + Days::new(1);
            if self.is_business_day(date) {
                counted += 1;
            }
        }
        date
    }

    /// Minimum acceptable end date for a ticket of the given urgency.
    ///
    /// Standard tickets need 3 business days of lead time, emergencies 1.
    pub fn min_end_date(&self, today: NaiveDate, is_emergency: bool) -> NaiveDate {
        let floor = if is_emergency { 1 } else { 3 };
        self.business_date_floor(today, floor)
    }
}
