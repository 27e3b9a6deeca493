//! The trailing window of calendar dates a blanket covers, newest first.

use crate::types::reading::NOON_HOUR;
use chrono::{DateTime, Days, NaiveDate, TimeZone, Timelike};

/// Number of days the window reaches back from the reference date.
pub const WINDOW_DAYS: u32 = 365;

/// A finite, restartable range of dates walking backward one day at a time.
///
/// The window starts at the reference date and ends `window_days` days before
/// it, both inclusive. Before noon the reference date itself is left out, since
/// its midday reading does not exist yet.
///
/// # Examples
///
/// ```
/// use chrono::{FixedOffset, NaiveDate, TimeZone};
/// use temperature_blanket::DateWindow;
///
/// let tz = FixedOffset::east_opt(2 * 3600).unwrap();
/// let morning = tz.with_ymd_and_hms(2024, 5, 2, 11, 0, 0).unwrap();
/// let window = DateWindow::generate(&morning, 365);
///
/// assert_eq!(window.len(), 365);
/// assert_eq!(window.newest(), NaiveDate::from_ymd_opt(2024, 5, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    reference_date: NaiveDate,
    newest: Option<NaiveDate>,
    oldest: NaiveDate,
}

impl DateWindow {
    pub fn generate<Tz: TimeZone>(reference: &DateTime<Tz>, window_days: u32) -> Self {
        let reference_date = reference.date_naive();
        let oldest = reference_date
            .checked_sub_days(Days::new(u64::from(window_days)))
            .unwrap_or(NaiveDate::MIN);
        let newest = if reference.hour() < NOON_HOUR {
            reference_date.pred_opt().filter(|date| *date >= oldest)
        } else {
            Some(reference_date)
        };
        Self {
            reference_date,
            newest,
            oldest,
        }
    }

    /// The calendar date of the reference instant ("today"), whether or not
    /// it is part of the window.
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn newest(&self) -> Option<NaiveDate> {
        self.newest
    }

    pub fn oldest(&self) -> Option<NaiveDate> {
        self.newest.map(|_| self.oldest)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.newest
            .is_some_and(|newest| date <= newest && date >= self.oldest)
    }

    pub fn len(&self) -> usize {
        self.newest.map_or(0, |newest| {
            usize::try_from((newest - self.oldest).num_days() + 1).unwrap_or(0)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.newest.is_none()
    }

    pub fn iter(&self) -> WindowDates {
        WindowDates {
            next: self.newest,
            oldest: self.oldest,
        }
    }
}

impl IntoIterator for &DateWindow {
    type Item = NaiveDate;
    type IntoIter = WindowDates;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the dates of a [`DateWindow`], newest first.
#[derive(Debug, Clone)]
pub struct WindowDates {
    next: Option<NaiveDate>,
    oldest: NaiveDate,
}

impl Iterator for WindowDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current > self.oldest {
            current.pred_opt()
        } else {
            None
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.next.map_or(0, |next| {
            usize::try_from((next - self.oldest).num_days() + 1).unwrap_or(0)
        });
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for WindowDates {}
