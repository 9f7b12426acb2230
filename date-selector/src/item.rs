//! Renderable day cells derived from the window.
//!
//! Items are never stored. The host asks for an index (or a range) and gets
//! a freshly derived [`DateListItem`]. Identity is tied to the day, not to
//! the index, so cells survive a backward extension without remounting.

use chrono::{Datelike, NaiveDate};

use crate::{
    day::{day_label, midnight_millis, month_label, weekday_label},
    window::DateWindow,
};

/// Stable list key of a day cell: local-midnight epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemKey(pub i64);

/// Everything that can change how a cell looks.
///
/// Hosts that memoize rendered cells compare identities; a cell whose
/// identity is unchanged does not need to be rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemIdentity {
    pub timestamp: i64,
    pub selected: bool,
}

/// One day cell of the strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateListItem {
    /// Position in the current window. Shifts on backward extension.
    pub index: usize,
    /// The calendar day.
    pub date: NaiveDate,
    /// Index-independent list key.
    pub key: ItemKey,
    /// ISO date (`YYYY-MM-DD`), index-independent.
    pub id: String,
    /// Local-midnight epoch milliseconds.
    pub timestamp: i64,
    /// Whether this is the parent's selected day.
    pub selected: bool,
    /// Whether this is the current local day.
    pub is_today: bool,
}

impl DateListItem {
    pub fn identity(&self) -> ItemIdentity {
        ItemIdentity {
            timestamp: self.timestamp,
            selected: self.selected,
        }
    }

    pub fn weekday_label(&self) -> String {
        weekday_label(self.date)
    }

    pub fn day_label(&self) -> String {
        day_label(self.date)
    }

    pub fn month_label(&self) -> String {
        month_label(self.date)
    }

    /// True on the first day of a month, where hosts usually draw a month
    /// marker.
    pub fn starts_month(&self) -> bool {
        self.date.day() == 1
    }
}

/// Derives cells from a window and the current highlight state.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ItemAdapter {
    pub(crate) selected_millis: i64,
    pub(crate) today: NaiveDate,
}

impl ItemAdapter {
    pub(crate) fn new(selected: NaiveDate, today: NaiveDate) -> Self {
        Self {
            selected_millis: midnight_millis(selected),
            today,
        }
    }

    pub(crate) fn item(&self, window: &DateWindow, index: usize) -> Option<DateListItem> {
        let date = window.date_at(index)?;
        let timestamp = midnight_millis(date);
        Some(DateListItem {
            index,
            date,
            key: ItemKey(timestamp),
            id: date.format("%Y-%m-%d").to_string(),
            timestamp,
            selected: timestamp == self.selected_millis,
            is_today: date == self.today,
        })
    }

    pub(crate) fn items(
        &self,
        window: &DateWindow,
        range: std::ops::Range<usize>,
    ) -> Vec<DateListItem> {
        let end = range.end.min(window.len());
        (range.start..end)
            .filter_map(|index| self.item(window, index))
            .collect()
    }
}
