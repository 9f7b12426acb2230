//! The contiguous range of days currently addressable by index.
//!
//! A [`DateWindow`] is nothing more than a start day and a length; every
//! lookup is plain date arithmetic, so the cost of a window does not depend
//! on how many days it spans. Windows only ever grow. Shrinking happens by
//! replacing the whole window on reset.

use chrono::NaiveDate;
use tracing::trace;

use crate::{
    day::{days_between, shift_days},
    error::SelectorError,
};

/// Contiguous run of calendar days backing the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    len: usize,
}

impl DateWindow {
    /// Builds a window with `days_before` days ahead of `selected` and
    /// `days_after` days behind it, so `selected` sits at index
    /// `days_before`.
    pub fn centered(
        selected: NaiveDate,
        days_before: u32,
        days_after: u32,
    ) -> Result<Self, SelectorError> {
        let start = shift_days(selected, -i64::from(days_before))?;
        // The last day must be representable too.
        shift_days(selected, i64::from(days_after))?;
        Ok(Self {
            start,
            len: days_before as usize + days_after as usize + 1,
        })
    }

    /// First day of the window (index 0).
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Number of days in the window. Always at least one.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Windows are never empty; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Last day of the window.
    pub fn end(&self) -> NaiveDate {
        // `len` days from a representable start were checked on every growth.
        self.date_at(self.len - 1).unwrap_or(self.start)
    }

    /// Day at `index`, or `None` past the end.
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        if index >= self.len {
            return None;
        }
        shift_days(self.start, index as i64).ok()
    }

    /// Index of `date`, or `None` when it lies outside the window.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let offset = days_between(self.start, date);
        if offset < 0 || offset as usize >= self.len {
            return None;
        }
        Some(offset as usize)
    }

    /// Whether `date` is addressable.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.index_of(date).is_some()
    }

    /// Whether `date` lies at least `margin` days away from both ends.
    pub fn contains_with_margin(&self, date: NaiveDate, margin: u32) -> bool {
        let Some(index) = self.index_of(date) else {
            return false;
        };
        let margin = margin as usize;
        index >= margin && index + margin < self.len
    }

    /// Prepends `days` days. Every existing index moves up by `days`.
    pub fn extend_backward(&mut self, days: u32) -> Result<(), SelectorError> {
        let start = shift_days(self.start, -i64::from(days))?;
        self.start = start;
        self.len += days as usize;
        trace!(start = %self.start, len = self.len, "window extended backward");
        Ok(())
    }

    /// Appends `days` days. Existing indices are untouched.
    pub fn extend_forward(&mut self, days: u32) -> Result<(), SelectorError> {
        let new_len = self.len + days as usize;
        shift_days(self.start, new_len as i64 - 1)?;
        self.len = new_len;
        trace!(start = %self.start, len = self.len, "window extended forward");
        Ok(())
    }
}
