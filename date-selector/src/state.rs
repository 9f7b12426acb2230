//! Shared handle for hosts that reach the controller from several closures.
//!
//! A list view typically registers separate scroll, layout and press
//! handlers. Each of them holds a clone of [`SharedDateSelector`]; the
//! controller itself stays a plain `&mut self` state machine.

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::RwLock;

use crate::{controller::DateSelectorController, error::SelectorError};

/// Cloneable, lock-protected [`DateSelectorController`].
#[derive(Clone, Debug)]
pub struct SharedDateSelector {
    inner: Arc<RwLock<DateSelectorController>>,
}

impl SharedDateSelector {
    pub fn new(controller: DateSelectorController) -> Self {
        Self {
            inner: Arc::new(RwLock::new(controller)),
        }
    }

    /// Runs `f` with shared access.
    pub fn with<R>(&self, f: impl FnOnce(&DateSelectorController) -> R) -> R {
        f(&self.inner.read())
    }

    /// Runs `f` with exclusive access.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut DateSelectorController) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Press on the cell at `index`.
    ///
    /// Unlike [`DateSelectorController::press`], the callback runs after the
    /// lock is released, so a parent may feed the day straight back through
    /// this handle.
    pub fn press(&self, index: usize) -> Result<NaiveDate, SelectorError> {
        let (date, callback) = {
            let controller = self.inner.read();
            (controller.date_at(index)?, controller.on_date_select())
        };
        if let Some(callback) = callback {
            callback(date);
        }
        Ok(date)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::OnceLock, time::Instant};

    use super::*;
    use crate::args::DateSelectorArgs;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn controlled_selection_round_trip() {
        let handle: Arc<OnceLock<SharedDateSelector>> = Arc::new(OnceLock::new());
        let parent = handle.clone();

        let controller = DateSelectorController::new(
            DateSelectorArgs::default(),
            Some(date(2024, 6, 15)),
            Instant::now(),
        )
        .unwrap()
        .with_on_date_select(move |pressed| {
            if let Some(selector) = parent.get() {
                selector
                    .with_mut(|strip| strip.set_selected_date(Some(pressed), Instant::now()))
                    .unwrap();
            }
        });
        let shared = SharedDateSelector::new(controller);
        assert!(handle.set(shared.clone()).is_ok());

        assert_eq!(shared.press(190).unwrap(), date(2024, 6, 23));
        assert_eq!(shared.with(|strip| strip.selected_date()), date(2024, 6, 23));
        assert_eq!(shared.with(|strip| strip.selected_index()), Some(182));
    }

    #[test]
    fn press_outside_window_reports_error() {
        let shared = SharedDateSelector::new(
            DateSelectorController::new(DateSelectorArgs::default(), None, Instant::now())
                .unwrap(),
        );
        assert!(matches!(
            shared.press(365),
            Err(SelectorError::IndexOutOfWindow { index: 365, len: 365 })
        ));
    }
}
