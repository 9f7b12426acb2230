//! Headless state for an infinitely scrolling horizontal strip of days.
//!
//! The strip shows one cell per calendar day and feels endless in both
//! directions. Only a contiguous window of days is ever addressable; when
//! the viewport approaches either end, the window grows by a fixed chunk.
//! Growing backward shifts every index, so the selector asks the host for an
//! offset correction once the grown content has been laid out, which keeps
//! the day under the user's finger in place.
//!
//! The crate does not render anything. A host list view drives a
//! [`DateSelectorController`] with scroll, layout and frame events and
//! applies the [`ScrollRequest`]s it emits.
//!
//! # Usage
//!
//! ```
//! use std::time::Instant;
//!
//! use chrono::NaiveDate;
//! use date_selector::{DateSelectorArgs, DateSelectorController, px::Px};
//!
//! let selected = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
//! let mut strip = DateSelectorController::new(
//!     DateSelectorArgs::default(),
//!     Some(selected),
//!     Instant::now(),
//! )
//! .unwrap()
//! .with_on_date_select(|date| println!("pressed {date}"));
//!
//! for request in strip.take_scroll_requests() {
//!     // host.scroll_to(request.offset, request.animated);
//!     strip.on_scroll(request.offset);
//! }
//!
//! for item in strip.visible_items(Px(390)) {
//!     let _ = (item.key, item.weekday_label(), item.day_label(), item.selected);
//! }
//! ```

pub mod args;
pub mod controller;
pub mod day;
pub mod error;
pub mod item;
pub mod px;
pub mod scroll;
pub mod state;
pub mod task;
pub mod window;

pub use args::{DateSelectorArgs, ResetPolicy};
pub use controller::{
    DateSelectorController, OnDateSelect, ScrollReason, ScrollRequest, SelectorPhase,
};
pub use day::IntoDay;
pub use error::SelectorError;
pub use item::{DateListItem, ItemIdentity, ItemKey};
pub use state::SharedDateSelector;
pub use window::DateWindow;
