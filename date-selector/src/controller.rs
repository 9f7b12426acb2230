//! The infinite date strip state machine.
//!
//! [`DateSelectorController`] owns the window, the scroll anchor and the
//! deferred work of one strip. It never touches a real list view. The host
//! feeds it events (scroll offsets, content-size changes, frame ticks,
//! presses) and applies the [`ScrollRequest`]s it hands back through
//! [`DateSelectorController::take_scroll_requests`].
//!
//! # Phases
//!
//! ```text
//! Idle --near start--> ExtendingBackward --correction scroll confirmed------> Idle
//! Idle --near end----> ExtendingForward  --next frame-------------------------> Idle
//! Idle --new date----> Resetting         --centering scroll confirmed--------> Idle
//! ```
//!
//! A backward extension emits its correction once the host reports a content
//! size covering the grown window, and stays in flight until the host reports
//! the corrected offset. Scroll events queued before the correction landed
//! cannot trigger a second extension.
//!
//! A reset clears both in-flight flags and abandons any pending correction.
//!
//! # Examples
//!
//! ```
//! use std::time::Instant;
//!
//! use chrono::NaiveDate;
//! use date_selector::{DateSelectorArgs, DateSelectorController, SelectorPhase};
//!
//! let selected = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
//! let mut strip =
//!     DateSelectorController::new(DateSelectorArgs::default(), Some(selected), Instant::now())
//!         .unwrap();
//!
//! // The host applies the centering scroll and reports the resulting offset.
//! let request = strip.take_scroll_requests()[0];
//! strip.on_scroll(request.offset);
//!
//! assert_eq!(strip.phase(), SelectorPhase::Idle);
//! assert_eq!(strip.selected_index(), Some(182));
//! ```

use std::{fmt, ops::Range, sync::Arc, time::Instant};

use chrono::NaiveDate;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::{
    args::{DateSelectorArgs, ResetPolicy},
    day::{IntoDay, today},
    error::SelectorError,
    item::{DateListItem, ItemAdapter},
    px::Px,
    scroll::{ScrollAnchor, ScrollTracker},
    task::{FrameTasks, Generation, TaskKind},
    window::DateWindow,
};

/// Callback invoked with the pressed day.
pub type OnDateSelect = Arc<dyn Fn(NaiveDate) + Send + Sync>;

/// Observable state of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorPhase {
    Idle,
    ExtendingBackward,
    ExtendingForward,
    Resetting,
}

/// Why the selector asked the host to scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollReason {
    /// Center the selected day after a (re)initialization.
    Centering,
    /// Hide a backward extension by moving the offset with the content.
    BackwardCorrection,
    /// Bring a day already inside the window into view.
    JumpToDate,
}

/// A scroll the host is expected to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    /// Absolute offset of the viewport's leading edge.
    pub offset: Px,
    /// Whether the host may animate the move. Corrections never animate.
    pub animated: bool,
    pub reason: ScrollReason,
    /// Operation that produced the request. Report it back unchanged from
    /// [`DateSelectorController::scroll_failed`].
    pub generation: Generation,
    /// Retries already spent on this request.
    pub attempt: u8,
}

/// Headless state of one infinite date strip.
pub struct DateSelectorController {
    args: DateSelectorArgs,
    window: DateWindow,
    tracker: ScrollTracker,
    tasks: FrameTasks,
    requests: SmallVec<[ScrollRequest; 2]>,
    selected: NaiveDate,
    used_fallback: bool,
    today: NaiveDate,
    generation: Generation,
    live_since: Generation,
    backward_in_flight: bool,
    forward_in_flight: bool,
    centering_target: Option<Px>,
    correction_target: Option<Px>,
    on_date_select: Option<OnDateSelect>,
}

impl fmt::Debug for DateSelectorController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateSelectorController")
            .field("window", &self.window)
            .field("phase", &self.phase())
            .field("selected", &self.selected)
            .field("anchor", &self.tracker.anchor())
            .field("generation", &self.generation)
            .field("pending_tasks", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

impl DateSelectorController {
    /// Mounts a strip around `selected` and requests the initial centering
    /// scroll.
    ///
    /// A missing date falls back to today; see [`Self::used_fallback`].
    pub fn new(
        args: DateSelectorArgs,
        selected: Option<NaiveDate>,
        now: Instant,
    ) -> Result<Self, SelectorError> {
        args.validate()?;
        let today = today();
        let (selected, used_fallback) = resolve_selection(selected, today);
        let window = DateWindow::centered(selected, args.days_before, args.days_after)?;
        let mut controller = Self {
            tracker: ScrollTracker::new(args.item_width, args.item_spacing),
            args,
            window,
            tasks: FrameTasks::default(),
            requests: SmallVec::new(),
            selected,
            used_fallback,
            today,
            generation: Generation::default(),
            live_since: Generation::default(),
            backward_in_flight: false,
            forward_in_flight: false,
            centering_target: None,
            correction_target: None,
            on_date_select: None,
        };
        controller.begin_reset(selected, now)?;
        Ok(controller)
    }

    /// Sets the callback invoked by [`Self::press`].
    pub fn with_on_date_select(
        mut self,
        callback: impl Fn(NaiveDate) + Send + Sync + 'static,
    ) -> Self {
        self.on_date_select = Some(Arc::new(callback));
        self
    }

    /// Replaces the press callback.
    pub fn set_on_date_select(&mut self, callback: Option<OnDateSelect>) {
        self.on_date_select = callback;
    }

    pub(crate) fn on_date_select(&self) -> Option<OnDateSelect> {
        self.on_date_select.clone()
    }

    pub fn args(&self) -> &DateSelectorArgs {
        &self.args
    }

    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    pub fn anchor(&self) -> ScrollAnchor {
        self.tracker.anchor()
    }

    /// The generation of the most recent extension or reset.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The day currently highlighted.
    pub fn selected_date(&self) -> NaiveDate {
        self.selected
    }

    /// Whether the highlighted day was substituted for a missing date.
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.window.index_of(self.selected)
    }

    pub fn phase(&self) -> SelectorPhase {
        if self.centering_target.is_some() {
            SelectorPhase::Resetting
        } else if self.backward_in_flight {
            SelectorPhase::ExtendingBackward
        } else if self.forward_in_flight {
            SelectorPhase::ExtendingForward
        } else {
            SelectorPhase::Idle
        }
    }

    /// Pixel extent of the whole window, as the host should lay it out.
    pub fn content_extent(&self) -> Px {
        self.tracker.content_extent(self.window.len())
    }

    /// Overrides the day marked `is_today`, e.g. when a session crosses
    /// midnight.
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    /// Replaces the arguments and rebuilds the window around the selection.
    pub fn set_args(&mut self, args: DateSelectorArgs, now: Instant) -> Result<(), SelectorError> {
        args.validate()?;
        let tracker = ScrollTracker::new(args.item_width, args.item_spacing);
        let previous_args = std::mem::replace(&mut self.args, args);
        let previous_tracker = std::mem::replace(&mut self.tracker, tracker);
        if let Err(err) = self.begin_reset(self.selected, now) {
            self.args = previous_args;
            self.tracker = previous_tracker;
            return Err(err);
        }
        Ok(())
    }

    /// Receives the parent's selected date.
    ///
    /// `None` falls back to today. Whether the window is rebuilt depends on
    /// [`ResetPolicy`]; either way only the highlight reflects the new date,
    /// the selector never changes it on its own.
    pub fn set_selected_date(
        &mut self,
        date: Option<NaiveDate>,
        now: Instant,
    ) -> Result<(), SelectorError> {
        let (date, used_fallback) = resolve_selection(date, self.today);
        self.used_fallback = used_fallback;
        if date == self.selected {
            return Ok(());
        }

        let needs_reset = match self.args.reset_policy {
            ResetPolicy::Always => true,
            ResetPolicy::OutsideComfortRange { margin_days } => {
                !self.window.contains_with_margin(date, margin_days)
            }
        };
        let previous = self.selected;
        self.selected = date;
        if !needs_reset {
            debug!(%previous, %date, "selection moved within the window");
            return Ok(());
        }
        if let Err(err) = self.begin_reset(date, now) {
            self.selected = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Same as [`Self::set_selected_date`] for any date-like value.
    pub fn set_selected(&mut self, value: impl IntoDay, now: Instant) -> Result<(), SelectorError> {
        self.set_selected_date(Some(value.into_day()), now)
    }

    /// Rebuilds the window around the current selection.
    pub fn reset(&mut self, now: Instant) -> Result<(), SelectorError> {
        self.begin_reset(self.selected, now)
    }

    /// Brings `date` into view: an animated scroll when it is already in the
    /// window, a reset around it otherwise. The selection is left alone.
    pub fn scroll_to_date(&mut self, date: NaiveDate, now: Instant) -> Result<(), SelectorError> {
        match self.window.index_of(date) {
            Some(index) if self.centering_target.is_none() => {
                let offset = self.tracker.offset_for_index(index);
                self.requests.push(ScrollRequest {
                    offset,
                    animated: true,
                    reason: ScrollReason::JumpToDate,
                    generation: self.generation,
                    attempt: 0,
                });
                Ok(())
            }
            _ => self.begin_reset(date, now),
        }
    }

    /// Scroll event from the host.
    pub fn on_scroll(&mut self, offset: Px) {
        self.tracker.record_offset(offset);

        if let Some(target) = self.centering_target {
            if offset == target {
                self.finish_reset("centering scroll observed");
            }
            return;
        }
        if self.correction_target == Some(offset) {
            self.release_backward("correction scroll observed");
        }

        let proximity = self
            .tracker
            .edge_proximity(self.window.len(), self.args.edge_threshold);
        if proximity.near_start
            && let Err(err) = self.extend_backward()
        {
            debug!(%err, "window cannot grow backward");
        }
        if proximity.near_end
            && let Err(err) = self.extend_forward()
        {
            debug!(%err, "window cannot grow forward");
        }
    }

    /// Prepends a chunk of days.
    ///
    /// Returns `Ok(false)` without touching the window while a backward
    /// extension or a reset is still settling.
    pub fn extend_backward(&mut self) -> Result<bool, SelectorError> {
        if self.backward_in_flight || self.centering_target.is_some() {
            trace!("backward extension already in flight");
            return Ok(false);
        }
        let chunk = self.args.chunk_days;
        self.window.extend_backward(chunk)?;
        self.generation = self.generation.next();
        let delta = self.tracker.defer_correction(chunk as usize, self.generation);
        self.backward_in_flight = true;
        debug!(
            generation = self.generation.raw(),
            chunk,
            %delta,
            len = self.window.len(),
            "extending window backward"
        );
        Ok(true)
    }

    /// Appends a chunk of days.
    ///
    /// Returns `Ok(false)` while a forward extension or a reset is still
    /// settling.
    pub fn extend_forward(&mut self) -> Result<bool, SelectorError> {
        if self.forward_in_flight || self.centering_target.is_some() {
            trace!("forward extension already in flight");
            return Ok(false);
        }
        let chunk = self.args.chunk_days;
        self.window.extend_forward(chunk)?;
        self.generation = self.generation.next();
        self.forward_in_flight = true;
        self.tasks.next_frame(self.generation, TaskKind::ReleaseForward);
        debug!(
            generation = self.generation.raw(),
            chunk,
            len = self.window.len(),
            "extending window forward"
        );
        Ok(true)
    }

    /// Content-size change reported by the host after a layout pass.
    ///
    /// This is where a backward extension's offset correction is released:
    /// only once the reported extent covers the grown window.
    pub fn on_content_size_changed(&mut self, extent: Px) {
        let Some((offset, generation)) = self
            .tracker
            .commit_correction(extent, self.window.len())
        else {
            return;
        };
        self.correction_target = Some(offset);
        debug!(
            generation = generation.raw(),
            %offset,
            "applying backward extension correction"
        );
        self.requests.push(ScrollRequest {
            offset,
            animated: false,
            reason: ScrollReason::BackwardCorrection,
            generation,
            attempt: 0,
        });
    }

    /// The host's list finished its first layout and can honour scrolls.
    ///
    /// The centering scroll is re-issued at once. The strip stays in
    /// [`SelectorPhase::Resetting`] until the host reports the centered
    /// offset; the timed retry remains as the last resort.
    pub fn on_layout_ready(&mut self) {
        let Some(target) = self.centering_target else {
            return;
        };
        trace!(%target, "layout ready, re-issuing centering scroll");
        self.push_centering(target);
    }

    /// Frame tick. Runs the deferred work that has come due.
    pub fn on_frame(&mut self, now: Instant) {
        for task in self.tasks.take_due(now, self.live_since) {
            match task {
                TaskKind::ReleaseForward => {
                    self.forward_in_flight = false;
                }
                TaskKind::RetryCentering => {
                    if let Some(target) = self.centering_target {
                        self.push_centering(target);
                        self.finish_reset("centering retry deadline");
                    }
                }
                TaskKind::ReleaseBackward => {
                    if self.correction_target.is_some() {
                        self.release_backward("correction handed to host a frame ago");
                    }
                }
                TaskKind::RetryScroll(request) => {
                    self.requests.push(request);
                }
            }
        }
    }

    /// The host could not apply `request` (typically because the target
    /// cell was not measured yet). It is retried on the next frame, a
    /// bounded number of times. Requests from a superseded window are
    /// dropped.
    pub fn scroll_failed(&mut self, request: ScrollRequest) {
        if request.generation < self.live_since {
            trace!(generation = request.generation.raw(), "ignoring stale scroll failure");
            return;
        }
        let correction = request.reason == ScrollReason::BackwardCorrection
            && self.correction_target == Some(request.offset);
        if correction {
            self.tasks
                .cancel(|kind| matches!(kind, TaskKind::ReleaseBackward));
        }
        if request.attempt >= self.args.max_scroll_retries {
            warn!(
                offset = %request.offset,
                reason = ?request.reason,
                "giving up on scroll request after {} retries",
                request.attempt
            );
            if correction {
                self.release_backward("correction abandoned");
            }
            return;
        }
        let retry = ScrollRequest {
            attempt: request.attempt + 1,
            ..request
        };
        self.tasks
            .next_frame(request.generation, TaskKind::RetryScroll(retry));
    }

    /// Drains the scroll requests issued since the last call, oldest first.
    ///
    /// A drained backward correction counts as handed to the host: if the
    /// host never reports the corrected offset, the extension is released on
    /// the next frame tick anyway.
    pub fn take_scroll_requests(&mut self) -> SmallVec<[ScrollRequest; 2]> {
        let requests = std::mem::take(&mut self.requests);
        for request in &requests {
            if request.reason == ScrollReason::BackwardCorrection
                && self.correction_target == Some(request.offset)
            {
                self.tasks
                    .next_frame(request.generation, TaskKind::ReleaseBackward);
            }
        }
        requests
    }

    /// Cell at `index`.
    pub fn item(&self, index: usize) -> Option<DateListItem> {
        self.adapter().item(&self.window, index)
    }

    /// Cells in `range`, clamped to the window.
    pub fn items(&self, range: Range<usize>) -> Vec<DateListItem> {
        self.adapter().items(&self.window, range)
    }

    /// Index range worth rendering for a viewport `viewport` pixels wide.
    pub fn visible_range(&self, viewport: Px) -> Range<usize> {
        self.tracker
            .visible_range(self.window.len(), viewport, self.args.overscan)
    }

    /// Cells worth rendering for a viewport `viewport` pixels wide.
    pub fn visible_items(&self, viewport: Px) -> Vec<DateListItem> {
        self.items(self.visible_range(viewport))
    }

    /// Day at `index`. Used by hosts to resolve a press.
    pub fn date_at(&self, index: usize) -> Result<NaiveDate, SelectorError> {
        self.window
            .date_at(index)
            .ok_or(SelectorError::IndexOutOfWindow {
                index,
                len: self.window.len(),
            })
    }

    /// Press on the cell at `index`: reports its day through the callback.
    ///
    /// The highlight does not move until the parent passes the day back via
    /// [`Self::set_selected_date`].
    pub fn press(&self, index: usize) -> Result<NaiveDate, SelectorError> {
        let date = self.date_at(index)?;
        trace!(index, %date, "day pressed");
        if let Some(callback) = &self.on_date_select {
            callback(date);
        }
        Ok(date)
    }

    fn adapter(&self) -> ItemAdapter {
        ItemAdapter::new(self.selected, self.today)
    }

    fn begin_reset(&mut self, center: NaiveDate, now: Instant) -> Result<(), SelectorError> {
        let window = DateWindow::centered(center, self.args.days_before, self.args.days_after)?;

        self.generation = self.generation.next();
        self.live_since = self.generation;
        self.window = window;
        self.backward_in_flight = false;
        self.forward_in_flight = false;
        self.correction_target = None;
        self.tasks.clear();
        self.requests.clear();

        let target = self.tracker.offset_for_index(self.args.days_before as usize);
        self.tracker.reset(target);
        self.centering_target = Some(target);
        self.push_centering(target);
        self.tasks.at(
            self.generation,
            now + self.args.reset_retry_delay,
            TaskKind::RetryCentering,
        );
        debug!(
            generation = self.generation.raw(),
            %center,
            start = %self.window.start(),
            len = self.window.len(),
            "window reset"
        );
        Ok(())
    }

    fn push_centering(&mut self, offset: Px) {
        self.requests.push(ScrollRequest {
            offset,
            animated: false,
            reason: ScrollReason::Centering,
            generation: self.generation,
            attempt: 0,
        });
    }

    fn release_backward(&mut self, cause: &'static str) {
        self.backward_in_flight = false;
        self.correction_target = None;
        self.tasks
            .cancel(|kind| matches!(kind, TaskKind::ReleaseBackward));
        trace!(cause, "backward extension settled");
    }

    fn finish_reset(&mut self, cause: &'static str) {
        self.centering_target = None;
        self.tasks
            .cancel(|kind| matches!(kind, TaskKind::RetryCentering));
        trace!(cause, "reset settled");
    }
}

fn resolve_selection(date: Option<NaiveDate>, today: NaiveDate) -> (NaiveDate, bool) {
    match date {
        Some(date) => (date, false),
        None => {
            warn!(%today, "no selected date given, falling back to today");
            (today, true)
        }
    }
}
