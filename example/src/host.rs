//! A stand-in for a real horizontal list view.
//!
//! It keeps an offset and a laid-out content extent, reports content-size
//! changes one frame after the window grows (the way a real layout pass
//! lags behind state changes) and refuses scroll requests until its first
//! few frames have been measured.

use std::time::Instant;

use date_selector::{SharedDateSelector, px::Px};
use tracing::{debug, trace};

pub struct SimulatedRow {
    viewport: Px,
    offset: Px,
    laid_out_extent: Px,
    unmeasured_frames: u32,
}

impl SimulatedRow {
    pub fn new(viewport: Px, unmeasured_frames: u32) -> Self {
        Self {
            viewport,
            offset: Px::ZERO,
            laid_out_extent: Px::ZERO,
            unmeasured_frames,
        }
    }

    pub fn offset(&self) -> Px {
        self.offset
    }

    /// Finger drag by `delta` pixels. Negative values move toward earlier
    /// days.
    pub fn drag(&mut self, strip: &SharedDateSelector, delta: Px) {
        self.offset = self.clamp(self.offset.saturating_add(delta));
        let offset = self.offset;
        strip.with_mut(|strip| strip.on_scroll(offset));
    }

    /// One rendered frame: layout pass, frame tick, then pending scrolls.
    pub fn frame(&mut self, strip: &SharedDateSelector, now: Instant) {
        let extent = strip.with(|strip| {
            let args = strip.args();
            laid_out_extent(strip.window().len(), args.item_width, args.item_spacing)
        });
        if extent != self.laid_out_extent {
            trace!(%extent, "layout committed");
            self.laid_out_extent = extent;
            strip.with_mut(|strip| strip.on_content_size_changed(extent));
        }

        if self.unmeasured_frames > 0 {
            self.unmeasured_frames -= 1;
            if self.unmeasured_frames == 0 {
                strip.with_mut(|strip| strip.on_layout_ready());
            }
        }

        strip.with_mut(|strip| strip.on_frame(now));
        self.apply_requests(strip);
    }

    /// Index of the cell under the middle of the viewport.
    pub fn center_index(&self, strip: &SharedDateSelector) -> usize {
        let stride = strip.with(|strip| strip.args().item_stride());
        self.offset
            .saturating_add(self.viewport / 2)
            .whole_strides(stride)
    }

    /// Text rendering of the visible cells; the selected day is bracketed.
    pub fn render(&self, strip: &SharedDateSelector) -> String {
        strip.with(|strip| {
            let items = strip.visible_items(self.viewport);
            let month = items
                .first()
                .map(|item| item.month_label())
                .unwrap_or_default();
            let cells: Vec<String> = items
                .iter()
                .map(|item| {
                    let cell = format!("{} {:>2}", item.weekday_label(), item.day_label());
                    if item.selected {
                        format!("[{cell}]")
                    } else if item.is_today {
                        format!("*{cell}*")
                    } else {
                        format!(" {cell} ")
                    }
                })
                .collect();
            format!(
                "{month:<9}|{}| window {}..={} ({} days)",
                cells.join(""),
                strip.window().start(),
                strip.window().end(),
                strip.window().len()
            )
        })
    }

    fn apply_requests(&mut self, strip: &SharedDateSelector) {
        let requests = strip.with_mut(|strip| strip.take_scroll_requests());
        for request in requests {
            if self.unmeasured_frames > 0 {
                debug!(reason = ?request.reason, "layout not measured, scroll rejected");
                strip.with_mut(|strip| strip.scroll_failed(request));
                continue;
            }
            self.offset = self.clamp(request.offset);
            let offset = self.offset;
            strip.with_mut(|strip| strip.on_scroll(offset));
        }
    }

    fn clamp(&self, offset: Px) -> Px {
        let max = self.laid_out_extent.saturating_sub(self.viewport).max(Px::ZERO);
        offset.max(Px::ZERO).min(max)
    }
}

/// Sum of the children of a lazy row: no spacing after the last cell.
fn laid_out_extent(len: usize, item_width: Px, item_spacing: Px) -> Px {
    if len == 0 {
        return Px::ZERO;
    }
    item_width
        .saturating_mul_count(len)
        .saturating_add(item_spacing.saturating_mul_count(len - 1))
}
