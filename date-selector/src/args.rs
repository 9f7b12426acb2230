//! Configuration for the date selector.

use std::time::Duration;

use derive_setters::Setters;

use crate::{error::SelectorError, px::Px};

/// How a new selected date coming from the parent affects the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case", tag = "kind"))]
pub enum ResetPolicy {
    /// Every change of the selected date rebuilds the window around it.
    #[default]
    Always,
    /// Rebuild only when the new date is missing from the window or lies
    /// within `margin_days` of either end. Otherwise only the highlight
    /// moves.
    OutsideComfortRange {
        /// Days that must remain on each side of the new selection.
        margin_days: u32,
    },
}

/// Arguments for [`DateSelectorController`](crate::DateSelectorController).
#[derive(Debug, Clone, PartialEq, Setters)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DateSelectorArgs {
    /// Days materialized before the selected date on (re)initialization.
    pub days_before: u32,
    /// Days materialized after the selected date on (re)initialization.
    pub days_after: u32,
    /// Days added per extension, in either direction.
    pub chunk_days: u32,
    /// Remaining items before an edge at which an extension is triggered.
    pub edge_threshold: usize,
    /// Width of one day cell.
    pub item_width: Px,
    /// Gap between successive day cells.
    pub item_spacing: Px,
    /// Number of extra items reported before/after the viewport.
    pub overscan: usize,
    /// Delay before the centering scroll of a reset is requested again.
    #[cfg_attr(feature = "serde", serde(with = "duration_millis"))]
    pub reset_retry_delay: Duration,
    /// How many times a scroll request the host failed to apply is retried.
    pub max_scroll_retries: u8,
    /// Reaction to a new selected date.
    pub reset_policy: ResetPolicy,
}

impl Default for DateSelectorArgs {
    fn default() -> Self {
        Self {
            days_before: 182,
            days_after: 182,
            chunk_days: 366,
            edge_threshold: 20,
            item_width: Px(48),
            item_spacing: Px(8),
            overscan: 2,
            reset_retry_delay: Duration::from_millis(100),
            max_scroll_retries: 3,
            reset_policy: ResetPolicy::Always,
        }
    }
}

impl DateSelectorArgs {
    /// Pixel distance between the leading edges of two neighbouring cells.
    pub fn item_stride(&self) -> Px {
        self.item_width.saturating_add(self.item_spacing)
    }

    /// Rejects configurations the scroll math cannot handle.
    pub fn validate(&self) -> Result<(), SelectorError> {
        if self.item_width.raw() <= 0 {
            return Err(SelectorError::InvalidArgs("item_width must be positive"));
        }
        if self.item_spacing.raw() < 0 {
            return Err(SelectorError::InvalidArgs(
                "item_spacing must not be negative",
            ));
        }
        if self.chunk_days == 0 {
            return Err(SelectorError::InvalidArgs("chunk_days must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_one_year_window() {
        let args = DateSelectorArgs::default();
        assert_eq!(args.days_before + args.days_after + 1, 365);
        assert_eq!(args.chunk_days, 366);
        assert_eq!(args.item_stride(), Px(56));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn setters_chain() {
        let args = DateSelectorArgs::default()
            .item_width(Px(40))
            .item_spacing(Px(0))
            .edge_threshold(5usize)
            .reset_policy(ResetPolicy::OutsideComfortRange { margin_days: 30 });
        assert_eq!(args.item_stride(), Px(40));
        assert_eq!(args.edge_threshold, 5);
    }

    #[test]
    fn validate_rejects_degenerate_values() {
        let zero_width = DateSelectorArgs::default().item_width(Px(0));
        assert_eq!(
            zero_width.validate(),
            Err(SelectorError::InvalidArgs("item_width must be positive"))
        );
        assert!(DateSelectorArgs::default().chunk_days(0u32).validate().is_err());
        assert!(
            DateSelectorArgs::default()
                .item_spacing(Px(-1))
                .validate()
                .is_err()
        );
    }
}
