//! Physical pixel values used for scroll offsets and item strides.
//!
//! The selector never renders anything itself, but every scroll request it
//! emits and every offset the host reports is expressed in [`Px`]. Offsets
//! grow with the window, so the multiplication helpers saturate instead of
//! wrapping.
//!
//! # Example
//!
//! ```
//! use date_selector::px::Px;
//!
//! let stride = Px(48).saturating_add(Px(8));
//! assert_eq!(stride.saturating_mul_count(366), Px(20_496));
//! assert_eq!(Px(20_496).whole_strides(stride), 366);
//! ```

use std::ops::{Div, Mul};

/// A physical pixel value along the strip's main (horizontal) axis.
///
/// Negative values are allowed so hosts can report overscroll, but the
/// selector treats anything below zero as the very start of the strip.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Px(pub i32);

impl Px {
    /// Zero pixels.
    pub const ZERO: Self = Self(0);

    /// Returns the raw i32 value.
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Returns the value, or zero if negative.
    pub fn positive(self) -> u32 {
        if self.0 < 0 { 0 } else { self.0 as u32 }
    }

    pub fn saturating_add(self, rhs: Self) -> Self {
        Px(self.0.saturating_add(rhs.0))
    }

    pub fn saturating_sub(self, rhs: Self) -> Self {
        Px(self.0.saturating_sub(rhs.0))
    }

    /// Multiplies by an item count, saturating at `i32::MAX`.
    ///
    /// Used to turn an index or a chunk of days into a pixel extent.
    pub fn saturating_mul_count(self, count: usize) -> Self {
        let count = i32::try_from(count).unwrap_or(i32::MAX);
        Px(self.0.saturating_mul(count))
    }

    /// Number of whole `stride`s contained in `self`, clamped at zero.
    ///
    /// Returns zero when the stride is not positive.
    pub fn whole_strides(self, stride: Px) -> usize {
        if stride.0 <= 0 {
            return 0;
        }
        (self.positive() / stride.0 as u32) as usize
    }
}

impl Mul<i32> for Px {
    type Output = Px;

    fn mul(self, rhs: i32) -> Self::Output {
        Px(self.0 * rhs)
    }
}

impl Div<i32> for Px {
    type Output = Px;

    fn div(self, rhs: i32) -> Self::Output {
        Px(self.0 / rhs)
    }
}

impl std::fmt::Display for Px {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}px", self.0)
    }
}
