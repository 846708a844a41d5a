use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// A range between two numeric values, inclusive on both ends. Used for the
/// camera zoom bounds and anywhere else we need to keep a value between two
/// limits.
#[derive(
    Copy, Clone, Debug, Display, PartialEq, Serialize, Deserialize,
)]
#[display(fmt = "[{}, {}]", min, max)]
pub struct NumRange<T> {
    pub min: T,
    pub max: T,
}

impl<T: Copy + Debug + Display + PartialOrd> NumRange<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Check if a value is in this range. Ranges are inclusive on both ends.
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    /// Force a value into this range. If it's already in the range, return
    /// that value. If it's outside the range, return the bound (lower or upper)
    /// that's closest to the value.
    pub fn clamp(&self, value: T) -> T {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}
