//! Gap-based order keys.
//!
//! Siblings carry sparse integer keys. Inserting between two neighbours takes
//! their midpoint, so a move rewrites one record. When repeated bisection
//! leaves no integer strictly between two neighbours the allocator reports
//! [`JobtreeError::AllocationExhausted`] and the caller re-spaces the sibling
//! list with [`PositionAllocator::renumber`].

use crate::config::PositioningConfig;
use crate::error::{JobtreeError, Result};
use crate::task::Position;

/// Computes new order keys. Pure: identical inputs give identical keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionAllocator {
    gap: i64,
    default_position: i64,
    min_position: i64,
}

impl Default for PositionAllocator {
    fn default() -> Self {
        Self::from(&PositioningConfig::default())
    }
}

impl From<&PositioningConfig> for PositionAllocator {
    fn from(config: &PositioningConfig) -> Self {
        Self {
            gap: config.gap,
            default_position: config.default_position,
            min_position: config.min_position,
        }
    }
}

impl PositionAllocator {
    pub fn new(config: &PositioningConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from(config))
    }

    pub fn gap(&self) -> i64 {
        self.gap
    }

    /// Returns a key strictly between `prev` and `next`.
    ///
    /// A missing bound means the list end on that side:
    /// - no neighbours: the configured default key
    /// - only `next`: `next - gap`, shrinking toward `min_position` when there
    ///   is no room for a full gap
    /// - only `prev`: `prev + gap`
    /// - both: the midpoint
    pub fn allocate(&self, prev: Option<Position>, next: Option<Position>) -> Result<Position> {
        let exhausted = || JobtreeError::AllocationExhausted {
            prev: prev.map(Position::value),
            next: next.map(Position::value),
        };

        match (prev, next) {
            (None, None) => Ok(Position::new(self.default_position)),
            (None, Some(next)) => {
                let next = next.value();
                if next <= self.min_position {
                    return Err(exhausted());
                }
                match next.checked_sub(self.gap) {
                    Some(key) if key >= self.min_position => Ok(Position::new(key)),
                    _ => midpoint(self.min_position, next)
                        .map(Position::new)
                        .ok_or_else(exhausted),
                }
            }
            (Some(prev), None) => prev
                .value()
                .checked_add(self.gap)
                .map(Position::new)
                .ok_or_else(exhausted),
            (Some(prev), Some(next)) => midpoint(prev.value(), next.value())
                .filter(|key| *key > prev.value())
                .map(Position::new)
                .ok_or_else(exhausted),
        }
    }

    /// Evenly spaced keys for a sibling list of `count` entries, in order.
    pub fn renumber(&self, count: usize) -> Result<Vec<Position>> {
        (1..=count)
            .map(|step| {
                i64::try_from(step)
                    .ok()
                    .and_then(|step| self.gap.checked_mul(step))
                    .and_then(|offset| self.min_position.checked_add(offset))
                    .map(Position::new)
                    .ok_or(JobtreeError::AllocationExhausted {
                        prev: None,
                        next: None,
                    })
            })
            .collect()
    }
}

/// Floor midpoint of `low` and `high`, or `None` when nothing fits strictly
/// below `high`.
fn midpoint(low: i64, high: i64) -> Option<i64> {
    if low >= high {
        return None;
    }
    let mid = (i128::from(low) + i128::from(high)).div_euclid(2);
    let mid = i64::try_from(mid).ok()?;
    (mid < high).then_some(mid)
}
