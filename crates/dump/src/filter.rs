use crate::types::Goroutine;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Keeps goroutines whose blocked duration lies within optional bounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationFilter {
    /// Minimum blocked duration (inclusive)
    pub min: Option<Duration>,

    /// Maximum blocked duration (inclusive)
    pub max: Option<Duration>,
}

impl DurationFilter {
    pub fn new(min: Option<Duration>, max: Option<Duration>) -> Self {
        Self { min, max }
    }

    pub fn includes_all(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn includes(&self, goroutine: &Goroutine) -> bool {
        if self.min.is_some_and(|min| goroutine.duration < min) {
            return false;
        }
        if self.max.is_some_and(|max| goroutine.duration > max) {
            return false;
        }
        true
    }

    /// Returns the kept goroutines, in input order, and the number skipped
    pub fn apply(&self, goroutines: Vec<Goroutine>) -> (Vec<Goroutine>, usize) {
        if self.includes_all() {
            return (goroutines, 0);
        }
        let total = goroutines.len();
        let kept: Vec<Goroutine> = goroutines
            .into_iter()
            .filter(|g| self.includes(g))
            .collect();
        let skipped = total - kept.len();
        (kept, skipped)
    }
}
