use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Good/bad/skipped file counts for a crawl.
///
/// Each stage returns its own value; values are summed, never decremented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RunStatistics {
    pub good: u64,
    pub bad: u64,
    pub skipped: u64,
}

impl RunStatistics {
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.good + self.bad + self.skipped
    }

    pub const fn record_good(&mut self) {
        self.good += 1;
    }

    pub const fn record_bad(&mut self) {
        self.bad += 1;
    }

    pub const fn record_skipped(&mut self) {
        self.skipped += 1;
    }
}

impl Add for RunStatistics {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            good: self.good + rhs.good,
            bad: self.bad + rhs.bad,
            skipped: self.skipped + rhs.skipped,
        }
    }
}

impl AddAssign for RunStatistics {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for RunStatistics {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}
