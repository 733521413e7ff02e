use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Coverage counters for a single file or an aggregated directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub lines: u64,
    pub hits: u64,
    pub misses: u64,
    pub partials: u64,
}

impl Totals {
    pub fn new(lines: u64, hits: u64, misses: u64, partials: u64) -> Self {
        Self {
            lines,
            hits,
            misses,
            partials,
        }
    }

    /// Percentage of lines hit, `0.0` when there are no lines.
    pub fn coverage(&self) -> f64 {
        if self.lines > 0 {
            self.hits as f64 / self.lines as f64 * 100.0
        } else {
            0.0
        }
    }
}

impl AddAssign for Totals {
    fn add_assign(&mut self, other: Self) {
        self.lines += other.lines;
        self.hits += other.hits;
        self.misses += other.misses;
        self.partials += other.partials;
    }
}

impl Add for Totals {
    type Output = Totals;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl Sum for Totals {
    fn sum<I: Iterator<Item = Totals>>(iter: I) -> Self {
        iter.fold(Totals::default(), Add::add)
    }
}

impl<'a> Sum<&'a Totals> for Totals {
    fn sum<I: Iterator<Item = &'a Totals>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
