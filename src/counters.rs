//! Right/wrong/ignored/exception tallies.
//!
//! Counters form a commutative monoid under [`Counters::merge`] with
//! [`Counters::default`] as the identity, which is what lets suite totals be
//! recomputed from leaves in any grouping.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Outcome tallies for one or more executed documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Counters {
    pub right: u32,
    pub wrong: u32,
    pub ignored: u32,
    pub exceptions: u32,
}

impl Counters {
    pub fn new(right: u32, wrong: u32, ignored: u32, exceptions: u32) -> Self {
        Self {
            right,
            wrong,
            ignored,
            exceptions,
        }
    }

    /// Counters for a document whose interpretation blew up.
    pub fn exception() -> Self {
        Self {
            exceptions: 1,
            ..Self::default()
        }
    }

    /// Returns the sum of both tallies.
    pub fn merge(self, other: Counters) -> Counters {
        Counters {
            right: self.right + other.right,
            wrong: self.wrong + other.wrong,
            ignored: self.ignored + other.ignored,
            exceptions: self.exceptions + other.exceptions,
        }
    }

    /// A result is successful when nothing was wrong and nothing blew up.
    /// `right` and `ignored` never affect the verdict.
    pub fn is_successful(&self) -> bool {
        self.wrong == 0 && self.exceptions == 0
    }

    pub fn total(&self) -> u32 {
        self.right + self.wrong + self.ignored + self.exceptions
    }
}

impl Add for Counters {
    type Output = Counters;

    fn add(self, rhs: Counters) -> Counters {
        self.merge(rhs)
    }
}

impl AddAssign for Counters {
    fn add_assign(&mut self, rhs: Counters) {
        *self = self.merge(rhs);
    }
}

impl Sum for Counters {
    fn sum<I: Iterator<Item = Counters>>(iter: I) -> Counters {
        iter.fold(Counters::default(), Counters::merge)
    }
}

impl<'a> Sum<&'a Counters> for Counters {
    fn sum<I: Iterator<Item = &'a Counters>>(iter: I) -> Counters {
        iter.copied().sum()
    }
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} right, {} wrong, {} ignored, {} exceptions",
            self.right, self.wrong, self.ignored, self.exceptions
        )
    }
}
