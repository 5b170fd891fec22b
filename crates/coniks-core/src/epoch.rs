//! Epoch counter — a numbered interval between two consecutive PAD snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonically increasing epoch counter.
///
/// Epoch 0 is the directory's genesis epoch (see spec §3/§4.3: its STR's
/// `previous_str_hash` is random, identifying the directory itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Epoch(pub u64);

impl Epoch {
    /// The genesis epoch.
    pub const GENESIS: Epoch = Epoch(0);

    /// Construct an epoch from a raw counter value.
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The next epoch after this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Raw counter value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch#{}", self.0)
    }
}

impl From<u64> for Epoch {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Epoch> for u64 {
    fn from(epoch: Epoch) -> Self {
        epoch.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_increments() {
        assert_eq!(Epoch::new(5).next(), Epoch::new(6));
    }

    #[test]
    fn genesis_is_zero() {
        assert_eq!(Epoch::GENESIS, Epoch::new(0));
    }

    #[test]
    fn ordering() {
        assert!(Epoch::new(1) < Epoch::new(2));
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Epoch::new(7)), "epoch#7");
    }
}
