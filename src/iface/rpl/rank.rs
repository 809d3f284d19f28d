//! Implementation of the Rank comparison in RPL.
//!
//! A Rank can be thought of as a fixed-point number, where the position of the radix point
//! between the integer part and the fractional part is determined by `MinHopRankIncrease`.
//! `MinHopRankIncrease` is the minimum increase in Rank between a node and any of its DODAG
//! parents.
//! This value is provisioned by the DODAG root.
//!
//! When Rank is compared, the integer portion of the Rank is to be used.
//!
//! Meaning of the comparison:
//! - **Rank A is less than Rank B**: the node with Rank A is closer to the root than the node
//!   with Rank B.
//! - **Rank A is equal to Rank B**: both nodes are at the same distance from the root.
//! - **Rank A is greater than Rank B**: the node with Rank A is further away from the root.
//!
//! [RFC 6550 § 3.5.1]: https://datatracker.ietf.org/doc/html/rfc6550#section-3.5.1

use super::consts::{DEFAULT_MIN_HOP_RANK_INCREASE, INFINITE_RANK};

#[derive(Debug, Clone, Copy, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rank {
    pub(super) value: u16,
    pub(super) min_hop_rank_increase: u16,
}

impl core::fmt::Display for Rank {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Rank({})", self.dag_rank())
    }
}

impl Rank {
    pub const INFINITE: Self = Rank::new(INFINITE_RANK, DEFAULT_MIN_HOP_RANK_INCREASE);

    /// The ROOT_RANK is the smallest rank possible.
    /// DAG_RANK(ROOT_RANK) should be 1. See RFC6550 § 17.
    pub const ROOT: Self = Rank::new(DEFAULT_MIN_HOP_RANK_INCREASE, DEFAULT_MIN_HOP_RANK_INCREASE);

    /// Create a new Rank from some value and a `MinHopRankIncrease`.
    /// The `MinHopRankIncrease` is used for calculating the integer part for comparing to other
    /// Ranks. A `MinHopRankIncrease` of zero, which a peer may advertise, is taken as one.
    pub const fn new(value: u16, min_hop_rank_increase: u16) -> Self {
        Self {
            value,
            min_hop_rank_increase: if min_hop_rank_increase == 0 {
                1
            } else {
                min_hop_rank_increase
            },
        }
    }

    /// Return the integer part of the Rank.
    pub fn dag_rank(&self) -> u16 {
        self.value / self.min_hop_rank_increase
    }

    /// Return the raw Rank value.
    pub fn raw_value(&self) -> u16 {
        self.value
    }

    pub fn is_infinite(&self) -> bool {
        self.value == INFINITE_RANK
    }
}

impl PartialEq for Rank {
    fn eq(&self, other: &Self) -> bool {
        self.dag_rank() == other.dag_rank()
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        self.dag_rank().partial_cmp(&other.dag_rank())
    }
}
