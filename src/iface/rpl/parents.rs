use crate::wire::Ipv6Address;

use super::rank::Rank;
use crate::config::RPL_PARENTS_BUFFER_COUNT;

/// A DODAG parent candidate, as learned from its DIOs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Parent {
    address: Ipv6Address,
    rank: Rank,
    dtsn: u8,
    updated: bool,
}

impl Parent {
    /// Create a new parent.
    pub fn new(address: Ipv6Address, rank: Rank, dtsn: u8) -> Self {
        Self {
            address,
            rank,
            dtsn,
            updated: false,
        }
    }

    pub fn address(&self) -> Ipv6Address {
        self.address
    }

    /// Return the Rank of the parent.
    pub fn rank(&self) -> &Rank {
        &self.rank
    }

    /// Return the last DTSN heard from the parent.
    pub fn dtsn(&self) -> u8 {
        self.dtsn
    }

    /// Whether the parent changed since the objective function last looked at it.
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    /// Set the Rank of the parent, and flag it as updated.
    pub fn set_rank(&mut self, rank: Rank) {
        self.rank = rank;
        self.updated = true;
    }

    pub fn clear_updated(&mut self) {
        self.updated = false;
    }
}

#[derive(Debug, Default)]
pub struct ParentSet {
    parents: heapless::Vec<Parent, { RPL_PARENTS_BUFFER_COUNT }>,
}

impl ParentSet {
    /// Add a new parent to the parent set. The Rank of the new parent should be lower than the
    /// Rank of the node that holds this parent set.
    ///
    /// When the set is full, the new parent replaces the worst parent if its Rank is better.
    pub fn add(&mut self, parent: Parent) {
        if let Some(p) = self.find_mut(parent.address) {
            // Update information
            *p = parent;
        } else if let Err(parent) = self.parents.push(parent) {
            match self.worst_parent() {
                Some(worst) if worst.rank().dag_rank() > parent.rank().dag_rank() => {
                    net_trace!("parent {} replaces {}", parent.address, worst.address);
                    *worst = parent;
                }
                _ => net_debug!("could not add parent {}", parent.address),
            }
        }
    }

    /// Remove a parent from the set.
    pub fn remove(&mut self, address: Ipv6Address) -> Option<Parent> {
        let index = self.parents.iter().position(|p| p.address == address)?;
        Some(self.parents.swap_remove(index))
    }

    /// Find a parent based on its address.
    pub fn find(&self, address: Ipv6Address) -> Option<&Parent> {
        self.parents.iter().find(|p| p.address == address)
    }

    /// Find a mutable parent based on its address.
    pub fn find_mut(&mut self, address: Ipv6Address) -> Option<&mut Parent> {
        self.parents.iter_mut().find(|p| p.address == address)
    }

    /// Return a slice to the parent set.
    pub fn parents(&self) -> &[Parent] {
        &self.parents
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Find the worst parent that is currently in the parent set.
    fn worst_parent(&mut self) -> Option<&mut Parent> {
        self.parents
            .iter_mut()
            .max_by_key(|p| p.rank.dag_rank())
    }
}
