use heapless::LinearMap;

use crate::config::RPL_NEIGHBOR_CACHE_SIZE;
use crate::time::{Duration, Instant};
use crate::wire::{Ieee802154Address, Ipv6Address};

/// A cached neighbor.
///
/// A neighbor mapping translates from an IPv6 address to a link-layer address,
/// and contains the timestamp past which the mapping should be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Neighbor {
    hardware_addr: Ieee802154Address,
    expires_at: Instant,
}

impl Neighbor {
    pub fn hardware_addr(&self) -> Ieee802154Address {
        self.hardware_addr
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }
}

/// A neighbor cache backed by a fixed-capacity map.
///
/// When the cache is full, filling a new neighbor evicts the entry that expires first.
#[derive(Debug, Default)]
pub struct NeighborCache {
    storage: LinearMap<Ipv6Address, Neighbor, RPL_NEIGHBOR_CACHE_SIZE>,
}

impl NeighborCache {
    /// Neighbor entry lifetime.
    pub const ENTRY_LIFETIME: Duration = Duration::from_secs(30);

    pub fn new() -> Self {
        Self {
            storage: LinearMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn fill(
        &mut self,
        protocol_addr: Ipv6Address,
        hardware_addr: Ieee802154Address,
        timestamp: Instant,
    ) {
        let neighbor = Neighbor {
            expires_at: timestamp + Self::ENTRY_LIFETIME,
            hardware_addr,
        };

        match self.storage.insert(protocol_addr, neighbor) {
            Ok(Some(old_neighbor)) => {
                if old_neighbor.hardware_addr != hardware_addr {
                    net_trace!(
                        "replaced {} => {} (was {})",
                        protocol_addr,
                        hardware_addr,
                        old_neighbor.hardware_addr
                    );
                }
            }
            Ok(None) => {
                net_trace!("filled {} => {} (was empty)", protocol_addr, hardware_addr);
            }
            Err((protocol_addr, neighbor)) => {
                // The storage is full, evict the entry that expires first.
                let oldest = self
                    .storage
                    .iter()
                    .min_by_key(|(_, neighbor)| neighbor.expires_at)
                    .map(|(addr, _)| *addr);

                if let Some(old_protocol_addr) = oldest {
                    self.storage.remove(&old_protocol_addr);
                    if self.storage.insert(protocol_addr, neighbor).is_ok() {
                        net_trace!(
                            "filled {} => {} (evicted {})",
                            protocol_addr,
                            hardware_addr,
                            old_protocol_addr
                        );
                        return;
                    }
                }

                net_debug!("neighbor cache has no room for {}", protocol_addr);
            }
        }
    }

    /// Return the link-layer address of a neighbor that has not expired.
    pub fn lookup(
        &self,
        protocol_addr: &Ipv6Address,
        timestamp: Instant,
    ) -> Option<Ieee802154Address> {
        match self.storage.get(protocol_addr) {
            Some(neighbor) if timestamp < neighbor.expires_at => Some(neighbor.hardware_addr),
            _ => None,
        }
    }

    /// Remove every expired entry.
    pub fn flush_expired(&mut self, timestamp: Instant) {
        let mut expired: heapless::Vec<Ipv6Address, RPL_NEIGHBOR_CACHE_SIZE> = heapless::Vec::new();
        for (addr, neighbor) in self.storage.iter() {
            if neighbor.expires_at <= timestamp {
                // Cannot overflow, both have the same capacity.
                let _ = expired.push(*addr);
            }
        }

        for addr in expired {
            net_trace!("expired {}", addr);
            self.storage.remove(&addr);
        }
    }
}
