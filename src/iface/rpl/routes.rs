use core::fmt;

use crate::config::RPL_ROUTE_TABLE_SIZE;
use crate::wire::{Ipv6Address, Ipv6AddressExt};

/// The route table has no room left for a new route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RouteTableFull;

impl fmt::Display for RouteTableFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "route table full")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RouteTableFull {}

/// How a downward route was learned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LearnedFrom {
    /// From a DAO sent to this node's unicast address.
    UnicastDao,
    /// From a DAO sent to a multicast address.
    MulticastDao,
}

/// The lifecycle state of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RouteState {
    Active,
    /// The target was withdrawn; the route lives on for the expiration timeout.
    PendingExpiry,
}

/// A downward route towards a DAO target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RouteEntry {
    pub prefix: Ipv6Address,
    pub prefix_len: u8,
    pub next_hop: Ipv6Address,
    /// Remaining lifetime in seconds. `u32::MAX` never expires.
    pub lifetime: u32,
    /// The lifetime the route had when its target was withdrawn.
    pub saved_lifetime: Option<u32>,
    pub learned_from: LearnedFrom,
}

impl RouteEntry {
    pub fn state(&self) -> RouteState {
        match self.saved_lifetime {
            None => RouteState::Active,
            Some(_) => RouteState::PendingExpiry,
        }
    }
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} via {} lifetime={}",
            self.prefix, self.prefix_len, self.next_hop, self.lifetime
        )?;
        if self.state() == RouteState::PendingExpiry {
            write!(f, " (withdrawn)")?;
        }
        Ok(())
    }
}

/// The downward routes of a storing-mode node.
///
/// Routes are keyed by their masked prefix and prefix length; lookups are exact.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: heapless::Vec<RouteEntry, RPL_ROUTE_TABLE_SIZE>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            routes: heapless::Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.iter()
    }

    pub fn lookup(&self, prefix: Ipv6Address, prefix_len: u8) -> Option<&RouteEntry> {
        let prefix = prefix.masked(prefix_len);
        self.routes
            .iter()
            .find(|r| r.prefix_len == prefix_len && r.prefix == prefix)
    }

    pub fn lookup_mut(&mut self, prefix: Ipv6Address, prefix_len: u8) -> Option<&mut RouteEntry> {
        let prefix = prefix.masked(prefix_len);
        self.routes
            .iter_mut()
            .find(|r| r.prefix_len == prefix_len && r.prefix == prefix)
    }

    /// Return the route to `prefix`, adding one if there is none.
    ///
    /// The route is made active again, and goes through `next_hop`. A new route has a zero
    /// lifetime and is learned from a unicast DAO until the caller sets otherwise.
    pub fn upsert(
        &mut self,
        prefix: Ipv6Address,
        prefix_len: u8,
        next_hop: Ipv6Address,
    ) -> Result<&mut RouteEntry, RouteTableFull> {
        let prefix = prefix.masked(prefix_len);
        let index = match self
            .routes
            .iter()
            .position(|r| r.prefix_len == prefix_len && r.prefix == prefix)
        {
            Some(index) => index,
            None => {
                let route = RouteEntry {
                    prefix,
                    prefix_len,
                    next_hop,
                    lifetime: 0,
                    saved_lifetime: None,
                    learned_from: LearnedFrom::UnicastDao,
                };
                self.routes.push(route).map_err(|_| RouteTableFull)?;
                net_trace!("added route {}/{} via {}", prefix, prefix_len, next_hop);
                self.routes.len() - 1
            }
        };

        let route = &mut self.routes[index];
        route.next_hop = next_hop;
        route.saved_lifetime = None;
        Ok(route)
    }

    pub fn remove(&mut self, prefix: Ipv6Address, prefix_len: u8) -> Option<RouteEntry> {
        let prefix = prefix.masked(prefix_len);
        let index = self
            .routes
            .iter()
            .position(|r| r.prefix_len == prefix_len && r.prefix == prefix)?;
        Some(self.routes.swap_remove(index))
    }

    /// Age every route by `elapsed` seconds, and remove the routes that expired.
    pub fn purge(&mut self, elapsed: u32) {
        for route in self.routes.iter_mut() {
            if route.lifetime != u32::MAX {
                route.lifetime = route.lifetime.saturating_sub(elapsed);
            }
        }

        self.routes.retain(|route| {
            if route.lifetime == 0 {
                net_debug!("route {} expired", route);
                false
            } else {
                true
            }
        });
    }
}
