use crate::config::RPL_MAX_ADDRESS_COUNT;
use crate::iface::neighbor::NeighborCache;
use crate::wire::{Ipv6Address, RplDioTiming, RplMetricPool};

use super::{consts, Dag, DagSet, RouteTable, Rpl, Stats};

#[derive(Debug)]
pub struct RplBuilder {
    addresses: heapless::Vec<Ipv6Address, RPL_MAX_ADDRESS_COUNT>,
    dao_ack_request: bool,
    dao_expiration_timeout: u32,
    dags: DagSet,
}

impl RplBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unicast address of the node.
    #[inline]
    pub fn add_address(mut self, address: Ipv6Address) -> Self {
        if self.addresses.push(address).is_err() {
            net_debug!("no room for address {}", address);
        }
        self
    }

    /// Set whether the DAOs of this node request a DAO-ACK.
    #[inline]
    pub fn set_dao_ack_request(mut self, dao_ack_request: bool) -> Self {
        self.dao_ack_request = dao_ack_request;
        self
    }

    /// Set how long, in seconds, a withdrawn route is kept.
    #[inline]
    pub fn set_dao_expiration_timeout(mut self, timeout: u32) -> Self {
        self.dao_expiration_timeout = timeout;
        self
    }

    /// Add a DAG the node takes part in.
    #[inline]
    pub fn add_dag(mut self, dag: Dag) -> Self {
        if self.dags.add(dag).is_err() {
            net_debug!("no room for another DAG");
        }
        self
    }

    /// Build the RPL node.
    pub fn finalize(self) -> Rpl {
        Rpl {
            addresses: self.addresses,
            dao_ack_request: self.dao_ack_request,
            dao_expiration_timeout: self.dao_expiration_timeout,
            dao_sequence: 0,
            dio_timing: RplDioTiming::default(),
            dags: self.dags,
            routes: RouteTable::new(),
            neighbors: NeighborCache::new(),
            metric_pool: RplMetricPool::new(),
            stats: Stats::default(),
        }
    }
}

impl Default for RplBuilder {
    fn default() -> Self {
        Self {
            addresses: heapless::Vec::new(),
            dao_ack_request: false,
            dao_expiration_timeout: consts::DAO_EXPIRATION_TIMEOUT,
            dags: DagSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let rpl = RplBuilder::new().finalize();
        assert!(rpl.addresses().is_empty());
        assert!(rpl.dags().is_empty());
        assert_eq!(rpl.global_address(), None);
        assert_eq!(rpl.dao_sequence(), 0);
    }

    #[test]
    fn global_address_skips_link_local() {
        let link_local = Ipv6Address::new(0xfe80, 0, 0, 0, 0, 0, 0, 1);
        let global = Ipv6Address::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1);

        let rpl = RplBuilder::new()
            .add_address(link_local)
            .add_address(global)
            .finalize();
        assert_eq!(rpl.addresses().len(), 2);
        assert_eq!(rpl.global_address(), Some(global));
    }

    #[test]
    fn add_dag() {
        let dag = Dag::new(consts::RPL_DEFAULT_INSTANCE, Ipv6Address::UNSPECIFIED);
        let rpl = RplBuilder::new().add_dag(dag).finalize();
        assert_eq!(rpl.dags().len(), 1);
        assert!(rpl
            .dags()
            .find(consts::RPL_DEFAULT_INSTANCE.into())
            .is_some());
    }
}
