//! RPL control plane of a storing-mode node. See [RFC 6550].
//!
//! [`Rpl`] dispatches the inbound control messages of a node, learns downward routes from the
//! DAOs it receives, and emits DIS, DIO, DAO and DAO-ACK messages. The objective function and
//! the trickle timers live behind the [`DagEngine`] trait, and messages leave the node through
//! a [`Transport`].
//!
//! [RFC 6550]: https://datatracker.ietf.org/doc/html/rfc6550

mod builder;
pub mod consts;
mod dag;
mod engine;
mod parents;
mod rank;
mod routes;

use core::fmt;

pub use self::builder::RplBuilder;
pub use self::dag::{Dag, DagHandle, DagSet, InstanceSelector};
pub use self::engine::{DagEngine, Transport};
pub use self::parents::{Parent, ParentSet};
pub use self::rank::Rank;
pub use self::routes::{LearnedFrom, RouteEntry, RouteState, RouteTable, RouteTableFull};

use super::neighbor::NeighborCache;
use crate::config::{RPL_MAX_ADDRESS_COUNT, RPL_MAX_MESSAGE_LEN};
use crate::storage::PoolExhausted;
use crate::time::Instant;
use crate::wire::{
    self, Ieee802154Address, Ipv6Address, Ipv6AddressExt, RplControlMessage, RplDaoAckRepr,
    RplDaoFlags, RplDaoRepr, RplDioRepr, RplDioTiming, RplDisRepr, RplMetricList,
    RplMetricPool, RplPacket, RplTarget, LINK_LOCAL_ALL_RPL_NODES,
};

/// Error returned while handling or emitting a RPL control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RplError {
    /// The message violates a length or field constraint.
    Malformed,
    /// The message belongs to a RPL instance this node does not run.
    UnknownInstance(u8),
    /// The metric pool has no free slot.
    PoolExhausted,
    /// The route table has no room for a new route.
    RouteTableFull,
    /// A DAO came from a parent with a better Rank than this node.
    LoopDetected,
    /// The ICMPv6 code is not a RPL control message.
    UnknownMessage(u8),
    /// The node has no global unicast address to advertise.
    NoGlobalAddress,
    /// The node joined no DAG.
    NotJoined,
    /// The message does not fit in a transmit buffer.
    MessageTooLong,
}

impl fmt::Display for RplError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RplError::Malformed => write!(f, "malformed message"),
            RplError::UnknownInstance(id) => write!(f, "unknown RPL instance {id}"),
            RplError::PoolExhausted => write!(f, "metric pool exhausted"),
            RplError::RouteTableFull => write!(f, "route table full"),
            RplError::LoopDetected => write!(f, "loop detected"),
            RplError::UnknownMessage(code) => write!(f, "unknown control message code {code}"),
            RplError::NoGlobalAddress => write!(f, "no global address"),
            RplError::NotJoined => write!(f, "not joined to a DAG"),
            RplError::MessageTooLong => write!(f, "message too long"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RplError {}

impl From<wire::Error> for RplError {
    fn from(_: wire::Error) -> Self {
        RplError::Malformed
    }
}

impl From<PoolExhausted> for RplError {
    fn from(_: PoolExhausted) -> Self {
        RplError::PoolExhausted
    }
}

impl From<RouteTableFull> for RplError {
    fn from(_: RouteTableFull) -> Self {
        RplError::RouteTableFull
    }
}

/// Counters of the messages a node could not handle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stats {
    pub malformed_msgs: u32,
    /// Metric pool or route table allocation failures.
    pub mem_overflows: u32,
    pub dao_loops: u32,
}

/// An inbound RPL control message.
#[derive(Debug)]
pub struct Inbound<'a> {
    pub src_addr: Ipv6Address,
    pub dst_addr: Ipv6Address,
    pub src_hw_addr: Ieee802154Address,
    /// ICMPv6 code.
    pub code: u8,
    /// ICMPv6 payload following the checksum.
    pub buffer: &'a [u8],
    /// Octets of `buffer` holding the message. Zero once the message was handled.
    pub len: usize,
    pub timestamp: Instant,
}

impl<'a> Inbound<'a> {
    pub fn new(
        src_addr: Ipv6Address,
        dst_addr: Ipv6Address,
        src_hw_addr: Ieee802154Address,
        code: u8,
        buffer: &'a [u8],
        timestamp: Instant,
    ) -> Self {
        Self {
            src_addr,
            dst_addr,
            src_hw_addr,
            code,
            buffer,
            len: buffer.len(),
            timestamp,
        }
    }

    /// Return the octets of the message that were not consumed yet.
    pub fn payload(&self) -> &'a [u8] {
        &self.buffer[..self.len.min(self.buffer.len())]
    }

    pub fn consume(&mut self) {
        self.len = 0;
    }

    pub fn is_consumed(&self) -> bool {
        self.len == 0
    }
}

/// The RPL control plane of a node.
#[derive(Debug)]
pub struct Rpl {
    addresses: heapless::Vec<Ipv6Address, RPL_MAX_ADDRESS_COUNT>,
    dao_ack_request: bool,
    dao_expiration_timeout: u32,
    dao_sequence: u8,
    dio_timing: RplDioTiming,
    dags: DagSet,
    routes: RouteTable,
    neighbors: NeighborCache,
    metric_pool: RplMetricPool,
    stats: Stats,
}

impl Rpl {
    /// Handle an inbound control message.
    ///
    /// The message is consumed whatever the outcome. Errors are counted in [`Stats`], except
    /// [`RplError::UnknownInstance`] and [`RplError::UnknownMessage`].
    pub fn process_control_message<E, T>(
        &mut self,
        engine: &mut E,
        tx: &mut T,
        inbound: &mut Inbound,
    ) -> Result<(), RplError>
    where
        E: DagEngine,
        T: Transport,
    {
        let result = match RplControlMessage::from(inbound.code) {
            RplControlMessage::DodagInformationSolicitation => {
                self.process_dis(engine, tx, inbound)
            }
            RplControlMessage::DodagInformationObject => self.process_dio(engine, inbound),
            RplControlMessage::DestinationAdvertisementObject => self.process_dao(tx, inbound),
            RplControlMessage::DestinationAdvertisementObjectAck => {
                self.process_dao_ack(inbound)
            }
            RplControlMessage::Unknown(code) => {
                net_debug!("unknown RPL control message code {}", code);
                Err(RplError::UnknownMessage(code))
            }
        };

        match result {
            Err(RplError::Malformed) => {
                net_debug!("malformed RPL message from {}", inbound.src_addr);
                self.stats.malformed_msgs = self.stats.malformed_msgs.saturating_add(1);
            }
            Err(RplError::PoolExhausted | RplError::RouteTableFull) => {
                self.stats.mem_overflows = self.stats.mem_overflows.saturating_add(1);
            }
            Err(RplError::LoopDetected) => {
                self.stats.dao_loops = self.stats.dao_loops.saturating_add(1);
            }
            _ => (),
        }

        inbound.consume();
        result
    }

    fn process_dis<E, T>(
        &mut self,
        engine: &mut E,
        tx: &mut T,
        inbound: &Inbound,
    ) -> Result<(), RplError>
    where
        E: DagEngine,
        T: Transport,
    {
        let packet = RplPacket::new_checked(
            inbound.payload(),
            RplControlMessage::DodagInformationSolicitation,
        )?;
        let dis = RplDisRepr::parse(&packet)?;
        net_trace!("received {} from {}", dis, inbound.src_addr);

        let Some(dag) = self.dags.find(InstanceSelector::Any) else {
            net_trace!("not joined, ignoring DIS");
            return Ok(());
        };

        if inbound.dst_addr.is_multicast() {
            net_trace!("multicast DIS, resetting DIO timer");
            engine.reset_dio_timer(&mut self.dags, dag);
            Ok(())
        } else {
            net_trace!("unicast DIS, replying to {}", inbound.src_addr);
            self.dio_output(engine, tx, dag, Some(inbound.src_addr))
        }
    }

    fn process_dio<E: DagEngine>(
        &mut self,
        engine: &mut E,
        inbound: &Inbound,
    ) -> Result<(), RplError> {
        if self
            .neighbors
            .lookup(&inbound.src_addr, inbound.timestamp)
            .is_none()
        {
            self.neighbors
                .fill(inbound.src_addr, inbound.src_hw_addr, inbound.timestamp);
        }

        let packet =
            RplPacket::new_checked(inbound.payload(), RplControlMessage::DodagInformationObject)?;
        let mut dio = RplDioRepr::parse(&packet)?;

        let result = dio.parse_options(&packet, &mut self.metric_pool);
        match result {
            Ok(()) => {
                if dio.metrics_truncated {
                    net_debug!("DIO metrics truncated to {} objects", dio.metrics.len());
                    self.stats.mem_overflows = self.stats.mem_overflows.saturating_add(1);
                }
                net_trace!("received {} from {}", dio, inbound.src_addr);
                engine.process_dio(
                    &mut self.dags,
                    &self.metric_pool,
                    inbound.src_addr,
                    &dio,
                    inbound.timestamp,
                );
            }
            Err(_) => net_debug!("malformed DIO sub-option from {}", inbound.src_addr),
        }

        dio.release(&mut self.metric_pool);
        result.map_err(RplError::from)
    }

    fn process_dao<T: Transport>(&mut self, tx: &mut T, inbound: &Inbound) -> Result<(), RplError> {
        let packet = RplPacket::new_checked(
            inbound.payload(),
            RplControlMessage::DestinationAdvertisementObject,
        )?;

        let instance_id = packet.rpl_instance_id();
        let Some(handle) = self.dags.find(InstanceSelector::Id(instance_id)) else {
            net_debug!("ignoring DAO of unknown RPL instance {}", instance_id);
            return Err(RplError::UnknownInstance(instance_id));
        };
        let dag = self
            .dags
            .get_mut(handle)
            .ok_or(RplError::UnknownInstance(instance_id))?;

        let dao = RplDaoRepr::parse(&packet)?;
        net_trace!("received {} from {}", dao, inbound.src_addr);

        let lifetime = dao.lifetime.unwrap_or(dag.config.default_lifetime);
        let prefix = dao.target.prefix;
        let prefix_len = dao.target.prefix_length;

        if lifetime == consts::ZERO_LIFETIME {
            if let Some(route) = self.routes.lookup_mut(prefix, prefix_len) {
                if route.state() == RouteState::Active {
                    route.saved_lifetime = Some(route.lifetime);
                    route.lifetime = self.dao_expiration_timeout;
                    net_trace!("withdrawn route {}", route);
                }
            }
            return Ok(());
        }

        let learned_from = if inbound.src_addr.is_multicast() {
            LearnedFrom::MulticastDao
        } else {
            LearnedFrom::UnicastDao
        };

        if learned_from == LearnedFrom::UnicastDao {
            // Both Ranks are compared under the DAG's current MinHopRankIncrease.
            let own_rank = dag.rank_of(dag.rank().raw_value());
            let infinite = dag.rank_of(consts::INFINITE_RANK);
            let min_hop_rank_increase = dag.config.min_hop_rank_increase;
            if let Some(parent) = dag.parents_mut().find_mut(inbound.src_addr) {
                if Rank::new(parent.rank().raw_value(), min_hop_rank_increase) < own_rank {
                    net_debug!(
                        "loop detected, DAO from parent {} with {}",
                        inbound.src_addr,
                        parent.rank()
                    );
                    parent.set_rank(infinite);
                    return Err(RplError::LoopDetected);
                }
            }
        }

        let route = self.routes.upsert(prefix, prefix_len, inbound.src_addr)?;
        route.lifetime = dag.route_lifetime(lifetime);
        route.learned_from = learned_from;
        net_trace!("route {} learned from {:?}", route, learned_from);

        if learned_from == LearnedFrom::UnicastDao {
            if let Some(parent) = dag.preferred_parent() {
                net_trace!("forwarding DAO to {}", parent);
                tx.send(
                    parent,
                    RplControlMessage::DestinationAdvertisementObject,
                    inbound.payload(),
                );
            } else if dao.flags.contains(RplDaoFlags::EXPECT_ACK) {
                let instance_id = dag.instance_id;
                self.dao_ack_output(tx, instance_id, inbound.src_addr, dao.sequence);
            }
        }

        Ok(())
    }

    fn process_dao_ack(&mut self, inbound: &Inbound) -> Result<(), RplError> {
        let packet = RplPacket::new_checked(
            inbound.payload(),
            RplControlMessage::DestinationAdvertisementObjectAck,
        )?;
        let ack = RplDaoAckRepr::parse(&packet)?;
        net_debug!("received {} from {}", ack, inbound.src_addr);
        Ok(())
    }

    /// Emit a DIS, to `dst` or to every RPL node on the link.
    pub fn dis_output<T: Transport>(&self, tx: &mut T, dst: Option<Ipv6Address>) {
        let repr = RplDisRepr;
        let mut buffer = [0u8; 2];
        let mut packet = RplPacket::new_unchecked(
            &mut buffer[..],
            RplControlMessage::DodagInformationSolicitation,
        );
        repr.emit(&mut packet);

        let dst = dst.unwrap_or(LINK_LOCAL_ALL_RPL_NODES);
        net_trace!("sending {} to {}", repr, dst);
        tx.send(
            dst,
            RplControlMessage::DodagInformationSolicitation,
            &buffer[..repr.buffer_len()],
        );
    }

    /// Emit a DIO for a DAG, to `dst` or to every RPL node on the link.
    ///
    /// The engine first updates the metrics of the DAG, if it has any. Every DIO carries a new
    /// DTSN.
    pub fn dio_output<E, T>(
        &mut self,
        engine: &mut E,
        tx: &mut T,
        dag: DagHandle,
        dst: Option<Ipv6Address>,
    ) -> Result<(), RplError>
    where
        E: DagEngine,
        T: Transport,
    {
        let dag = self.dags.get_mut(dag).ok_or(RplError::NotJoined)?;
        if !dag.metrics().is_empty() {
            engine.update_metric_container(dag);
        }

        let repr = RplDioRepr {
            rpl_instance_id: dag.instance_id,
            version_number: dag.version_number,
            rank: dag.rank().raw_value(),
            grounded: dag.grounded,
            mode_of_operation: dag.mode_of_operation,
            dodag_preference: dag.preference,
            dtsn: dag.next_dtsn_out(),
            dodag_id: dag.dodag_id,
            dag_config: Some(dag.config),
            prefix_info: dag.prefix_info,
            route_info: None,
            timing: self.dio_timing,
            metrics: RplMetricList::new(),
            metrics_truncated: false,
        };

        let len = repr.buffer_len(dag.metrics());
        if len > RPL_MAX_MESSAGE_LEN {
            net_debug!("DIO of {} octets does not fit", len);
            return Err(RplError::MessageTooLong);
        }

        let mut buffer = [0u8; RPL_MAX_MESSAGE_LEN];
        let mut packet = RplPacket::new_unchecked(
            &mut buffer[..len],
            RplControlMessage::DodagInformationObject,
        );
        repr.emit(&mut packet, dag.metrics())
            .map_err(|_| RplError::MessageTooLong)?;

        let dst = dst.unwrap_or(LINK_LOCAL_ALL_RPL_NODES);
        net_trace!("sending {} to {}", repr, dst);
        tx.send(dst, RplControlMessage::DodagInformationObject, &buffer[..len]);
        Ok(())
    }

    /// Advertise the global address of this node, to `parent` or to every RPL node on the link.
    pub fn dao_output<T: Transport>(
        &mut self,
        tx: &mut T,
        parent: Option<Ipv6Address>,
        lifetime: u8,
    ) -> Result<(), RplError> {
        let Some(address) = self.global_address() else {
            net_debug!("no global address, suppressing DAO");
            return Err(RplError::NoGlobalAddress);
        };

        let handle = parent
            .and_then(|parent| self.dags.find_parent(parent))
            .or_else(|| self.dags.find(InstanceSelector::Any))
            .ok_or(RplError::NotJoined)?;
        let dag = self.dags.get(handle).ok_or(RplError::NotJoined)?;

        self.dao_sequence = self.dao_sequence.wrapping_add(1);

        let mut flags = RplDaoFlags::empty();
        flags.set(RplDaoFlags::EXPECT_ACK, self.dao_ack_request);

        let repr = RplDaoRepr {
            rpl_instance_id: dag.instance_id,
            flags,
            sequence: self.dao_sequence,
            dodag_id: None,
            target: RplTarget {
                prefix_length: 128,
                prefix: address,
            },
            lifetime: Some(lifetime),
        };

        let len = repr.buffer_len();
        let mut buffer = [0u8; RPL_MAX_MESSAGE_LEN];
        let buffer = buffer.get_mut(..len).ok_or(RplError::MessageTooLong)?;
        let mut packet = RplPacket::new_unchecked(
            &mut buffer[..],
            RplControlMessage::DestinationAdvertisementObject,
        );
        repr.emit(&mut packet)?;

        let dst = parent.unwrap_or(LINK_LOCAL_ALL_RPL_NODES);
        net_trace!("sending {} to {}", repr, dst);
        tx.send(dst, RplControlMessage::DestinationAdvertisementObject, buffer);
        Ok(())
    }

    /// Acknowledge a DAO with status zero.
    pub fn dao_ack_output<T: Transport>(
        &self,
        tx: &mut T,
        instance_id: u8,
        dst: Ipv6Address,
        sequence: u8,
    ) {
        let repr = RplDaoAckRepr {
            instance_id,
            sequence,
            status: 0,
        };
        let mut buffer = [0u8; 4];
        let mut packet = RplPacket::new_unchecked(
            &mut buffer[..],
            RplControlMessage::DestinationAdvertisementObjectAck,
        );
        repr.emit(&mut packet);

        net_trace!("sending {} to {}", repr, dst);
        tx.send(
            dst,
            RplControlMessage::DestinationAdvertisementObjectAck,
            &buffer[..repr.buffer_len()],
        );
    }

    /// Set the timing values carried by the metric container of the next DIOs.
    pub fn set_dio_timing(&mut self, timing: RplDioTiming) {
        self.dio_timing = timing;
    }

    /// Age the downward routes by `elapsed` seconds, removing the expired ones.
    pub fn purge_routes(&mut self, elapsed: u32) {
        self.routes.purge(elapsed);
    }

    /// Return the first unicast address of this node that is not link-local.
    pub fn global_address(&self) -> Option<Ipv6Address> {
        self.addresses
            .iter()
            .copied()
            .find(|addr| addr.x_is_unicast() && !addr.is_link_local())
    }

    pub fn addresses(&self) -> &[Ipv6Address] {
        &self.addresses
    }

    /// Return the sequence number of the last DAO this node emitted.
    pub fn dao_sequence(&self) -> u8 {
        self.dao_sequence
    }

    pub fn dags(&self) -> &DagSet {
        &self.dags
    }

    pub fn dags_mut(&mut self) -> &mut DagSet {
        &mut self.dags
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn neighbors(&self) -> &NeighborCache {
        &self.neighbors
    }

    pub fn metric_pool(&self) -> &RplMetricPool {
        &self.metric_pool
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}
