use core::fmt;

use super::consts;
use super::parents::ParentSet;
use super::rank::Rank;
use crate::config::{RPL_MAX_INSTANCES, RPL_MAX_METRICS};
use crate::storage::PoolExhausted;
use crate::wire::{
    Ipv6Address, RplDagConfig, RplMetricContainer, RplMetricType, RplModeOfOperation,
    RplPrefixInfo,
};

/// An index into a [`DagSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DagHandle(usize);

impl DagHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Selects a DAG by RPL instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InstanceSelector {
    /// The first DAG this node joined, whatever its instance.
    Any,
    /// The DAG of the given RPL instance, joined or not.
    Id(u8),
}

impl From<u8> for InstanceSelector {
    fn from(id: u8) -> Self {
        Self::Id(id)
    }
}

impl Default for RplDagConfig {
    fn default() -> Self {
        Self {
            dio_interval_doublings: consts::DEFAULT_DIO_INTERVAL_DOUBLINGS,
            dio_interval_min: consts::DEFAULT_DIO_INTERVAL_MIN,
            dio_redundancy_constant: consts::DEFAULT_DIO_REDUNDANCY_CONSTANT,
            max_rank_increase: consts::DEFAULT_MAX_RANK_INCREASE,
            min_hop_rank_increase: consts::DEFAULT_MIN_HOP_RANK_INCREASE,
            objective_code_point: consts::DEFAULT_OBJECTIVE_CODE_POINT,
            default_lifetime: consts::DEFAULT_LIFETIME,
            lifetime_unit: consts::DEFAULT_LIFETIME_UNIT,
        }
    }
}

/// A DODAG this node takes part in.
#[derive(Debug)]
pub struct Dag {
    pub instance_id: u8,
    pub version_number: u8,
    pub dodag_id: Ipv6Address,
    pub grounded: bool,
    pub mode_of_operation: RplModeOfOperation,
    pub preference: u8,
    pub config: RplDagConfig,
    pub prefix_info: Option<RplPrefixInfo>,
    pub joined: bool,
    rank: Rank,
    dtsn_out: u8,
    metrics: heapless::Vec<RplMetricContainer, RPL_MAX_METRICS>,
    parents: ParentSet,
    preferred_parent: Option<Ipv6Address>,
}

impl Dag {
    /// Create a DAG with the default configuration and an infinite Rank.
    pub fn new(instance_id: u8, dodag_id: Ipv6Address) -> Self {
        Self {
            instance_id,
            version_number: 0,
            dodag_id,
            grounded: false,
            mode_of_operation: RplModeOfOperation::default(),
            preference: 0,
            config: RplDagConfig::default(),
            prefix_info: None,
            joined: false,
            rank: Rank::INFINITE,
            dtsn_out: 0,
            metrics: heapless::Vec::new(),
            parents: ParentSet::default(),
            preferred_parent: None,
        }
    }

    /// Return the Rank of this node in the DAG.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Set the raw Rank of this node, normalized with the DAG's `MinHopRankIncrease`.
    pub fn set_rank(&mut self, value: u16) {
        self.rank = Rank::new(value, self.config.min_hop_rank_increase);
    }

    /// Normalize a raw Rank advertised in this DAG.
    pub fn rank_of(&self, value: u16) -> Rank {
        Rank::new(value, self.config.min_hop_rank_increase)
    }

    /// Return the last DTSN this node advertised.
    pub fn dtsn_out(&self) -> u8 {
        self.dtsn_out
    }

    /// Increment the DTSN before it is advertised, and return it.
    pub fn next_dtsn_out(&mut self) -> u8 {
        self.dtsn_out = self.dtsn_out.wrapping_add(1);
        self.dtsn_out
    }

    /// Return the metrics advertised in this node's DIOs.
    pub fn metrics(&self) -> &[RplMetricContainer] {
        &self.metrics
    }

    /// Set the value of a metric, replacing a metric of the same type.
    ///
    /// A DAG holds at most one metric of each type, and so at most one latency metric.
    pub fn set_metric(&mut self, metric: RplMetricContainer) -> Result<(), PoolExhausted> {
        if let Some(m) = self
            .metrics
            .iter_mut()
            .find(|m| m.metric_type() == metric.metric_type())
        {
            *m = metric;
            return Ok(());
        }

        self.metrics.push(metric).map_err(|_| PoolExhausted)
    }

    pub fn remove_metric(&mut self, metric_type: RplMetricType) {
        self.metrics.retain(|m| m.metric_type() != metric_type);
    }

    pub fn parents(&self) -> &ParentSet {
        &self.parents
    }

    pub fn parents_mut(&mut self) -> &mut ParentSet {
        &mut self.parents
    }

    pub fn preferred_parent(&self) -> Option<Ipv6Address> {
        self.preferred_parent
    }

    pub fn set_preferred_parent(&mut self, parent: Option<Ipv6Address>) {
        self.preferred_parent = parent;
    }

    /// Return the lifetime, in seconds, of a route advertised with `lifetime` units.
    ///
    /// An infinite advertised lifetime gives `u32::MAX`, which route expiration never
    /// decrements.
    pub fn route_lifetime(&self, lifetime: u8) -> u32 {
        if lifetime == consts::INFINITE_LIFETIME {
            u32::MAX
        } else {
            u32::from(lifetime) * u32::from(self.config.lifetime_unit)
        }
    }
}

impl fmt::Display for Dag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DAG IID={} V={} DODAGID={} {}",
            self.instance_id, self.version_number, self.dodag_id, self.rank
        )
    }
}

/// The DAGs of a node, addressed by [`DagHandle`].
#[derive(Debug, Default)]
pub struct DagSet {
    dags: heapless::Vec<Dag, RPL_MAX_INSTANCES>,
}

impl DagSet {
    pub fn new() -> Self {
        Self {
            dags: heapless::Vec::new(),
        }
    }

    /// Add a DAG to the set.
    pub fn add(&mut self, dag: Dag) -> Result<DagHandle, PoolExhausted> {
        let handle = DagHandle(self.dags.len());
        self.dags.push(dag).map_err(|_| PoolExhausted)?;
        Ok(handle)
    }

    pub fn get(&self, handle: DagHandle) -> Option<&Dag> {
        self.dags.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: DagHandle) -> Option<&mut Dag> {
        self.dags.get_mut(handle.0)
    }

    /// Find a DAG by RPL instance.
    pub fn find(&self, selector: InstanceSelector) -> Option<DagHandle> {
        self.dags
            .iter()
            .position(|dag| match selector {
                InstanceSelector::Any => dag.joined,
                InstanceSelector::Id(id) => dag.instance_id == id,
            })
            .map(DagHandle)
    }

    /// Find the DAG in which `address` is a parent.
    pub fn find_parent(&self, address: Ipv6Address) -> Option<DagHandle> {
        self.dags
            .iter()
            .position(|dag| dag.parents.find(address).is_some())
            .map(DagHandle)
    }

    /// Return the handles of every DAG of the set.
    pub fn handles(&self) -> impl Iterator<Item = DagHandle> {
        (0..self.dags.len()).map(DagHandle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dag> {
        self.dags.iter()
    }

    pub fn len(&self) -> usize {
        self.dags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dags.is_empty()
    }
}
