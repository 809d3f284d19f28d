use smolrpl::iface::*;
use smolrpl::time::*;
use smolrpl::wire::{
    Ieee802154Address, Ipv6Address, RplControlMessage, RplDioRepr, RplDioTiming,
    RplMetricContainer, RplMetricPool,
};

/// Collects the messages a node sends until the simulation picks them up.
#[derive(Debug, Default)]
pub struct Outbox {
    pub queue: Vec<(Ipv6Address, RplControlMessage, Vec<u8>)>,
}

impl Transport for Outbox {
    fn send(&mut self, dst_addr: Ipv6Address, code: RplControlMessage, body: &[u8]) {
        self.queue.push((dst_addr, code, body.to_vec()));
    }
}

/// A minimal objective function.
///
/// The first DIO of an instance joins its DAG one hop below the sender. Once joined, only senders
/// with a better Rank become parents, and the parent with the best Rank is preferred.
#[derive(Debug, Default)]
pub struct Engine {
    pub dios: usize,
    pub timer_resets: usize,
    pub metric_updates: usize,
    pub last_received_at: Option<Instant>,
    pub last_timing: Option<RplDioTiming>,
    /// Metric objects of the last DIO.
    pub metrics: Vec<RplMetricContainer>,
    /// Metrics advertised in the DIOs of this node.
    pub advertised: Vec<RplMetricContainer>,
}

impl DagEngine for Engine {
    fn process_dio(
        &mut self,
        dags: &mut DagSet,
        pool: &RplMetricPool,
        from: Ipv6Address,
        dio: &RplDioRepr,
        received_at: Instant,
    ) {
        self.dios += 1;
        self.last_received_at = Some(received_at);
        self.last_timing = Some(dio.timing);
        self.metrics = pool.iter(&dio.metrics).copied().collect();

        let handle = match dags.find(InstanceSelector::Id(dio.rpl_instance_id)) {
            Some(handle) => handle,
            None => match dags.add(Dag::new(dio.rpl_instance_id, dio.dodag_id)) {
                Ok(handle) => handle,
                Err(_) => return,
            },
        };
        let Some(dag) = dags.get_mut(handle) else {
            return;
        };

        if let Some(config) = dio.dag_config {
            dag.config = config;
        }

        let rank = dag.rank_of(dio.rank);
        if dag.joined && rank >= dag.rank() {
            return;
        }
        dag.parents_mut().add(Parent::new(from, rank, dio.dtsn));

        if !dag.joined {
            dag.joined = true;
            dag.dodag_id = dio.dodag_id;
            dag.version_number = dio.version_number;
            dag.set_rank(dio.rank.saturating_add(dag.config.min_hop_rank_increase));
        }

        let best = dag
            .parents()
            .parents()
            .iter()
            .filter(|p| !p.rank().is_infinite())
            .min_by_key(|p| p.rank().dag_rank())
            .map(|p| p.address());
        dag.set_preferred_parent(best);
    }

    fn reset_dio_timer(&mut self, _dags: &mut DagSet, _dag: DagHandle) {
        self.timer_resets += 1;
    }

    fn update_metric_container(&mut self, dag: &mut Dag) {
        self.metric_updates += 1;
        for metric in &self.advertised {
            let _ = dag.set_metric(*metric);
        }
    }
}

#[derive(Debug)]
pub struct Node {
    pub id: usize,
    pub address: Ipv6Address,
    pub hardware_addr: Ieee802154Address,
    pub rpl: Rpl,
    pub engine: Engine,
    pub outbox: Outbox,
    /// Outcome of every message this node handled.
    pub results: Vec<Result<(), RplError>>,
}

impl Node {
    pub fn new(id: usize, builder: RplBuilder) -> Self {
        let address = Ipv6Address::new(0xfe80, 0, 0, 0, 0, 0, 0, id as u16 + 1);
        let hardware_addr = Ieee802154Address::Extended([0, 0, 0, 0, 0, 0, 0, id as u8 + 1]);
        Self {
            id,
            address,
            hardware_addr,
            rpl: builder.add_address(address).finalize(),
            engine: Engine::default(),
            outbox: Outbox::default(),
            results: vec![],
        }
    }

    /// Whether a message sent to `dst_addr` reaches this node.
    pub fn accepts(&self, dst_addr: Ipv6Address) -> bool {
        dst_addr.is_multicast() || self.rpl.addresses().contains(&dst_addr)
    }

    pub fn receive(
        &mut self,
        src_addr: Ipv6Address,
        src_hw_addr: Ieee802154Address,
        dst_addr: Ipv6Address,
        code: RplControlMessage,
        data: &[u8],
        now: Instant,
    ) -> Result<(), RplError> {
        let mut inbound = Inbound::new(src_addr, dst_addr, src_hw_addr, code.into(), data, now);
        let result =
            self.rpl
                .process_control_message(&mut self.engine, &mut self.outbox, &mut inbound);
        assert!(inbound.is_consumed());
        self.results.push(result);
        result
    }

    pub fn send_dis(&mut self, dst: Option<Ipv6Address>) {
        self.rpl.dis_output(&mut self.outbox, dst);
    }

    pub fn send_dio(&mut self, dst: Option<Ipv6Address>) -> Result<(), RplError> {
        let dag = self
            .rpl
            .dags()
            .find(InstanceSelector::Any)
            .ok_or(RplError::NotJoined)?;
        self.rpl
            .dio_output(&mut self.engine, &mut self.outbox, dag, dst)
    }

    pub fn send_dao(&mut self, lifetime: u8) -> Result<(), RplError> {
        let parent = self
            .rpl
            .dags()
            .find(InstanceSelector::Any)
            .and_then(|dag| self.rpl.dags().get(dag))
            .and_then(|dag| dag.preferred_parent());
        self.rpl.dao_output(&mut self.outbox, parent, lifetime)
    }
}
