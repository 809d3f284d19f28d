#![no_main]
use libfuzzer_sys::fuzz_target;
use smolrpl::iface::*;
use smolrpl::time::Instant;
use smolrpl::wire::*;

struct Sink;

impl Transport for Sink {
    fn send(&mut self, _dst_addr: Ipv6Address, _code: RplControlMessage, _body: &[u8]) {}
}

struct Engine;

impl DagEngine for Engine {
    fn process_dio(
        &mut self,
        _dags: &mut DagSet,
        pool: &RplMetricPool,
        _from: Ipv6Address,
        dio: &RplDioRepr,
        _received_at: Instant,
    ) {
        assert!(pool.iter(&dio.metrics).count() == dio.metrics.len());
    }

    fn reset_dio_timer(&mut self, _dags: &mut DagSet, _dag: DagHandle) {}

    fn update_metric_container(&mut self, _dag: &mut Dag) {}
}

#[derive(Debug, arbitrary::Arbitrary)]
struct RplPacketFuzzer<'a> {
    code: u8,
    data: &'a [u8],
    src_addr: [u8; 16],
    dst_addr: [u8; 16],
}

fuzz_target!(|data: RplPacketFuzzer| {
    let mut dag = Dag::new(0x1e, Ipv6Address::UNSPECIFIED);
    dag.joined = true;
    let mut rpl = RplBuilder::new()
        .add_address(Ipv6Address::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1))
        .set_dao_ack_request(true)
        .add_dag(dag)
        .finalize();

    let mut inbound = Inbound::new(
        Ipv6Address::from(data.src_addr),
        Ipv6Address::from(data.dst_addr),
        Ieee802154Address::BROADCAST,
        data.code,
        data.data,
        Instant::ZERO,
    );
    let _ = rpl.process_control_message(&mut Engine, &mut Sink, &mut inbound);

    assert!(inbound.is_consumed());
    assert!(rpl.metric_pool().is_empty());
});
