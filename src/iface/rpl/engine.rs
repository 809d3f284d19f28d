//! The collaborators an [`Rpl`](super::Rpl) node drives.

use super::dag::{Dag, DagHandle, DagSet};
use crate::time::Instant;
use crate::wire::{Ipv6Address, RplControlMessage, RplDioRepr, RplMetricPool};

/// The ICMPv6 send primitive.
///
/// The ICMPv6 type of every message handed to a transport is [`ICMPV6_RPL`], and `body` is
/// the ICMPv6 payload following the checksum. Computing the checksum is up to the transport.
///
/// [`ICMPV6_RPL`]: crate::wire::ICMPV6_RPL
pub trait Transport {
    fn send(&mut self, dst_addr: Ipv6Address, code: RplControlMessage, body: &[u8]);
}

/// The objective function and DAG maintenance logic of a node.
pub trait DagEngine {
    /// Handle a well-formed DIO received from `from` at `received_at`.
    ///
    /// The metric objects of `dio` live in `pool`; they are released once this returns.
    fn process_dio(
        &mut self,
        dags: &mut DagSet,
        pool: &RplMetricPool,
        from: Ipv6Address,
        dio: &RplDioRepr,
        received_at: Instant,
    );

    /// Reset the DIO trickle timer of a DAG.
    fn reset_dio_timer(&mut self, dags: &mut DagSet, dag: DagHandle);

    /// Recompute the metrics a DAG advertises, right before a DIO is emitted.
    ///
    /// A DAG that advertises no metrics is left alone.
    fn update_metric_container(&mut self, dag: &mut Dag);
}
