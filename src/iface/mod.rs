/*! RPL node state.

The `iface` module deals with the state of an RPL node. It dispatches inbound control
messages, learns downward routes, and caches the link-layer addresses of neighbors.
*/

mod neighbor;
pub mod rpl;

pub use self::neighbor::{Neighbor, NeighborCache};
pub use self::rpl::{
    Dag, DagEngine, DagHandle, DagSet, Inbound, InstanceSelector, LearnedFrom, Parent, ParentSet,
    Rank, RouteEntry, RouteState, RouteTable, RouteTableFull, Rpl, RplBuilder, RplError, Stats,
    Transport,
};
