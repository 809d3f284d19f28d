#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

//! The _smolrpl_ library implements the control plane of RPL, the IPv6 Routing Protocol for
//! Low-Power and Lossy Networks ([RFC 6550]), for event-driven, bare-metal systems.
//!
//! It covers the four RPL control messages (DIS, DIO, DAO and DAO-ACK), the sub-options nested
//! inside them, and the route-learning logic a storing-mode node runs when it receives a DAO.
//! It does not allocate: every table is bounded by a compile-time capacity.
//!
//! # The layers
//!
//! ## The wire layer
//! The `wire` module deals with the packet *representation*. A `Packet` wraps a buffer and
//! gives checked access to its fields, and a `Repr` is a high-level, owned description of a
//! message that can be parsed from and emitted into a buffer.
//!
//! ## The interface layer
//! The `iface` module holds the state of an RPL node: the DAGs it joined, its downward route
//! table, its neighbor cache and the metric container pool. The [`iface::Rpl`] engine takes
//! inbound control messages, updates that state and answers through a [`iface::Transport`].
//!
//! # Configuration
//!
//! Capacities are fixed at build time. Each can be overridden with an environment variable
//! named `SMOLRPL_<NAME>`, for example `SMOLRPL_RPL_ROUTE_TABLE_SIZE=64`:
//!
//! - `RPL_METRIC_POOL_SIZE`: metric container entries that can be decoded at once (6).
//! - `RPL_MAX_METRICS`: metric container entries a DAG advertises (6).
//! - `RPL_MAX_INSTANCES`: DAGs a node can be part of (1).
//! - `RPL_PARENTS_BUFFER_COUNT`: parents tracked per DAG (8).
//! - `RPL_ROUTE_TABLE_SIZE`: downward routes (16).
//! - `RPL_NEIGHBOR_CACHE_SIZE`: neighbor cache entries (16).
//! - `RPL_MAX_ADDRESS_COUNT`: unicast addresses of the node (4).
//! - `RPL_MAX_MESSAGE_LEN`: largest control message body that is emitted (256).
//!
//! [RFC 6550]: https://datatracker.ietf.org/doc/html/rfc6550

#[cfg(all(feature = "log", feature = "defmt"))]
compile_error!("You must enable at most one of the following features: log, defmt");

#[macro_use]
mod macros;

#[allow(unused)]
mod config {
    #![allow(unused)]
    include!(concat!(env!("OUT_DIR"), "/config.rs"));
}

pub mod iface;
pub mod storage;
pub mod time;
pub mod wire;
