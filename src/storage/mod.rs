//! Specialized containers.
//!
//! The `storage` module provides containers for use in other modules.
//! The containers live entirely in pre-allocated memory, without the `std`
//! and `alloc` crates being available.

mod pool;

pub use self::pool::{Handle, List, ListIter, Pool, PoolExhausted};
