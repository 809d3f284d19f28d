/*! Low-level packet access and construction.

The `wire` module deals with the packet *representation* of RPL control messages. It
provides two levels of functionality.

 * First, it provides functions to extract fields from sequences of octets,
   and to insert fields into sequences of octets. This happens in the `Packet` family of
   structures, e.g. [RplPacket] or [RplOptionPacket].
 * Second, it provides a compact, high-level representation of message data that can be
   parsed from and emitted into a sequence of octets. This happens through the `Repr`
   family of structs, e.g. [RplDioRepr] or [RplDaoRepr].

A control message body is the ICMPv6 payload that follows the type, code and checksum
fields. The ICMPv6 type of every RPL control message is [ICMPV6_RPL]; the code is carried
next to the body as a [RplControlMessage].

The `Packet` family of data structures guarantees that, if the `Packet::check_len()` method
returned `Ok(())`, then no accessor or setter method will panic. When parsing untrusted
input, it is *necessary* to use `Packet::new_checked()`. The sub-option scanner never reads
past the end of the body: a sub-option whose length would run past it stops the scan with
an [Error].

# Examples

To emit a DAO-ACK body into an octet buffer, and then parse it back:

```rust
use smolrpl::wire::*;
let repr = RplDaoAckRepr {
    instance_id: 0x1e,
    sequence: 42,
    status: 0,
};
let mut buffer = vec![0; repr.buffer_len()];
{ // emission
    let mut packet = RplPacket::new_unchecked(
        &mut buffer[..],
        RplControlMessage::DestinationAdvertisementObjectAck,
    );
    repr.emit(&mut packet);
}
{ // parsing
    let packet = RplPacket::new_checked(
        &buffer[..],
        RplControlMessage::DestinationAdvertisementObjectAck,
    )
    .expect("truncated packet");
    let parsed = RplDaoAckRepr::parse(&packet).expect("malformed packet");
    assert_eq!(repr, parsed);
}
```
*/

use core::fmt;

mod field {
    pub type Field = ::core::ops::Range<usize>;
    pub type Rest = ::core::ops::RangeFrom<usize>;
}

pub mod ieee802154;
pub mod ipv6;
pub mod rpl;

pub use self::ieee802154::Address as Ieee802154Address;

pub use self::ipv6::{Address as Ipv6Address, LINK_LOCAL_ALL_RPL_NODES};
pub(crate) use self::ipv6::AddressExt as Ipv6AddressExt;

pub use self::rpl::{
    metric::{
        DioTiming as RplDioTiming, MetricContainer as RplMetricContainer,
        MetricList as RplMetricList, MetricPool as RplMetricPool, MetricType as RplMetricType,
        MetricValue as RplMetricValue,
    },
    options::{
        DagConfig as RplDagConfig, OptionType as RplOptionType,
        OptionsIterator as RplOptionsIterator, Packet as RplOptionPacket,
        PrefixInfo as RplPrefixInfo, RouteInfo as RplRouteInfo,
        SubOption as RplSubOption, Target as RplTarget, Transit as RplTransit,
    },
    DaoAckRepr as RplDaoAckRepr, DaoFlags as RplDaoFlags, DaoRepr as RplDaoRepr,
    DioRepr as RplDioRepr, DisRepr as RplDisRepr, ModeOfOperation as RplModeOfOperation,
    Packet as RplPacket, RplControlMessage, ICMPV6_RPL,
};

/// Parsing a packet failed.
///
/// Either it is malformed, or it is not supported by smolrpl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Error;

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wire::Error")
    }
}

pub type Result<T> = core::result::Result<T, Error>;
