//! DAG Metric Container sub-option. See [RFC 6551].
//!
//! The container carries DIO timing information followed by a sequence of metric objects.
//! Decoded objects are appended to a [`MetricList`] allocated from a bounded [`MetricPool`];
//! whoever decodes a container owns the list and must hand it back with
//! [`Pool::free_list`](crate::storage::Pool::free_list).
//!
//! ```txt
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |   Type = 0x02 | Option Length |                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               +
//! |              DIO delay, next DIO time, next DIO delay         |
//! +                               +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                               |         Metric objects...
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! [RFC 6551]: https://datatracker.ietf.org/doc/html/rfc6551

use byteorder::{ByteOrder, NetworkEndian};
use core::fmt;

use crate::config::RPL_METRIC_POOL_SIZE;
use crate::storage::{List, Pool};
use crate::wire::{Error, Result};

enum_with_unknown! {
    /// Routing metric object types. See [RFC 6551 § 6].
    ///
    /// [RFC 6551 § 6]: https://datatracker.ietf.org/doc/html/rfc6551#section-6
    pub enum MetricType(u8) {
        NodeState = 1,
        NodeEnergy = 2,
        HopCount = 3,
        Throughput = 4,
        Latency = 5,
        LinkQuality = 6,
        Etx = 7,
        LinkColor = 8,
    }
}

mod field {
    use crate::wire::field::*;

    // Container payload.
    pub const DIO_DELAY: Field = 0..4;
    pub const NEXT_DIO_TIME: Field = 4..8;
    pub const NEXT_DIO_DELAY: Field = 8..12;
    pub const OBJECTS: usize = 12;

    // Metric object, relative to its start.
    pub const TYPE: usize = 0;
    pub const FLAGS_HIGH: usize = 1;
    pub const FLAGS_LOW: usize = 2;
    pub const LENGTH: usize = 3;
    pub const VALUE: usize = 4;
}

/// Bit layout of the two flag octets of a metric object header.
///
/// ```txt
///  FLAGS_HIGH      FLAGS_LOW
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  flags[8..1]  |f|-|A A|P P P P|
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// `f` is bit 0 of the 9-bit flags field, `A` the aggregation mode and `P` the precedence.
pub mod layout {
    pub const FLAGS_MASK: u16 = 0x01ff;
    pub const FLAGS_HIGH_SHIFT: u32 = 1;
    pub const FLAGS_LOW_SHIFT: u32 = 7;
    pub const FLAGS_LOW_MASK: u16 = 0b1;
    pub const AGGREGATION_SHIFT: u32 = 4;
    pub const AGGREGATION_MASK: u8 = 0b11;
    pub const PRECEDENCE_MASK: u8 = 0b1111;
}

/// Octets reserved at the end of a container; objects never start inside them.
pub const RESERVED_TRAILER: usize = 2;

/// Pool every decoded metric object is allocated from.
pub type MetricPool = Pool<MetricContainer, RPL_METRIC_POOL_SIZE>;

/// Decoded metric objects, in wire order, living in a [`MetricPool`].
pub type MetricList = List;

/// The value of a metric object.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MetricValue {
    Energy(u16),
    Throughput(u16),
    Etx(u16),
    LinkQuality(u16),
    HopCount(u16),
    Latency(u32),
}

impl MetricValue {
    /// Return the width of the value carried by objects of type `kind`, or `None` when the
    /// type carries no value this crate understands.
    pub fn width(kind: MetricType) -> Option<usize> {
        match kind {
            MetricType::NodeEnergy
            | MetricType::Throughput
            | MetricType::Etx
            | MetricType::LinkQuality
            | MetricType::HopCount => Some(2),
            MetricType::Latency => Some(4),
            _ => None,
        }
    }

    pub fn metric_type(&self) -> MetricType {
        match self {
            Self::Energy(_) => MetricType::NodeEnergy,
            Self::Throughput(_) => MetricType::Throughput,
            Self::Etx(_) => MetricType::Etx,
            Self::LinkQuality(_) => MetricType::LinkQuality,
            Self::HopCount(_) => MetricType::HopCount,
            Self::Latency(_) => MetricType::Latency,
        }
    }

    pub fn buffer_len(&self) -> usize {
        match self {
            Self::Latency(_) => 4,
            _ => 2,
        }
    }

    fn parse(kind: MetricType, data: &[u8]) -> Result<Self> {
        let width = Self::width(kind).ok_or(Error)?;
        let data = data.get(..width).ok_or(Error)?;

        Ok(match kind {
            MetricType::NodeEnergy => Self::Energy(NetworkEndian::read_u16(data)),
            MetricType::Throughput => Self::Throughput(NetworkEndian::read_u16(data)),
            MetricType::Etx => Self::Etx(NetworkEndian::read_u16(data)),
            MetricType::LinkQuality => Self::LinkQuality(NetworkEndian::read_u16(data)),
            MetricType::HopCount => Self::HopCount(NetworkEndian::read_u16(data)),
            MetricType::Latency => Self::Latency(NetworkEndian::read_u32(data)),
            _ => return Err(Error),
        })
    }

    fn emit(&self, data: &mut [u8]) {
        match *self {
            Self::Latency(value) => NetworkEndian::write_u32(data, value),
            Self::Energy(value)
            | Self::Throughput(value)
            | Self::Etx(value)
            | Self::LinkQuality(value)
            | Self::HopCount(value) => NetworkEndian::write_u16(data, value),
        }
    }
}

/// A decoded metric object.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MetricContainer {
    /// 9-bit flags field.
    pub flags: u16,
    pub aggregation: u8,
    pub precedence: u8,
    /// Declared object length, header included.
    pub length: u8,
    pub value: MetricValue,
}

impl MetricContainer {
    /// Create an object with cleared flags, whose declared length matches its value.
    pub fn new(value: MetricValue) -> Self {
        Self {
            flags: 0,
            aggregation: 0,
            precedence: 0,
            length: (field::VALUE + value.buffer_len()) as u8,
            value,
        }
    }

    pub fn metric_type(&self) -> MetricType {
        self.value.metric_type()
    }

    /// Return the number of octets the object occupies once emitted.
    pub fn buffer_len(&self) -> usize {
        field::VALUE + self.value.buffer_len()
    }

    fn emit(&self, data: &mut [u8]) {
        let flags = self.flags & layout::FLAGS_MASK;
        data[field::TYPE] = self.metric_type().into();
        data[field::FLAGS_HIGH] = (flags >> layout::FLAGS_HIGH_SHIFT) as u8;
        data[field::FLAGS_LOW] = (((flags & layout::FLAGS_LOW_MASK) as u8)
            << layout::FLAGS_LOW_SHIFT)
            | ((self.aggregation & layout::AGGREGATION_MASK) << layout::AGGREGATION_SHIFT)
            | (self.precedence & layout::PRECEDENCE_MASK);
        data[field::LENGTH] = self.length;
        self.value.emit(&mut data[field::VALUE..]);
    }
}

impl fmt::Display for MetricContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} flags={:#05x} aggr={} prec={}",
            self.value, self.flags, self.aggregation, self.precedence
        )
    }
}

/// DIO timing carried at the start of every metric container.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DioTiming {
    pub dio_delay: u32,
    pub next_dio_time: u32,
    pub next_dio_delay: u32,
}

impl DioTiming {
    pub const LEN: usize = field::OBJECTS;

    /// Read the timing octets at the start of a container payload.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.len() < Self::LEN {
            return Err(Error);
        }

        Ok(Self {
            dio_delay: NetworkEndian::read_u32(&payload[field::DIO_DELAY]),
            next_dio_time: NetworkEndian::read_u32(&payload[field::NEXT_DIO_TIME]),
            next_dio_delay: NetworkEndian::read_u32(&payload[field::NEXT_DIO_DELAY]),
        })
    }

    pub fn emit(&self, payload: &mut [u8]) {
        NetworkEndian::write_u32(&mut payload[field::DIO_DELAY], self.dio_delay);
        NetworkEndian::write_u32(&mut payload[field::NEXT_DIO_TIME], self.next_dio_time);
        NetworkEndian::write_u32(&mut payload[field::NEXT_DIO_DELAY], self.next_dio_delay);
    }
}

/// How far the metric objects of a container were decoded.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseOutcome {
    Complete,
    /// The pool ran out of slots; the objects decoded so far are kept.
    Truncated,
}

/// Decode the metric objects of a container payload and append them to `list`.
///
/// Objects are read while at least [`RESERVED_TRAILER`] octets remain after the current
/// position. Objects of a type without a known value are skipped by their declared length.
/// An object running past the payload fails the decode; the objects appended before it stay
/// in `list`.
pub fn parse_metrics(
    payload: &[u8],
    pool: &mut MetricPool,
    list: &mut MetricList,
) -> Result<ParseOutcome> {
    if payload.len() < DioTiming::LEN {
        return Err(Error);
    }

    let mut pos = field::OBJECTS;
    while pos + RESERVED_TRAILER < payload.len() {
        let header = payload.get(pos..pos + field::VALUE).ok_or(Error)?;
        let kind = MetricType::from(header[field::TYPE]);
        let length = header[field::LENGTH];
        pos += field::VALUE;

        let Some(width) = MetricValue::width(kind) else {
            let skip = (length as usize).saturating_sub(field::VALUE);
            net_debug!("skipping {} octets of metric type {:?}", skip, kind);
            if pos + skip > payload.len() {
                return Err(Error);
            }
            pos += skip;
            continue;
        };

        let value = MetricValue::parse(kind, payload.get(pos..).ok_or(Error)?)?;
        pos += width;

        let object = MetricContainer {
            flags: (u16::from(header[field::FLAGS_HIGH]) << layout::FLAGS_HIGH_SHIFT)
                | (u16::from(header[field::FLAGS_LOW]) >> layout::FLAGS_LOW_SHIFT),
            aggregation: (header[field::FLAGS_LOW] >> layout::AGGREGATION_SHIFT)
                & layout::AGGREGATION_MASK,
            precedence: header[field::FLAGS_LOW] & layout::PRECEDENCE_MASK,
            length,
            value,
        };
        net_trace!("metric object {}", object);

        if pool.push_back(list, object).is_err() {
            net_debug!("metric pool exhausted after {} objects", list.len());
            return Ok(ParseOutcome::Truncated);
        }
    }

    Ok(ParseOutcome::Complete)
}

/// Return the payload length of a container that carries `count` objects.
///
/// The length is computed with six octets per object. The two reserved trailing octets
/// leave room for a single latency object, which is two octets wider than the others.
pub const fn declared_len(count: usize) -> usize {
    6 * count + DioTiming::LEN + RESERVED_TRAILER
}

/// Emit a container payload, zero filled to [`declared_len`], and return its length.
///
/// Fails if the objects do not fit in the declared length, or if the declared length does not
/// fit in a sub-option length octet.
pub fn emit_payload(
    payload: &mut [u8],
    timing: &DioTiming,
    metrics: &[MetricContainer],
) -> Result<usize> {
    let declared = declared_len(metrics.len());
    if declared > u8::MAX as usize {
        return Err(Error);
    }

    let payload = payload.get_mut(..declared).ok_or(Error)?;
    payload.fill(0);
    timing.emit(payload);

    let mut pos = field::OBJECTS;
    for metric in metrics {
        let end = pos + metric.buffer_len();
        metric.emit(payload.get_mut(pos..end).ok_or(Error)?);
        pos = end;
    }

    Ok(declared)
}
