//! RPL control message sub-options. See [RFC 6550 § 6.7].
//!
//! Every sub-option is a `{type, length, payload}` record, except `Pad1` which is a single
//! octet. The scanner ([`OptionsIterator`]) only yields records that fit entirely inside the
//! scanned span; the first one that does not stops the scan with an error.
//!
//! [RFC 6550 § 6.7]: https://datatracker.ietf.org/doc/html/rfc6550#section-6.7

use byteorder::{ByteOrder, NetworkEndian};
use core::fmt;

use crate::wire::{Error, Ipv6Address, Ipv6AddressExt, Result};

enum_with_unknown! {
    /// RPL control message sub-option types.
    pub enum OptionType(u8) {
        Pad1 = 0x00,
        PadN = 0x01,
        DagMetricContainer = 0x02,
        RouteInformation = 0x03,
        DodagConfiguration = 0x04,
        RplTarget = 0x05,
        TransitInformation = 0x06,
        SolicitedInformation = 0x07,
        PrefixInformation = 0x08,
        RplTargetDescriptor = 0x09,
    }
}

mod field {
    use crate::wire::field::*;

    // Generic fields.
    pub const TYPE: usize = 0;
    pub const LENGTH: usize = 1;
    pub const PAYLOAD: usize = 2;

    // All fields below are offsets into the payload.

    // Route Information fields.
    pub const ROUTE_INFO_PREFIX_LENGTH: usize = 0;
    pub const ROUTE_INFO_FLAGS: usize = 1;
    pub const ROUTE_INFO_LIFETIME: Field = 2..6;
    pub const ROUTE_INFO_PREFIX: Rest = 6..;

    // DODAG Configuration fields.
    pub const DODAG_CONF_FLAGS: usize = 0;
    pub const DODAG_CONF_DIO_INTERVAL_DOUBLINGS: usize = 1;
    pub const DODAG_CONF_DIO_INTERVAL_MINIMUM: usize = 2;
    pub const DODAG_CONF_DIO_REDUNDANCY_CONSTANT: usize = 3;
    pub const DODAG_CONF_MAX_RANK_INCREASE: Field = 4..6;
    pub const DODAG_CONF_MIN_HOP_RANK_INCREASE: Field = 6..8;
    pub const DODAG_CONF_OBJECTIVE_CODE_POINT: Field = 8..10;
    pub const DODAG_CONF_RESERVED: usize = 10;
    pub const DODAG_CONF_DEFAULT_LIFETIME: usize = 11;
    pub const DODAG_CONF_LIFETIME_UNIT: Field = 12..14;

    // RPL Target fields.
    pub const TARGET_FLAGS: usize = 0;
    pub const TARGET_PREFIX_LENGTH: usize = 1;
    pub const TARGET_PREFIX: Rest = 2..;

    // Transit Information fields.
    pub const TRANSIT_INFO_FLAGS: usize = 0;
    pub const TRANSIT_INFO_PATH_CONTROL: usize = 1;
    pub const TRANSIT_INFO_PATH_SEQUENCE: usize = 2;
    pub const TRANSIT_INFO_PATH_LIFETIME: usize = 3;

    // Prefix Information fields.
    pub const PREFIX_INFO_PREFIX_LENGTH: usize = 0;
    pub const PREFIX_INFO_FLAGS: usize = 1;
    pub const PREFIX_INFO_VALID_LIFETIME: Field = 2..6;
    pub const PREFIX_INFO_PREFERRED_LIFETIME: Field = 6..10;
    pub const PREFIX_INFO_RESERVED: Field = 10..14;
    pub const PREFIX_INFO_PREFIX: Field = 14..30;
}

/// A read/write wrapper around a RPL Control Message Option.
#[derive(Debug, Clone)]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> Packet<T> {
    /// Create a raw octet buffer with RPL Control Message Option structure.
    #[inline]
    pub const fn new_unchecked(buffer: T) -> Self {
        Self { buffer }
    }

    /// Shorthand for a combination of [new_unchecked] and [check_len].
    ///
    /// [new_unchecked]: #method.new_unchecked
    /// [check_len]: #method.check_len
    #[inline]
    pub fn new_checked(buffer: T) -> Result<Self> {
        let packet = Self::new_unchecked(buffer);
        packet.check_len()?;
        Ok(packet)
    }

    /// Ensure that no accessor method will panic if called.
    /// Returns `Err(Error)` if the buffer is shorter than the length the option declares.
    #[inline]
    pub fn check_len(&self) -> Result<()> {
        let data = self.buffer.as_ref();

        match data.first().copied().map(OptionType::from) {
            None => Err(Error),
            Some(OptionType::Pad1) => Ok(()),
            Some(_) if data.len() < field::PAYLOAD => Err(Error),
            Some(_) if data.len() < field::PAYLOAD + data[field::LENGTH] as usize => Err(Error),
            Some(_) => Ok(()),
        }
    }

    /// Consume the packet, returning the underlying buffer.
    #[inline]
    pub fn into_inner(self) -> T {
        self.buffer
    }

    /// Return the type field.
    #[inline]
    pub fn option_type(&self) -> OptionType {
        OptionType::from(self.buffer.as_ref()[field::TYPE])
    }

    /// Return the length field, which is the length of the payload.
    /// A `Pad1` option has no length field and reports zero.
    #[inline]
    pub fn option_length(&self) -> u8 {
        match self.option_type() {
            OptionType::Pad1 => 0,
            _ => self.buffer.as_ref()[field::LENGTH],
        }
    }

    /// Return the number of octets the option occupies, header included.
    #[inline]
    pub fn total_len(&self) -> usize {
        match self.option_type() {
            OptionType::Pad1 => 1,
            _ => field::PAYLOAD + self.option_length() as usize,
        }
    }
}

impl<'p, T: AsRef<[u8]> + ?Sized> Packet<&'p T> {
    /// Return the payload of the option.
    #[inline]
    pub fn payload(&self) -> &'p [u8] {
        match self.option_type() {
            OptionType::Pad1 => &[],
            _ => &self.buffer.as_ref()[field::PAYLOAD..self.total_len()],
        }
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Set the Option Type field.
    #[inline]
    pub fn set_option_type(&mut self, option_type: OptionType) {
        self.buffer.as_mut()[field::TYPE] = option_type.into();
    }

    /// Set the Option Length field.
    #[inline]
    pub fn set_option_length(&mut self, length: u8) {
        self.buffer.as_mut()[field::LENGTH] = length;
    }

    /// Return a mutable pointer to the payload, as declared by the length field.
    #[inline]
    pub fn payload_mut(&mut self) -> &mut [u8] {
        let end = self.total_len();
        &mut self.buffer.as_mut()[field::PAYLOAD..end]
    }
}

/// A sub-option found by [`OptionsIterator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SubOption<'a> {
    pub option_type: OptionType,
    /// Octets occupied by the sub-option, header included.
    pub total_len: usize,
    /// Offset of the payload from the start of the scanned span.
    pub payload_offset: usize,
    pub payload: &'a [u8],
}

/// An Iterator for RPL options.
///
/// The iterator is finite: it advances by the total length of every sub-option, and stops
/// for good after yielding an error.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OptionsIterator<'a> {
    pos: usize,
    length: usize,
    data: &'a [u8],
    hit_error: bool,
}

impl<'a> OptionsIterator<'a> {
    /// Create a new `OptionsIterator`, used to iterate over the
    /// options contained in a RPL control message body.
    pub fn new(data: &'a [u8]) -> Self {
        let length = data.len();
        Self {
            pos: 0,
            hit_error: false,
            length,
            data,
        }
    }
}

impl<'a> Iterator for OptionsIterator<'a> {
    type Item = Result<SubOption<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.length || self.hit_error {
            return None;
        }

        match Packet::new_checked(&self.data[self.pos..]) {
            Ok(packet) => {
                let option_type = packet.option_type();
                let header_len = match option_type {
                    OptionType::Pad1 => 1,
                    _ => field::PAYLOAD,
                };
                let option = SubOption {
                    option_type,
                    total_len: packet.total_len(),
                    payload_offset: self.pos + header_len,
                    payload: packet.payload(),
                };

                self.pos += option.total_len;
                Some(Ok(option))
            }
            Err(e) => {
                net_debug!(
                    "sub-option at offset {} runs past the end of the message",
                    self.pos
                );
                self.hit_error = true;
                Some(Err(e))
            }
        }
    }
}

/// Write a sub-option with a pre-serialized payload at `cursor`, and return the cursor
/// following it.
///
/// `Pad1` takes no payload and is written as a single octet.
pub fn emit_option(
    buffer: &mut [u8],
    cursor: usize,
    option_type: OptionType,
    payload: &[u8],
) -> Result<usize> {
    if option_type == OptionType::Pad1 {
        if !payload.is_empty() {
            return Err(Error);
        }
        *buffer.get_mut(cursor).ok_or(Error)? = option_type.into();
        return Ok(cursor + 1);
    }

    let length = u8::try_from(payload.len()).map_err(|_| Error)?;
    let end = cursor + field::PAYLOAD + payload.len();

    let mut packet = Packet::new_unchecked(buffer.get_mut(cursor..end).ok_or(Error)?);
    packet.set_option_type(option_type);
    packet.set_option_length(length);
    packet.payload_mut().copy_from_slice(payload);

    Ok(end)
}

/// Number of octets needed to carry a prefix of `prefix_length` bits.
#[inline]
fn prefix_octets(prefix_length: u8) -> usize {
    (prefix_length as usize + 7) / 8
}

/// A high-level representation of a Route Information sub-option.
///
/// ```txt
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Type = 0x03 | Option Length | Prefix Length |Resvd|Prf|Resvd|
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        Route Lifetime                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// .                   Prefix (Variable Length)                    .
/// .                                                               .
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RouteInfo {
    pub prefix_length: u8,
    /// Preference and reserved bits, kept as they are on the wire.
    pub flags: u8,
    pub lifetime: u32,
    /// The prefix, zero padded to a full address.
    pub prefix: Ipv6Address,
}

impl RouteInfo {
    /// The payload holds at least the prefix length, flags and lifetime, and one octet.
    pub const MIN_PAYLOAD_LEN: usize = 7;

    /// Parse the payload of a Route Information sub-option.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.len() < Self::MIN_PAYLOAD_LEN {
            return Err(Error);
        }

        let prefix_length = payload[field::ROUTE_INFO_PREFIX_LENGTH];
        let prefix_len = prefix_octets(prefix_length);
        if prefix_length > 128 || field::ROUTE_INFO_PREFIX.start + prefix_len > payload.len() {
            return Err(Error);
        }

        Ok(Self {
            prefix_length,
            flags: payload[field::ROUTE_INFO_FLAGS],
            lifetime: NetworkEndian::read_u32(&payload[field::ROUTE_INFO_LIFETIME]),
            prefix: Ipv6Address::from_prefix_bytes(
                &payload[field::ROUTE_INFO_PREFIX][..prefix_len],
            ),
        })
    }
}

impl fmt::Display for RouteInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ROUTE INFO Prefix={}/{} Flags={:#04x} Lifetime={}",
            self.prefix, self.prefix_length, self.flags, self.lifetime
        )
    }
}

/// A high-level representation of a DODAG Configuration sub-option.
///
/// ```txt
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Type = 0x04 |Opt Length = 14| Flags |A| PCS | DIOIntDoubl.  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  DIOIntMin.   |   DIORedun.   |        MaxRankIncrease        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      MinHopRankIncrease       |              OCP              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Reserved    | Def. Lifetime |      Lifetime Unit            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Authentication and path control are not supported: the flags octet is ignored on
/// reception and emitted as zero.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DagConfig {
    pub dio_interval_doublings: u8,
    pub dio_interval_min: u8,
    pub dio_redundancy_constant: u8,
    pub max_rank_increase: u16,
    pub min_hop_rank_increase: u16,
    pub objective_code_point: u16,
    pub default_lifetime: u8,
    pub lifetime_unit: u16,
}

impl DagConfig {
    pub const PAYLOAD_LEN: usize = 14;

    /// Parse the payload of a DODAG Configuration sub-option, which has a fixed length.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.len() != Self::PAYLOAD_LEN {
            return Err(Error);
        }

        Ok(Self {
            dio_interval_doublings: payload[field::DODAG_CONF_DIO_INTERVAL_DOUBLINGS],
            dio_interval_min: payload[field::DODAG_CONF_DIO_INTERVAL_MINIMUM],
            dio_redundancy_constant: payload[field::DODAG_CONF_DIO_REDUNDANCY_CONSTANT],
            max_rank_increase: NetworkEndian::read_u16(
                &payload[field::DODAG_CONF_MAX_RANK_INCREASE],
            ),
            min_hop_rank_increase: NetworkEndian::read_u16(
                &payload[field::DODAG_CONF_MIN_HOP_RANK_INCREASE],
            ),
            objective_code_point: NetworkEndian::read_u16(
                &payload[field::DODAG_CONF_OBJECTIVE_CODE_POINT],
            ),
            default_lifetime: payload[field::DODAG_CONF_DEFAULT_LIFETIME],
            lifetime_unit: NetworkEndian::read_u16(&payload[field::DODAG_CONF_LIFETIME_UNIT]),
        })
    }

    /// Emit the payload into a buffer of exactly [`DagConfig::PAYLOAD_LEN`] octets.
    pub fn emit_payload(&self, payload: &mut [u8]) {
        payload[field::DODAG_CONF_FLAGS] = 0;
        payload[field::DODAG_CONF_DIO_INTERVAL_DOUBLINGS] = self.dio_interval_doublings;
        payload[field::DODAG_CONF_DIO_INTERVAL_MINIMUM] = self.dio_interval_min;
        payload[field::DODAG_CONF_DIO_REDUNDANCY_CONSTANT] = self.dio_redundancy_constant;
        NetworkEndian::write_u16(
            &mut payload[field::DODAG_CONF_MAX_RANK_INCREASE],
            self.max_rank_increase,
        );
        NetworkEndian::write_u16(
            &mut payload[field::DODAG_CONF_MIN_HOP_RANK_INCREASE],
            self.min_hop_rank_increase,
        );
        NetworkEndian::write_u16(
            &mut payload[field::DODAG_CONF_OBJECTIVE_CODE_POINT],
            self.objective_code_point,
        );
        payload[field::DODAG_CONF_RESERVED] = 0;
        payload[field::DODAG_CONF_DEFAULT_LIFETIME] = self.default_lifetime;
        NetworkEndian::write_u16(&mut payload[field::DODAG_CONF_LIFETIME_UNIT], self.lifetime_unit);
    }
}

impl fmt::Display for DagConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DODAG CONF IntD={} IntMin={} RedCst={} MaxRankIncr={} MinHopRankIncr={} OCP={} \
            DefaultLifetime={} LifeUnit={}",
            self.dio_interval_doublings,
            self.dio_interval_min,
            self.dio_redundancy_constant,
            self.max_rank_increase,
            self.min_hop_rank_increase,
            self.objective_code_point,
            self.default_lifetime,
            self.lifetime_unit
        )
    }
}

/// A high-level representation of a Prefix Information sub-option.
///
/// ```txt
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Type = 0x08 |Opt Length = 30| Prefix Length |L|A|R|Reserved1|
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         Valid Lifetime                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                       Preferred Lifetime                      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           Reserved2                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                                                               +
/// |                                                               |
/// +                            Prefix                             +
/// |                                                               |
/// +                                                               +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Only one lifetime is kept: the preferred lifetime is read, and emitted as both lifetimes.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PrefixInfo {
    pub prefix_length: u8,
    pub flags: u8,
    pub lifetime: u32,
    pub prefix: Ipv6Address,
}

impl PrefixInfo {
    pub const PAYLOAD_LEN: usize = 30;

    /// Parse the payload of a Prefix Information sub-option, which has a fixed length.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.len() != Self::PAYLOAD_LEN {
            return Err(Error);
        }

        Ok(Self {
            prefix_length: payload[field::PREFIX_INFO_PREFIX_LENGTH],
            flags: payload[field::PREFIX_INFO_FLAGS],
            lifetime: NetworkEndian::read_u32(&payload[field::PREFIX_INFO_PREFERRED_LIFETIME]),
            prefix: Ipv6Address::from_prefix_bytes(&payload[field::PREFIX_INFO_PREFIX]),
        })
    }

    /// Emit the payload into a buffer of exactly [`PrefixInfo::PAYLOAD_LEN`] octets.
    pub fn emit_payload(&self, payload: &mut [u8]) {
        payload[field::PREFIX_INFO_PREFIX_LENGTH] = self.prefix_length;
        payload[field::PREFIX_INFO_FLAGS] = self.flags;
        NetworkEndian::write_u32(&mut payload[field::PREFIX_INFO_VALID_LIFETIME], self.lifetime);
        NetworkEndian::write_u32(
            &mut payload[field::PREFIX_INFO_PREFERRED_LIFETIME],
            self.lifetime,
        );
        payload[field::PREFIX_INFO_RESERVED].fill(0);
        payload[field::PREFIX_INFO_PREFIX].copy_from_slice(&self.prefix.octets());
    }
}

impl fmt::Display for PrefixInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Prefix Info Prefix={}/{} Flags={:#04x} Lifetime={}",
            self.prefix, self.prefix_length, self.flags, self.lifetime
        )
    }
}

/// A high-level representation of a RPL Target sub-option.
///
/// ```txt
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Type = 0x05 | Option Length |     Flags     | Prefix Length |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                                                               +
/// |                Target Prefix (Variable Length)                |
/// .                                                               .
/// .                                                               .
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Target {
    pub prefix_length: u8,
    /// The prefix, zero padded to a full address.
    pub prefix: Ipv6Address,
}

impl Target {
    pub const MIN_PAYLOAD_LEN: usize = 2;

    /// Parse the payload of a RPL Target sub-option.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.len() < Self::MIN_PAYLOAD_LEN {
            return Err(Error);
        }

        let prefix_length = payload[field::TARGET_PREFIX_LENGTH];
        let prefix_len = prefix_octets(prefix_length);
        if prefix_length > 128 || field::TARGET_PREFIX.start + prefix_len > payload.len() {
            return Err(Error);
        }

        Ok(Self {
            prefix_length,
            prefix: Ipv6Address::from_prefix_bytes(&payload[field::TARGET_PREFIX][..prefix_len]),
        })
    }

    /// Return the length of the payload that will be emitted.
    pub fn payload_len(&self) -> usize {
        field::TARGET_PREFIX.start + prefix_octets(self.prefix_length.min(128))
    }

    /// Emit the payload into a buffer of exactly [`Target::payload_len`] octets.
    pub fn emit_payload(&self, payload: &mut [u8]) {
        let prefix_length = self.prefix_length.min(128);
        let prefix_len = prefix_octets(prefix_length);
        payload[field::TARGET_FLAGS] = 0;
        payload[field::TARGET_PREFIX_LENGTH] = prefix_length;
        payload[field::TARGET_PREFIX][..prefix_len]
            .copy_from_slice(&self.prefix.octets()[..prefix_len]);
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RPL Target Prefix={}/{}", self.prefix, self.prefix_length)
    }
}

/// A high-level representation of a Transit Information sub-option.
///
/// ```txt
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Type = 0x06 | Option Length |E|    Flags    | Path Control  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Path Sequence | Path Lifetime |                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               +
/// |                                                               |
/// +                                                               +
/// |                                                               |
/// +                        Parent Address*                        +
/// |                                                               |
/// +                               +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// A parent address, used in non-storing mode, is skipped on reception and never emitted.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transit {
    pub path_control: u8,
    pub path_sequence: u8,
    pub lifetime: u8,
}

impl Transit {
    pub const PAYLOAD_LEN: usize = 4;

    /// Parse the payload of a Transit Information sub-option.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.len() < Self::PAYLOAD_LEN {
            return Err(Error);
        }

        Ok(Self {
            path_control: payload[field::TRANSIT_INFO_PATH_CONTROL],
            path_sequence: payload[field::TRANSIT_INFO_PATH_SEQUENCE],
            lifetime: payload[field::TRANSIT_INFO_PATH_LIFETIME],
        })
    }

    /// Emit the payload into a buffer of exactly [`Transit::PAYLOAD_LEN`] octets.
    pub fn emit_payload(&self, payload: &mut [u8]) {
        payload[field::TRANSIT_INFO_FLAGS] = 0;
        payload[field::TRANSIT_INFO_PATH_CONTROL] = self.path_control;
        payload[field::TRANSIT_INFO_PATH_SEQUENCE] = self.path_sequence;
        payload[field::TRANSIT_INFO_PATH_LIFETIME] = self.lifetime;
    }
}

impl fmt::Display for Transit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transit Info PathCtrl={} PathSqnc={} PathLifetime={}",
            self.path_control, self.path_sequence, self.lifetime
        )
    }
}
