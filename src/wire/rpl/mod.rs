//! Implementation of the RPL control message formats. See [RFC 6550 § 6].
//!
//! A [`Packet`] wraps the ICMPv6 body of a control message, the octets following the ICMPv6
//! type, code and checksum. The code is not part of the body, so it is handed to the wrapper
//! next to the buffer.
//!
//! [RFC 6550 § 6]: https://datatracker.ietf.org/doc/html/rfc6550#section-6

use bitflags::bitflags;
use byteorder::{ByteOrder, NetworkEndian};
use core::fmt;

use super::{Error, Result};
use crate::wire::ipv6::{Address, ADDR_SIZE};

pub mod metric;
pub mod options;

use self::metric::{DioTiming, MetricContainer, MetricList, MetricPool, ParseOutcome};
use self::options::{
    emit_option, DagConfig, OptionType, OptionsIterator, PrefixInfo, RouteInfo, Target, Transit,
};

/// The ICMPv6 message type of every RPL control message.
pub const ICMPV6_RPL: u8 = 155;

mod field {
    use crate::wire::field::*;

    pub const RPL_INSTANCE_ID: usize = 0;

    // DODAG information solicitation fields (DIS)
    pub const DIS_FLAGS: usize = 0;
    pub const DIS_RESERVED: usize = 1;

    // DODAG information object fields (DIO)
    pub const DIO_VERSION_NUMBER: usize = 1;
    pub const DIO_RANK: Field = 2..4;
    pub const DIO_GROUNDED: usize = 4;
    pub const DIO_MOP: usize = 4;
    pub const DIO_PRF: usize = 4;
    pub const DIO_DTSN: usize = 5;
    pub const DIO_FLAGS: usize = 6;
    pub const DIO_RESERVED: usize = 7;
    pub const DIO_DODAG_ID: Field = 8..8 + 16;

    // Destination advertisement object (DAO)
    pub const DAO_FLAGS: usize = 1;
    pub const DAO_RESERVED: usize = 2;
    pub const DAO_SEQUENCE: usize = 3;
    pub const DAO_DODAG_ID: Field = 4..4 + 16;

    // Destination advertisement object ack (DAO-ACK)
    pub const DAO_ACK_RESERVED: usize = 1;
    pub const DAO_ACK_SEQUENCE: usize = 2;
    pub const DAO_ACK_STATUS: usize = 3;
}

enum_with_unknown! {
    /// RPL Control Message subtypes, carried in the ICMPv6 code field.
    pub enum RplControlMessage(u8) {
        DodagInformationSolicitation = 0x00,
        DodagInformationObject = 0x01,
        DestinationAdvertisementObject = 0x02,
        DestinationAdvertisementObjectAck = 0x03,
    }
}

impl fmt::Display for RplControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RplControlMessage::DodagInformationSolicitation => {
                write!(f, "DODAG information solicitation (DIS)")
            }
            RplControlMessage::DodagInformationObject => {
                write!(f, "DODAG information object (DIO)")
            }
            RplControlMessage::DestinationAdvertisementObject => {
                write!(f, "destination advertisement object (DAO)")
            }
            RplControlMessage::DestinationAdvertisementObjectAck => write!(
                f,
                "destination advertisement object acknowledgement (DAO-ACK)"
            ),
            RplControlMessage::Unknown(code) => write!(f, "unknown RPL control message ({code})"),
        }
    }
}

enum_with_unknown! {
    /// Mode of operation of a DODAG. See [RFC 6550 § 6.3.1].
    ///
    /// [RFC 6550 § 6.3.1]: https://datatracker.ietf.org/doc/html/rfc6550#section-6.3.1
    pub enum ModeOfOperation(u8) {
        NoDownwardRoutesMaintained = 0x00,
        NonStoringMode = 0x01,
        StoringModeWithoutMulticast = 0x02,
        StoringModeWithMulticast = 0x03,
    }
}

impl Default for ModeOfOperation {
    fn default() -> Self {
        Self::StoringModeWithoutMulticast
    }
}

bitflags! {
    /// Flags of a DAO message.
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct DaoFlags: u8 {
        /// The sender expects a DAO-ACK.
        const EXPECT_ACK = 0b1000_0000;
        /// The DODAG ID field is present.
        const DODAG_ID_PRESENT = 0b0100_0000;
    }
}

/// A read/write wrapper around a RPL control message body.
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
    message: RplControlMessage,
}

impl<T: AsRef<[u8]>> Packet<T> {
    /// Imbue a raw octet buffer with RPL control message structure.
    #[inline]
    pub const fn new_unchecked(buffer: T, message: RplControlMessage) -> Packet<T> {
        Packet { buffer, message }
    }

    /// Shorthand for a combination of [new_unchecked] and [check_len].
    ///
    /// [new_unchecked]: #method.new_unchecked
    /// [check_len]: #method.check_len
    #[inline]
    pub fn new_checked(buffer: T, message: RplControlMessage) -> Result<Packet<T>> {
        let packet = Self::new_unchecked(buffer, message);
        packet.check_len()?;
        Ok(packet)
    }

    /// Ensure that no accessor method will panic if called.
    /// Returns `Err(Error)` if the buffer is too short for the fixed part of the message, or
    /// if the message is not a RPL control message this crate handles.
    ///
    /// A DIS body is never too short: its flags and reserved octets are not interpreted.
    #[inline]
    pub fn check_len(&self) -> Result<()> {
        let len = self.buffer.as_ref().len();
        match self.message {
            RplControlMessage::DodagInformationSolicitation => Ok(()),
            RplControlMessage::DodagInformationObject if len < field::DIO_DODAG_ID.end => {
                Err(Error)
            }
            RplControlMessage::DestinationAdvertisementObject if len < field::DAO_SEQUENCE + 1 => {
                Err(Error)
            }
            RplControlMessage::DestinationAdvertisementObject
                if self.dao_dodag_id_present() && len < field::DAO_DODAG_ID.end =>
            {
                Err(Error)
            }
            RplControlMessage::DestinationAdvertisementObjectAck
                if len < field::DAO_ACK_STATUS + 1 =>
            {
                Err(Error)
            }
            RplControlMessage::Unknown(_) => Err(Error),
            _ => Ok(()),
        }
    }

    /// Consume the packet, returning the underlying buffer.
    #[inline]
    pub fn into_inner(self) -> T {
        self.buffer
    }

    /// Return the control message subtype.
    #[inline]
    pub fn message(&self) -> RplControlMessage {
        self.message
    }

    /// Return the length of the fixed part of the message.
    fn header_len(&self) -> usize {
        match self.message {
            RplControlMessage::DodagInformationSolicitation => {
                (field::DIS_RESERVED + 1).min(self.buffer.as_ref().len())
            }
            RplControlMessage::DodagInformationObject => field::DIO_DODAG_ID.end,
            RplControlMessage::DestinationAdvertisementObject if self.dao_dodag_id_present() => {
                field::DAO_DODAG_ID.end
            }
            RplControlMessage::DestinationAdvertisementObject => field::DAO_SEQUENCE + 1,
            RplControlMessage::DestinationAdvertisementObjectAck => field::DAO_ACK_STATUS + 1,
            RplControlMessage::Unknown(_) => 0,
        }
    }

    /// Return the RPL instance ID.
    #[inline]
    pub fn rpl_instance_id(&self) -> u8 {
        self.buffer.as_ref()[field::RPL_INSTANCE_ID]
    }
}

impl<'p, T: AsRef<[u8]> + ?Sized> Packet<&'p T> {
    /// Return a pointer to the sub-options following the fixed part of the message.
    #[inline]
    pub fn options(&self) -> &'p [u8] {
        &self.buffer.as_ref()[self.header_len()..]
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Set the RPL Instance ID field.
    #[inline]
    pub fn set_rpl_instance_id(&mut self, value: u8) {
        self.buffer.as_mut()[field::RPL_INSTANCE_ID] = value;
    }

    /// Return a mutable pointer to the sub-options.
    #[inline]
    pub fn options_mut(&mut self) -> &mut [u8] {
        let start = self.header_len();
        &mut self.buffer.as_mut()[start..]
    }
}

/// Setters for the DODAG information solicitation (DIS) message.
///
/// ```txt
///  0                   1                   2
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Flags     |   Reserved    |   Option(s)...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Clear the DIS flags field.
    pub fn clear_dis_flags(&mut self) {
        self.buffer.as_mut()[field::DIS_FLAGS] = 0;
    }

    /// Clear the DIS reserved field.
    pub fn clear_dis_reserved(&mut self) {
        self.buffer.as_mut()[field::DIS_RESERVED] = 0;
    }
}

/// Getters for the DODAG information object (DIO) message.
///
/// ```txt
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | RPLInstanceID |Version Number |             Rank              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |G|0| MOP | Prf |     DTSN      |     Flags     |   Reserved    |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                                                               +
/// |                                                               |
/// +                            DODAGID                            +
/// |                                                               |
/// +                                                               +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Option(s)...
/// +-+-+-+-+-+-+-+-+
/// ```
impl<T: AsRef<[u8]>> Packet<T> {
    /// Return the Version Number field.
    #[inline]
    pub fn dio_version_number(&self) -> u8 {
        self.buffer.as_ref()[field::DIO_VERSION_NUMBER]
    }

    /// Return the Rank field.
    #[inline]
    pub fn dio_rank(&self) -> u16 {
        NetworkEndian::read_u16(&self.buffer.as_ref()[field::DIO_RANK])
    }

    /// Return the value of the Grounded flag.
    #[inline]
    pub fn dio_grounded(&self) -> bool {
        (self.buffer.as_ref()[field::DIO_GROUNDED] >> 7) & 0b1 == 0b1
    }

    /// Return the mode of operation field.
    #[inline]
    pub fn dio_mode_of_operation(&self) -> ModeOfOperation {
        ModeOfOperation::from((self.buffer.as_ref()[field::DIO_MOP] >> 3) & 0b111)
    }

    /// Return the DODAG preference field.
    #[inline]
    pub fn dio_dodag_preference(&self) -> u8 {
        self.buffer.as_ref()[field::DIO_PRF] & 0b111
    }

    /// Return the destination advertisement trigger sequence number.
    #[inline]
    pub fn dio_dest_adv_trigger_seq_number(&self) -> u8 {
        self.buffer.as_ref()[field::DIO_DTSN]
    }

    /// Return the DODAG id, which is an IPv6 address.
    #[inline]
    pub fn dio_dodag_id(&self) -> Address {
        read_address(&self.buffer.as_ref()[field::DIO_DODAG_ID])
    }
}

/// Setters for the DODAG information object (DIO) message.
impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Set the Version Number field.
    #[inline]
    pub fn set_dio_version_number(&mut self, value: u8) {
        self.buffer.as_mut()[field::DIO_VERSION_NUMBER] = value;
    }

    /// Set the Rank field.
    #[inline]
    pub fn set_dio_rank(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.buffer.as_mut()[field::DIO_RANK], value);
    }

    /// Set the value of the Grounded flag.
    #[inline]
    pub fn set_dio_grounded(&mut self, value: bool) {
        let raw = self.buffer.as_ref()[field::DIO_GROUNDED] & !(0b1 << 7);
        self.buffer.as_mut()[field::DIO_GROUNDED] = raw | ((value as u8) << 7);
    }

    /// Set the mode of operation field.
    #[inline]
    pub fn set_dio_mode_of_operation(&mut self, mode: ModeOfOperation) {
        let raw = (self.buffer.as_ref()[field::DIO_MOP] & !(0b111 << 3))
            | ((u8::from(mode) & 0b111) << 3);
        self.buffer.as_mut()[field::DIO_MOP] = raw;
    }

    /// Set the DODAG preference field.
    #[inline]
    pub fn set_dio_dodag_preference(&mut self, value: u8) {
        let raw = self.buffer.as_ref()[field::DIO_PRF] & !0b111;
        self.buffer.as_mut()[field::DIO_PRF] = raw | (value & 0b111);
    }

    /// Set the destination advertisement trigger sequence number.
    #[inline]
    pub fn set_dio_dest_adv_trigger_seq_number(&mut self, value: u8) {
        self.buffer.as_mut()[field::DIO_DTSN] = value;
    }

    /// Clear the flags and reserved fields, and the unused bit next to the Grounded flag.
    #[inline]
    pub fn clear_dio_flags(&mut self) {
        let data = self.buffer.as_mut();
        data[field::DIO_GROUNDED] = 0;
        data[field::DIO_FLAGS] = 0;
        data[field::DIO_RESERVED] = 0;
    }

    /// Set the DODAG id, which is an IPv6 address.
    #[inline]
    pub fn set_dio_dodag_id(&mut self, address: Address) {
        self.buffer.as_mut()[field::DIO_DODAG_ID].copy_from_slice(&address.octets());
    }
}

/// Getters for the Destination Advertisement Object (DAO) message.
///
/// ```txt
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | RPLInstanceID |K|D|   Flags   |   Reserved    | DAOSequence   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                                                               +
/// |                                                               |
/// +                            DODAGID*                           +
/// |                                                               |
/// +                                                               +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Option(s)...
/// +-+-+-+-+-+-+-+-+
/// ```
impl<T: AsRef<[u8]>> Packet<T> {
    /// Return the DAO flags.
    #[inline]
    pub fn dao_flags(&self) -> DaoFlags {
        DaoFlags::from_bits_truncate(self.buffer.as_ref()[field::DAO_FLAGS])
    }

    /// Returns the Expect DAO-ACK flag.
    #[inline]
    pub fn dao_ack_request(&self) -> bool {
        self.dao_flags().contains(DaoFlags::EXPECT_ACK)
    }

    /// Returns the flag indicating that the DODAG ID is present or not.
    #[inline]
    pub fn dao_dodag_id_present(&self) -> bool {
        self.dao_flags().contains(DaoFlags::DODAG_ID_PRESENT)
    }

    /// Returns the DAO sequence number.
    #[inline]
    pub fn dao_sequence(&self) -> u8 {
        self.buffer.as_ref()[field::DAO_SEQUENCE]
    }

    /// Returns the DODAG ID, an IPv6 address, when it is present.
    #[inline]
    pub fn dao_dodag_id(&self) -> Option<Address> {
        if self.dao_dodag_id_present() {
            Some(read_address(&self.buffer.as_ref()[field::DAO_DODAG_ID]))
        } else {
            None
        }
    }
}

/// Setters for the Destination Advertisement Object (DAO) message.
impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Set the DAO flags, and clear the reserved field.
    #[inline]
    pub fn set_dao_flags(&mut self, flags: DaoFlags) {
        let data = self.buffer.as_mut();
        data[field::DAO_FLAGS] = flags.bits();
        data[field::DAO_RESERVED] = 0;
    }

    /// Set the DAO sequence number.
    #[inline]
    pub fn set_dao_sequence(&mut self, value: u8) {
        self.buffer.as_mut()[field::DAO_SEQUENCE] = value;
    }

    /// Set the DODAG ID field.
    ///
    /// The field only exists when the D flag is set, so the flags must be set first.
    #[inline]
    pub fn set_dao_dodag_id(&mut self, address: Address) {
        self.buffer.as_mut()[field::DAO_DODAG_ID].copy_from_slice(&address.octets());
    }
}

/// Getters for the Destination Advertisement Object acknowledgement (DAO-ACK) message.
///
/// ```txt
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | RPLInstanceID |   Reserved    |  DAOSequence  |    Status     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
impl<T: AsRef<[u8]>> Packet<T> {
    /// Return the DAO sequence number being acknowledged.
    #[inline]
    pub fn dao_ack_sequence(&self) -> u8 {
        self.buffer.as_ref()[field::DAO_ACK_SEQUENCE]
    }

    /// Return the status field.
    #[inline]
    pub fn dao_ack_status(&self) -> u8 {
        self.buffer.as_ref()[field::DAO_ACK_STATUS]
    }
}

/// Setters for the Destination Advertisement Object acknowledgement (DAO-ACK) message.
impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Set the DAO sequence number being acknowledged, and clear the reserved field.
    #[inline]
    pub fn set_dao_ack_sequence(&mut self, value: u8) {
        let data = self.buffer.as_mut();
        data[field::DAO_ACK_RESERVED] = 0;
        data[field::DAO_ACK_SEQUENCE] = value;
    }

    /// Set the status field.
    #[inline]
    pub fn set_dao_ack_status(&mut self, value: u8) {
        self.buffer.as_mut()[field::DAO_ACK_STATUS] = value;
    }
}

fn read_address(data: &[u8]) -> Address {
    let mut bytes = [0; ADDR_SIZE];
    bytes.copy_from_slice(data);
    Address::from(bytes)
}

/// A high-level representation of a DODAG Information Solicitation.
///
/// Neither the flags nor any sub-option of a DIS are interpreted.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisRepr;

impl DisRepr {
    pub fn parse<T: AsRef<[u8]> + ?Sized>(packet: &Packet<&T>) -> Result<Self> {
        packet.check_len()?;
        Ok(DisRepr)
    }

    pub const fn buffer_len(&self) -> usize {
        field::DIS_RESERVED + 1
    }

    pub fn emit<T: AsRef<[u8]> + AsMut<[u8]> + ?Sized>(&self, packet: &mut Packet<&mut T>) {
        packet.clear_dis_flags();
        packet.clear_dis_reserved();
    }
}

impl fmt::Display for DisRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DIS")
    }
}

/// A high-level representation of a DODAG Information Object.
///
/// Parsing happens in two steps. [`DioRepr::parse`] reads the fixed part of the message, and
/// [`DioRepr::parse_options`] decodes the sub-options into the same value, so that whatever
/// was decoded before a malformed sub-option stays available.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DioRepr {
    pub rpl_instance_id: u8,
    pub version_number: u8,
    pub rank: u16,
    pub grounded: bool,
    pub mode_of_operation: ModeOfOperation,
    pub dodag_preference: u8,
    pub dtsn: u8,
    pub dodag_id: Address,
    pub dag_config: Option<DagConfig>,
    pub prefix_info: Option<PrefixInfo>,
    pub route_info: Option<RouteInfo>,
    pub timing: DioTiming,
    /// Metric objects decoded from the metric container, allocated from a [`MetricPool`].
    pub metrics: MetricList,
    /// The metric pool ran out of slots while decoding the metric container.
    pub metrics_truncated: bool,
}

impl DioRepr {
    /// Parse the fixed part of a DIO.
    pub fn parse<T: AsRef<[u8]> + ?Sized>(packet: &Packet<&T>) -> Result<Self> {
        packet.check_len()?;

        Ok(DioRepr {
            rpl_instance_id: packet.rpl_instance_id(),
            version_number: packet.dio_version_number(),
            rank: packet.dio_rank(),
            grounded: packet.dio_grounded(),
            mode_of_operation: packet.dio_mode_of_operation(),
            dodag_preference: packet.dio_dodag_preference(),
            dtsn: packet.dio_dest_adv_trigger_seq_number(),
            dodag_id: packet.dio_dodag_id(),
            dag_config: None,
            prefix_info: None,
            route_info: None,
            timing: DioTiming::default(),
            metrics: MetricList::new(),
            metrics_truncated: false,
        })
    }

    /// Decode the sub-options of a DIO.
    ///
    /// Metric objects are allocated from `pool`; they must be handed back with
    /// [`DioRepr::release`] whatever the outcome. Unsupported sub-options are skipped.
    pub fn parse_options<T: AsRef<[u8]> + ?Sized>(
        &mut self,
        packet: &Packet<&T>,
        pool: &mut MetricPool,
    ) -> Result<()> {
        for option in OptionsIterator::new(packet.options()) {
            let option = option?;
            net_trace!(
                "DIO sub-option {:?} at offset {}",
                option.option_type,
                option.payload_offset
            );

            match option.option_type {
                OptionType::Pad1 | OptionType::PadN => {}
                OptionType::DagMetricContainer => {
                    self.timing = DioTiming::parse(option.payload)?;
                    if self.metrics_truncated {
                        continue;
                    }
                    let outcome = metric::parse_metrics(option.payload, pool, &mut self.metrics)?;
                    self.metrics_truncated = outcome == ParseOutcome::Truncated;
                }
                OptionType::RouteInformation => {
                    self.route_info = Some(RouteInfo::parse(option.payload)?);
                }
                OptionType::DodagConfiguration => {
                    self.dag_config = Some(DagConfig::parse(option.payload)?);
                }
                OptionType::PrefixInformation => {
                    self.prefix_info = Some(PrefixInfo::parse(option.payload)?);
                }
                other => net_debug!("unsupported DIO sub-option {:?}", other),
            }
        }

        Ok(())
    }

    /// Return every decoded metric object to `pool`.
    pub fn release(&mut self, pool: &mut MetricPool) {
        pool.free_list(&mut self.metrics);
    }

    /// Return the length of a DIO carrying `metrics`.
    pub fn buffer_len(&self, metrics: &[MetricContainer]) -> usize {
        let mut len = field::DIO_DODAG_ID.end;
        if !metrics.is_empty() {
            len += 2 + metric::declared_len(metrics.len());
        }
        len += 2 + DagConfig::PAYLOAD_LEN;
        if self.emits_prefix_info() {
            len += 2 + PrefixInfo::PAYLOAD_LEN;
        }
        len
    }

    fn emits_prefix_info(&self) -> bool {
        matches!(self.prefix_info, Some(info) if info.prefix_length > 0)
    }

    /// Emit a DIO carrying `metrics` in place of the decoded metric list.
    ///
    /// A metric container is emitted when `metrics` is not empty, a DODAG configuration
    /// always, and prefix information when its prefix length is not zero. Route information
    /// is never emitted.
    pub fn emit<T: AsRef<[u8]> + AsMut<[u8]> + ?Sized>(
        &self,
        packet: &mut Packet<&mut T>,
        metrics: &[MetricContainer],
    ) -> Result<()> {
        packet.set_rpl_instance_id(self.rpl_instance_id);
        packet.set_dio_version_number(self.version_number);
        packet.set_dio_rank(self.rank);
        packet.clear_dio_flags();
        packet.set_dio_grounded(self.grounded);
        packet.set_dio_mode_of_operation(self.mode_of_operation);
        packet.set_dio_dodag_preference(self.dodag_preference);
        packet.set_dio_dest_adv_trigger_seq_number(self.dtsn);
        packet.set_dio_dodag_id(self.dodag_id);

        let buffer = packet.options_mut();
        let mut cursor = 0;

        if !metrics.is_empty() {
            let mut payload = [0u8; u8::MAX as usize];
            let len = metric::emit_payload(&mut payload, &self.timing, metrics)?;
            cursor = emit_option(
                buffer,
                cursor,
                OptionType::DagMetricContainer,
                &payload[..len],
            )?;
        }

        let mut payload = [0u8; DagConfig::PAYLOAD_LEN];
        self.dag_config.unwrap_or_default().emit_payload(&mut payload);
        cursor = emit_option(buffer, cursor, OptionType::DodagConfiguration, &payload)?;

        if let Some(prefix_info) = self.prefix_info.filter(|info| info.prefix_length > 0) {
            let mut payload = [0u8; PrefixInfo::PAYLOAD_LEN];
            prefix_info.emit_payload(&mut payload);
            emit_option(buffer, cursor, OptionType::PrefixInformation, &payload)?;
        }

        Ok(())
    }
}

impl fmt::Display for DioRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DIO IID={} V={} R={} G={} MOP={:?} Prf={} DTSN={} DODAGID={}",
            self.rpl_instance_id,
            self.version_number,
            self.rank,
            self.grounded,
            self.mode_of_operation,
            self.dodag_preference,
            self.dtsn,
            self.dodag_id
        )?;
        if let Some(conf) = &self.dag_config {
            write!(f, " {conf}")?;
        }
        if let Some(info) = &self.prefix_info {
            write!(f, " {info}")?;
        }
        if let Some(info) = &self.route_info {
            write!(f, " {info}")?;
        }
        if !self.metrics.is_empty() {
            write!(f, " metrics={}", self.metrics.len())?;
        }
        Ok(())
    }
}

/// A high-level representation of a Destination Advertisement Object.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DaoRepr {
    pub rpl_instance_id: u8,
    /// Only [`DaoFlags::EXPECT_ACK`] is read on emission; the D flag follows `dodag_id`.
    pub flags: DaoFlags,
    pub sequence: u8,
    pub dodag_id: Option<Address>,
    pub target: Target,
    /// Path lifetime of the Transit Information sub-option, if any.
    pub lifetime: Option<u8>,
}

impl DaoRepr {
    /// Parse a DAO. A DAO without a RPL Target sub-option is malformed.
    ///
    /// When several targets or transit options are present, the last of each is kept.
    pub fn parse<T: AsRef<[u8]> + ?Sized>(packet: &Packet<&T>) -> Result<Self> {
        packet.check_len()?;

        let mut target = None;
        let mut lifetime = None;

        for option in OptionsIterator::new(packet.options()) {
            let option = option?;
            match option.option_type {
                OptionType::Pad1 | OptionType::PadN => {}
                OptionType::RplTarget => target = Some(Target::parse(option.payload)?),
                OptionType::TransitInformation => {
                    lifetime = Some(Transit::parse(option.payload)?.lifetime);
                }
                other => net_debug!("unsupported DAO sub-option {:?}", other),
            }
        }

        Ok(DaoRepr {
            rpl_instance_id: packet.rpl_instance_id(),
            flags: packet.dao_flags(),
            sequence: packet.dao_sequence(),
            dodag_id: packet.dao_dodag_id(),
            target: target.ok_or(Error)?,
            lifetime,
        })
    }

    pub fn buffer_len(&self) -> usize {
        let mut len = match self.dodag_id {
            Some(_) => field::DAO_DODAG_ID.end,
            None => field::DAO_SEQUENCE + 1,
        };
        len += 2 + self.target.payload_len();
        if self.lifetime.is_some() {
            len += 2 + Transit::PAYLOAD_LEN;
        }
        len
    }

    pub fn emit<T: AsRef<[u8]> + AsMut<[u8]> + ?Sized>(
        &self,
        packet: &mut Packet<&mut T>,
    ) -> Result<()> {
        let mut flags = self.flags & DaoFlags::EXPECT_ACK;
        flags.set(DaoFlags::DODAG_ID_PRESENT, self.dodag_id.is_some());

        packet.set_rpl_instance_id(self.rpl_instance_id);
        packet.set_dao_flags(flags);
        packet.set_dao_sequence(self.sequence);
        if let Some(dodag_id) = self.dodag_id {
            packet.set_dao_dodag_id(dodag_id);
        }

        let buffer = packet.options_mut();

        let mut payload = [0u8; 2 + ADDR_SIZE];
        let len = self.target.payload_len();
        self.target.emit_payload(&mut payload[..len]);
        let cursor = emit_option(buffer, 0, OptionType::RplTarget, &payload[..len])?;

        if let Some(lifetime) = self.lifetime {
            let transit = Transit {
                path_control: 0,
                path_sequence: 0,
                lifetime,
            };
            let mut payload = [0u8; Transit::PAYLOAD_LEN];
            transit.emit_payload(&mut payload);
            emit_option(buffer, cursor, OptionType::TransitInformation, &payload)?;
        }

        Ok(())
    }
}

impl fmt::Display for DaoRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DAO IID={} Ack={} Seq={} {}",
            self.rpl_instance_id,
            self.flags.contains(DaoFlags::EXPECT_ACK),
            self.sequence,
            self.target
        )?;
        if let Some(dodag_id) = self.dodag_id {
            write!(f, " DODAGID={dodag_id}")?;
        }
        if let Some(lifetime) = self.lifetime {
            write!(f, " Lifetime={lifetime}")?;
        }
        Ok(())
    }
}

/// A high-level representation of a Destination Advertisement Object acknowledgement.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DaoAckRepr {
    pub instance_id: u8,
    pub sequence: u8,
    pub status: u8,
}

impl DaoAckRepr {
    pub fn parse<T: AsRef<[u8]> + ?Sized>(packet: &Packet<&T>) -> Result<Self> {
        packet.check_len()?;

        Ok(DaoAckRepr {
            instance_id: packet.rpl_instance_id(),
            sequence: packet.dao_ack_sequence(),
            status: packet.dao_ack_status(),
        })
    }

    pub const fn buffer_len(&self) -> usize {
        field::DAO_ACK_STATUS + 1
    }

    pub fn emit<T: AsRef<[u8]> + AsMut<[u8]> + ?Sized>(&self, packet: &mut Packet<&mut T>) {
        packet.set_rpl_instance_id(self.instance_id);
        packet.set_dao_ack_sequence(self.sequence);
        packet.set_dao_ack_status(self.status);
    }
}

impl fmt::Display for DaoAckRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DAO-ACK IID={} Seq={} Status={}",
            self.instance_id, self.sequence, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::metric::{MetricValue, RESERVED_TRAILER};
    use super::*;
    use crate::iface::rpl::consts::DEFAULT_DIO_INTERVAL_DOUBLINGS;

    static DIO_PACKET: [u8; 72] = [
        0x00, 0xf0, 0x00, 0x80, 0x08, 0xf0, 0x00, 0x00, 0xfd, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x02, 0x01, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01, 0x04, 0x0e, 0x00, 0x08,
        0x0c, 0x00, 0x04, 0x00, 0x00, 0x80, 0x00, 0x01, 0x00, 0x1e, 0x00, 0x3c, 0x08, 0x1e,
        0x40, 0x40, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00,
        0xfd, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00,
    ];

    static DAO_PACKET: [u8; 46] = [
        0x00, 0x80, 0x00, 0xf1, 0x05, 0x12, 0x00, 0x80, 0xfd, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x02, 0x02, 0x00, 0x02, 0x00, 0x02, 0x00, 0x02, 0x06, 0x14, 0x00, 0x00,
        0x00, 0x1e, 0xfd, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x01, 0x00, 0x01,
        0x00, 0x01, 0x00, 0x01,
    ];

    static DAO_ACK_PACKET: [u8; 4] = [0x00, 0x00, 0xf1, 0x00];

    fn dodag_id() -> Address {
        Address::new(0xfd00, 0, 0, 0, 0x0201, 0x0001, 0x0001, 0x0001)
    }

    fn dio_repr() -> DioRepr {
        DioRepr {
            rpl_instance_id: 0,
            version_number: 240,
            rank: 128,
            grounded: false,
            mode_of_operation: ModeOfOperation::NonStoringMode,
            dodag_preference: 0,
            dtsn: 240,
            dodag_id: dodag_id(),
            dag_config: None,
            prefix_info: None,
            route_info: None,
            timing: DioTiming::default(),
            metrics: MetricList::new(),
            metrics_truncated: false,
        }
    }

    #[test]
    fn dis_packet() {
        let packet =
            Packet::new_checked(&[][..], RplControlMessage::DodagInformationSolicitation).unwrap();
        assert_eq!(DisRepr::parse(&packet), Ok(DisRepr));
        assert!(packet.options().is_empty());

        let mut buffer = [0xffu8; 2];
        let mut packet =
            Packet::new_unchecked(&mut buffer[..], RplControlMessage::DodagInformationSolicitation);
        DisRepr.emit(&mut packet);
        assert_eq!(buffer, [0, 0]);
    }

    #[test]
    fn dio_packet() {
        let packet =
            Packet::new_checked(&DIO_PACKET[..], RplControlMessage::DodagInformationObject)
                .unwrap();
        assert_eq!(packet.rpl_instance_id(), 0);
        assert_eq!(packet.dio_version_number(), 240);
        assert_eq!(packet.dio_rank(), 128);
        assert!(!packet.dio_grounded());
        assert_eq!(
            packet.dio_mode_of_operation(),
            ModeOfOperation::NonStoringMode
        );
        assert_eq!(packet.dio_dodag_preference(), 0);
        assert_eq!(packet.dio_dest_adv_trigger_seq_number(), 240);
        assert_eq!(packet.dio_dodag_id(), dodag_id());

        let mut pool = MetricPool::new();
        let mut repr = DioRepr::parse(&packet).unwrap();
        repr.parse_options(&packet, &mut pool).unwrap();

        let conf = repr.dag_config.unwrap();
        assert_eq!(conf.dio_interval_doublings, 8);
        assert_eq!(conf.dio_interval_min, 12);
        assert_eq!(conf.max_rank_increase, 1024);
        assert_eq!(conf.min_hop_rank_increase, 128);
        assert_eq!(conf.default_lifetime, 30);
        assert_eq!(conf.lifetime_unit, 60);

        let info = repr.prefix_info.unwrap();
        assert_eq!(info.prefix_length, 64);
        assert_eq!(info.flags, 0x40);
        assert_eq!(info.lifetime, 0xffff_ffff);
        assert_eq!(info.prefix, Address::new(0xfd00, 0, 0, 0, 0, 0, 0, 0));

        assert!(repr.route_info.is_none());
        assert!(repr.metrics.is_empty());

        assert_eq!(repr.buffer_len(&[]), DIO_PACKET.len());
        let mut buffer = [0u8; 72];
        let mut packet =
            Packet::new_unchecked(&mut buffer[..], RplControlMessage::DodagInformationObject);
        repr.emit(&mut packet, &[]).unwrap();
        assert_eq!(buffer, DIO_PACKET);
    }

    #[test]
    fn dio_too_short() {
        assert_eq!(
            Packet::new_checked(&DIO_PACKET[..23], RplControlMessage::DodagInformationObject),
            Err(Error)
        );
    }

    #[test]
    fn dio_flag_octet() {
        let repr = DioRepr {
            grounded: true,
            mode_of_operation: ModeOfOperation::StoringModeWithMulticast,
            dodag_preference: 5,
            ..dio_repr()
        };

        let mut buffer = [0xffu8; 40];
        let mut packet =
            Packet::new_unchecked(&mut buffer[..], RplControlMessage::DodagInformationObject);
        repr.emit(&mut packet, &[]).unwrap();

        assert_eq!(buffer[4], 0x9d);
        assert_eq!(buffer[6..8], [0, 0]);

        let packet = Packet::new_checked(&buffer[..], RplControlMessage::DodagInformationObject)
            .unwrap();
        let parsed = DioRepr::parse(&packet).unwrap();
        assert!(parsed.grounded);
        assert_eq!(
            parsed.mode_of_operation,
            ModeOfOperation::StoringModeWithMulticast
        );
        assert_eq!(parsed.dodag_preference, 5);
    }

    #[test]
    fn dio_default_configuration() {
        let repr = dio_repr();
        let mut buffer = [0u8; 40];
        let mut packet =
            Packet::new_unchecked(&mut buffer[..], RplControlMessage::DodagInformationObject);
        repr.emit(&mut packet, &[]).unwrap();

        assert_eq!(buffer[24..26], [0x04, 0x0e]);
        assert_eq!(buffer[27], DEFAULT_DIO_INTERVAL_DOUBLINGS);
    }

    #[test]
    fn dio_with_metrics() {
        let metrics = [
            MetricContainer::new(MetricValue::HopCount(3)),
            MetricContainer::new(MetricValue::Latency(1000)),
        ];
        let repr = DioRepr {
            timing: DioTiming {
                dio_delay: 10,
                next_dio_time: 20,
                next_dio_delay: 30,
            },
            ..dio_repr()
        };

        let len = repr.buffer_len(&metrics);
        assert_eq!(len, 24 + 2 + 26 + 16);

        let mut buffer = [0u8; 68];
        let mut packet =
            Packet::new_unchecked(&mut buffer[..], RplControlMessage::DodagInformationObject);
        repr.emit(&mut packet, &metrics).unwrap();
        assert_eq!(buffer[24..26], [0x02, 26]);

        let packet = Packet::new_checked(&buffer[..], RplControlMessage::DodagInformationObject)
            .unwrap();
        let mut pool = MetricPool::new();
        let mut parsed = DioRepr::parse(&packet).unwrap();
        parsed.parse_options(&packet, &mut pool).unwrap();

        assert_eq!(parsed.timing, repr.timing);
        assert!(pool.iter(&parsed.metrics).copied().eq(metrics));
        assert!(parsed.dag_config.is_some());

        parsed.release(&mut pool);
        assert!(pool.is_empty());
    }

    #[test]
    fn dio_metric_container_trailer() {
        let metrics = [MetricContainer::new(MetricValue::Etx(128))];
        let repr = dio_repr();

        let mut buffer = [0xffu8; 64];
        let len = repr.buffer_len(&metrics);
        let mut packet = Packet::new_unchecked(
            &mut buffer[..len],
            RplControlMessage::DodagInformationObject,
        );
        repr.emit(&mut packet, &metrics).unwrap();

        let container_end = 24 + 2 + metric::declared_len(1);
        assert_eq!(
            buffer[container_end - RESERVED_TRAILER..container_end],
            [0, 0]
        );
    }

    #[test]
    fn dio_malformed_route_info_keeps_earlier_options() {
        let mut buffer = [0u8; 24 + 16 + 5 + 32];
        buffer[..24].copy_from_slice(&DIO_PACKET[..24]);
        buffer[24..40].copy_from_slice(&DIO_PACKET[24..40]);
        buffer[40..45].copy_from_slice(&[0x03, 0x03, 0x00, 0x00, 0x00]);
        buffer[45..].copy_from_slice(&DIO_PACKET[40..]);

        let packet = Packet::new_checked(&buffer[..], RplControlMessage::DodagInformationObject)
            .unwrap();
        let mut pool = MetricPool::new();
        let mut repr = DioRepr::parse(&packet).unwrap();

        assert_eq!(repr.parse_options(&packet, &mut pool), Err(Error));
        assert!(repr.dag_config.is_some());
        assert!(repr.route_info.is_none());
        assert!(repr.prefix_info.is_none());
    }

    #[test]
    fn dio_skips_unknown_sub_options() {
        let mut buffer = [0u8; 24 + 4 + 16];
        buffer[..24].copy_from_slice(&DIO_PACKET[..24]);
        buffer[24..28].copy_from_slice(&[0x2a, 0x02, 0xbe, 0xef]);
        buffer[28..].copy_from_slice(&DIO_PACKET[24..40]);

        let packet = Packet::new_checked(&buffer[..], RplControlMessage::DodagInformationObject)
            .unwrap();
        let mut pool = MetricPool::new();
        let mut repr = DioRepr::parse(&packet).unwrap();

        assert_eq!(repr.parse_options(&packet, &mut pool), Ok(()));
        assert!(repr.dag_config.is_some());
    }

    #[test]
    fn dao_packet() {
        let packet = Packet::new_checked(
            &DAO_PACKET[..],
            RplControlMessage::DestinationAdvertisementObject,
        )
        .unwrap();
        assert!(packet.dao_ack_request());
        assert!(!packet.dao_dodag_id_present());
        assert_eq!(packet.dao_sequence(), 241);
        assert_eq!(packet.dao_dodag_id(), None);

        let repr = DaoRepr::parse(&packet).unwrap();
        assert_eq!(repr.sequence, 241);
        assert_eq!(repr.target.prefix_length, 128);
        assert_eq!(
            repr.target.prefix,
            Address::new(0xfd00, 0, 0, 0, 0x0202, 0x0002, 0x0002, 0x0002)
        );
        assert_eq!(repr.lifetime, Some(30));
    }

    #[test]
    fn dao_emit() {
        let repr = DaoRepr {
            rpl_instance_id: 0x1e,
            flags: DaoFlags::EXPECT_ACK,
            sequence: 7,
            dodag_id: Some(dodag_id()),
            target: Target {
                prefix_length: 128,
                prefix: Address::new(0x2001, 0x0db8, 0, 0, 0, 0, 0, 1),
            },
            lifetime: Some(30),
        };

        let len = repr.buffer_len();
        assert_eq!(len, 20 + 20 + 6);

        let mut buffer = [0u8; 46];
        let mut packet = Packet::new_unchecked(
            &mut buffer[..],
            RplControlMessage::DestinationAdvertisementObject,
        );
        repr.emit(&mut packet).unwrap();

        assert_eq!(buffer[..4], [0x1e, 0xc0, 0x00, 0x07]);
        assert_eq!(buffer[40..], [0x06, 0x04, 0x00, 0x00, 0x00, 0x1e]);

        let packet = Packet::new_checked(
            &buffer[..],
            RplControlMessage::DestinationAdvertisementObject,
        )
        .unwrap();
        let parsed = DaoRepr::parse(&packet).unwrap();
        assert_eq!(parsed.dodag_id, Some(dodag_id()));
        assert_eq!(parsed.target, repr.target);
        assert_eq!(parsed.lifetime, Some(30));
        assert!(parsed.flags.contains(DaoFlags::EXPECT_ACK));
    }

    #[test]
    fn dao_without_target() {
        let packet = Packet::new_checked(
            &[0x00, 0x00, 0x00, 0x01, 0x06, 0x04, 0x00, 0x00, 0x00, 0x1e][..],
            RplControlMessage::DestinationAdvertisementObject,
        )
        .unwrap();
        assert_eq!(DaoRepr::parse(&packet), Err(Error));
    }

    #[test]
    fn dao_missing_dodag_id() {
        let mut buffer = [0u8; 12];
        buffer[1] = 0x40;
        assert_eq!(
            Packet::new_checked(
                &buffer[..],
                RplControlMessage::DestinationAdvertisementObject
            ),
            Err(Error)
        );
    }

    #[test]
    fn dao_ack_packet() {
        let packet = Packet::new_checked(
            &DAO_ACK_PACKET[..],
            RplControlMessage::DestinationAdvertisementObjectAck,
        )
        .unwrap();
        let repr = DaoAckRepr::parse(&packet).unwrap();
        assert_eq!(
            repr,
            DaoAckRepr {
                instance_id: 0,
                sequence: 241,
                status: 0,
            }
        );

        let mut buffer = [0xffu8; 4];
        let mut packet = Packet::new_unchecked(
            &mut buffer[..],
            RplControlMessage::DestinationAdvertisementObjectAck,
        );
        repr.emit(&mut packet);
        assert_eq!(buffer, DAO_ACK_PACKET);
    }

    #[test]
    fn unknown_message() {
        assert_eq!(
            Packet::new_checked(&DAO_ACK_PACKET[..], RplControlMessage::Unknown(0x8a)),
            Err(Error)
        );
    }
}
