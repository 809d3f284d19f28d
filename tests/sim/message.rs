use smolrpl::time::*;
use smolrpl::wire::*;

/// A control message that went over the air.
#[derive(Debug, Clone)]
pub struct Message {
    pub at: Instant,
    /// Index of the sending node.
    pub from: usize,
    pub src_addr: Ipv6Address,
    pub dst_addr: Ipv6Address,
    pub code: RplControlMessage,
    pub data: Vec<u8>,
}

impl Message {
    pub fn is_multicast(&self) -> bool {
        self.dst_addr.is_multicast()
    }

    pub fn is_dis(&self) -> bool {
        self.code == RplControlMessage::DodagInformationSolicitation
    }

    pub fn is_dio(&self) -> bool {
        self.code == RplControlMessage::DodagInformationObject
    }

    pub fn is_dao(&self) -> bool {
        self.code == RplControlMessage::DestinationAdvertisementObject
    }

    pub fn is_dao_ack(&self) -> bool {
        self.code == RplControlMessage::DestinationAdvertisementObjectAck
    }

    pub fn dao(&self) -> Option<RplDaoRepr> {
        if !self.is_dao() {
            return None;
        }
        let packet = RplPacket::new_checked(&self.data[..], self.code).ok()?;
        RplDaoRepr::parse(&packet).ok()
    }

    pub fn dao_ack(&self) -> Option<RplDaoAckRepr> {
        if !self.is_dao_ack() {
            return None;
        }
        let packet = RplPacket::new_checked(&self.data[..], self.code).ok()?;
        RplDaoAckRepr::parse(&packet).ok()
    }

    /// Return the types of the sub-options of a DIO.
    pub fn dio_option_types(&self) -> Vec<RplOptionType> {
        if !self.is_dio() {
            return vec![];
        }
        let Ok(packet) = RplPacket::new_checked(&self.data[..], self.code) else {
            return vec![];
        };
        RplOptionsIterator::new(packet.options())
            .filter_map(|option| option.ok())
            .map(|option| option.option_type)
            .collect()
    }
}
