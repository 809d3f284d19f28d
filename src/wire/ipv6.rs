/// Size of IPv6 address in octets.
pub const ADDR_SIZE: usize = 16;

/// The link-local [all RPL nodes multicast address].
///
/// [all RPL nodes multicast address]: https://www.rfc-editor.org/rfc/rfc6550.html#section-20.19
pub const LINK_LOCAL_ALL_RPL_NODES: Address = Address::new(0xff02, 0, 0, 0, 0, 0, 0, 0x1a);

pub use core::net::Ipv6Addr as Address;

pub(crate) trait AddressExt {
    /// Construct an IPv6 address from a prefix of at most sixteen octets, in big-endian.
    /// Missing trailing octets are zero.
    fn from_prefix_bytes(data: &[u8]) -> Address;

    /// Query whether the IPv6 address is an [unicast address].
    ///
    /// [unicast address]: https://tools.ietf.org/html/rfc4291#section-2.5
    ///
    /// `x_` prefix is to avoid a collision with the still-unstable method in `core::ip`.
    fn x_is_unicast(&self) -> bool;

    /// Query whether the IPv6 address is in the [link-local] scope.
    ///
    /// [link-local]: https://tools.ietf.org/html/rfc4291#section-2.5.6
    fn is_link_local(&self) -> bool;

    /// Return the address with every bit past `prefix_len` cleared.
    fn masked(&self, prefix_len: u8) -> Address;
}

impl AddressExt for Address {
    fn from_prefix_bytes(data: &[u8]) -> Address {
        let mut bytes = [0; ADDR_SIZE];
        let len = data.len().min(ADDR_SIZE);
        bytes[..len].copy_from_slice(&data[..len]);
        Address::from(bytes)
    }

    fn x_is_unicast(&self) -> bool {
        !(self.is_multicast() || self.is_unspecified())
    }

    fn is_link_local(&self) -> bool {
        self.octets()[0..8] == [0xfe, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
    }

    fn masked(&self, prefix_len: u8) -> Address {
        let prefix_len = prefix_len.min(128) as usize;
        let mut bytes = self.octets();
        let idx = prefix_len / 8;
        if idx < ADDR_SIZE {
            bytes[idx] &= !(0xffu8 >> (prefix_len % 8));
            bytes[idx + 1..].fill(0);
        }
        Address::from(bytes)
    }
}
