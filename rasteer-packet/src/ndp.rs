//! ICMPv6 Router Advertisement and Neighbor Discovery options
//!
//! Wire encoding per RFC 4861 (RA, Prefix Information, Source Link-Layer
//! Address) and RFC 8106 (Recursive DNS Server). Option lengths are in
//! units of 8 octets and every option is padded to that boundary.

use crate::checksum::icmpv6_checksum;
use rasteer_core::MacAddr;
use std::net::Ipv6Addr;

/// ICMPv6 message type for Router Advertisement
pub const ICMPV6_ROUTER_ADVERTISEMENT: u8 = 134;

/// Neighbor Discovery option types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NdpOptionType {
    SourceLinkLayerAddress = 1,
    TargetLinkLayerAddress = 2,
    PrefixInformation = 3,
    RedirectedHeader = 4,
    Mtu = 5,
    RecursiveDnsServer = 25, // RFC 8106
}

impl NdpOptionType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::SourceLinkLayerAddress),
            2 => Some(Self::TargetLinkLayerAddress),
            3 => Some(Self::PrefixInformation),
            4 => Some(Self::RedirectedHeader),
            5 => Some(Self::Mtu),
            25 => Some(Self::RecursiveDnsServer),
            _ => None,
        }
    }
}

/// A Neighbor Discovery option (type + length + body)
#[derive(Debug, Clone)]
pub struct NdpOption {
    pub option_type: NdpOptionType,
    pub data: Vec<u8>,
}

impl NdpOption {
    /// Source Link-Layer Address option.
    ///
    /// Recipients bind the advertisement's IPv6 source address to this MAC
    /// in their neighbor cache, so it must name the link-layer address that
    /// will actually answer traffic for the advertised router.
    pub fn source_ll_addr(mac: MacAddr) -> Self {
        Self {
            option_type: NdpOptionType::SourceLinkLayerAddress,
            data: mac.octets().to_vec(),
        }
    }

    /// Prefix Information option.
    pub fn prefix_information(
        prefix: Ipv6Addr,
        prefix_len: u8,
        on_link: bool,
        autonomous: bool,
        valid_lifetime: u32,
        preferred_lifetime: u32,
    ) -> Self {
        let mut data = Vec::with_capacity(30);

        data.push(prefix_len);

        let mut flags = 0u8;
        if on_link {
            flags |= 0x80;
        }
        if autonomous {
            flags |= 0x40;
        }
        data.push(flags);

        data.extend_from_slice(&valid_lifetime.to_be_bytes());
        data.extend_from_slice(&preferred_lifetime.to_be_bytes());
        data.extend_from_slice(&[0u8; 4]); // Reserved
        data.extend_from_slice(&prefix.octets());

        Self {
            option_type: NdpOptionType::PrefixInformation,
            data,
        }
    }

    /// Recursive DNS Server option (RDNSS).
    pub fn rdnss(lifetime: u32, servers: &[Ipv6Addr]) -> Self {
        let mut data = Vec::with_capacity(6 + servers.len() * 16);
        data.extend_from_slice(&[0u8; 2]); // Reserved
        data.extend_from_slice(&lifetime.to_be_bytes());
        for server in servers {
            data.extend_from_slice(&server.octets());
        }
        Self {
            option_type: NdpOptionType::RecursiveDnsServer,
            data,
        }
    }

    /// Encode the option as type + length + data, padded to an 8-octet
    /// boundary. Length is in units of 8 octets.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.push(self.option_type as u8);

        let total_len = 2 + self.data.len();
        let len_8octets = total_len.div_ceil(8) as u8;
        bytes.push(len_8octets);

        bytes.extend_from_slice(&self.data);
        bytes.resize(len_8octets as usize * 8, 0);

        bytes
    }

    /// Parse one option, returning it and the number of bytes consumed.
    pub fn from_bytes(data: &[u8]) -> Option<(Self, usize)> {
        if data.len() < 2 {
            return None;
        }

        let option_type = NdpOptionType::from_u8(data[0])?;
        let total_bytes = data[1] as usize * 8;
        if total_bytes == 0 || data.len() < total_bytes {
            return None;
        }

        Some((
            Self {
                option_type,
                data: data[2..total_bytes].to_vec(),
            },
            total_bytes,
        ))
    }
}

/// ICMPv6 Router Advertisement message
#[derive(Debug, Clone)]
pub struct RouterAdvertisement {
    pub cur_hop_limit: u8,
    /// M flag: addresses via DHCPv6
    pub managed_flag: bool,
    /// O flag: other configuration via DHCPv6
    pub other_config_flag: bool,
    pub router_lifetime: u16,
    pub reachable_time: u32,
    pub retrans_timer: u32,
    pub options: Vec<NdpOption>,
}

impl Default for RouterAdvertisement {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterAdvertisement {
    /// Size of the fixed part of the message (header + RA fields)
    pub const BASE_SIZE: usize = 16;

    pub fn new() -> Self {
        Self {
            cur_hop_limit: 64,
            managed_flag: false,
            other_config_flag: false,
            router_lifetime: 1800,
            reachable_time: 0,
            retrans_timer: 0,
            options: vec![],
        }
    }

    pub fn with_router_lifetime(mut self, lifetime: u16) -> Self {
        self.router_lifetime = lifetime;
        self
    }

    pub fn with_prefix(
        mut self,
        prefix: Ipv6Addr,
        prefix_len: u8,
        valid_lifetime: u32,
        preferred_lifetime: u32,
    ) -> Self {
        self.options.push(NdpOption::prefix_information(
            prefix,
            prefix_len,
            true, // on-link
            true, // autonomous (SLAAC)
            valid_lifetime,
            preferred_lifetime,
        ));
        self
    }

    pub fn with_source_ll(mut self, mac: MacAddr) -> Self {
        self.options.push(NdpOption::source_ll_addr(mac));
        self
    }

    pub fn with_rdnss(mut self, lifetime: u32, servers: &[Ipv6Addr]) -> Self {
        self.options.push(NdpOption::rdnss(lifetime, servers));
        self
    }

    /// Encode the full ICMPv6 message with a zeroed checksum field.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::BASE_SIZE);

        bytes.push(ICMPV6_ROUTER_ADVERTISEMENT);
        bytes.push(0); // Code
        bytes.extend_from_slice(&[0, 0]); // Checksum, filled in later

        bytes.push(self.cur_hop_limit);

        let mut flags = 0u8;
        if self.managed_flag {
            flags |= 0x80;
        }
        if self.other_config_flag {
            flags |= 0x40;
        }
        bytes.push(flags);

        bytes.extend_from_slice(&self.router_lifetime.to_be_bytes());
        bytes.extend_from_slice(&self.reachable_time.to_be_bytes());
        bytes.extend_from_slice(&self.retrans_timer.to_be_bytes());

        for option in &self.options {
            bytes.extend_from_slice(&option.to_bytes());
        }

        bytes
    }

    /// Encode the message with the checksum computed over the IPv6
    /// pseudo-header for the given source and destination addresses.
    pub fn to_bytes_checksummed(&self, src: &Ipv6Addr, dst: &Ipv6Addr) -> Vec<u8> {
        let mut bytes = self.to_bytes();
        let checksum = icmpv6_checksum(src, dst, &bytes);
        bytes[2..4].copy_from_slice(&checksum.to_be_bytes());
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::{validate_checksum, IPPROTO_ICMPV6};

    #[test]
    fn test_option_lengths() {
        let sll = NdpOption::source_ll_addr(MacAddr([0, 0x11, 0x22, 0x33, 0x44, 0x55]));
        let bytes = sll.to_bytes();
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[1], 1); // 8 octets
        assert_eq!(bytes.len(), 8);

        let pio = NdpOption::prefix_information(
            "2001:db8::".parse().unwrap(),
            64,
            true,
            true,
            300,
            300,
        );
        let bytes = pio.to_bytes();
        assert_eq!(bytes[0], 3);
        assert_eq!(bytes[1], 4); // 32 octets
        assert_eq!(bytes.len(), 32);

        let rdnss = NdpOption::rdnss(
            300,
            &["2001:db8::1".parse().unwrap(), "2400:3200::1".parse().unwrap()],
        );
        let bytes = rdnss.to_bytes();
        assert_eq!(bytes[0], 25);
        assert_eq!(bytes[1], 5); // 8 + 2*16 octets
        assert_eq!(bytes.len(), 40);
    }

    #[test]
    fn test_prefix_information_fields() {
        let prefix: Ipv6Addr = "2001:db8::".parse().unwrap();
        let pio = NdpOption::prefix_information(prefix, 64, true, true, 300, 300);
        let bytes = pio.to_bytes();

        assert_eq!(bytes[2], 64); // prefix length
        assert_eq!(bytes[3], 0xC0); // L=1, A=1
        assert_eq!(u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 300);
        assert_eq!(u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]), 300);
        assert_eq!(&bytes[16..32], &prefix.octets());
    }

    #[test]
    fn test_ra_base_encoding() {
        let ra = RouterAdvertisement::new().with_router_lifetime(300);
        let bytes = ra.to_bytes();

        assert_eq!(bytes.len(), RouterAdvertisement::BASE_SIZE);
        assert_eq!(bytes[0], 134); // type
        assert_eq!(bytes[1], 0); // code
        assert_eq!(bytes[4], 64); // cur hop limit
        assert_eq!(bytes[5], 0); // M=0, O=0
        assert_eq!(u16::from_be_bytes([bytes[6], bytes[7]]), 300);
        assert_eq!(&bytes[8..16], &[0u8; 8]); // reachable + retrans
    }

    #[test]
    fn test_ra_flags() {
        let mut ra = RouterAdvertisement::new();
        ra.managed_flag = true;
        ra.other_config_flag = true;
        assert_eq!(ra.to_bytes()[5], 0xC0);
    }

    #[test]
    fn test_checksummed_message_validates() {
        let src: Ipv6Addr = "fe80::1".parse().unwrap();
        let dst: Ipv6Addr = "ff02::1".parse().unwrap();

        let ra = RouterAdvertisement::new()
            .with_router_lifetime(300)
            .with_prefix("2001:db8::".parse().unwrap(), 64, 300, 300)
            .with_source_ll(MacAddr([0x6e, 0x80, 0x5a, 0xe0, 0x46, 0xfe]));

        let msg = ra.to_bytes_checksummed(&src, &dst);

        let mut pseudo = Vec::new();
        pseudo.extend_from_slice(&src.octets());
        pseudo.extend_from_slice(&dst.octets());
        pseudo.extend_from_slice(&(msg.len() as u32).to_be_bytes());
        pseudo.extend_from_slice(&[0, 0, 0, IPPROTO_ICMPV6]);
        pseudo.extend_from_slice(&msg);
        assert!(validate_checksum(&pseudo));
    }

    #[test]
    fn test_option_parse_roundtrip() {
        let rdnss = NdpOption::rdnss(300, &["2001:db8::1".parse().unwrap()]);
        let bytes = rdnss.to_bytes();
        let (parsed, consumed) = NdpOption::from_bytes(&bytes).unwrap();

        assert_eq!(consumed, bytes.len());
        assert_eq!(parsed.option_type, NdpOptionType::RecursiveDnsServer);
        assert_eq!(parsed.data, rdnss.data);
    }

    #[test]
    fn test_option_rejects_zero_length() {
        assert!(NdpOption::from_bytes(&[1, 0, 0, 0]).is_none());
    }
}
