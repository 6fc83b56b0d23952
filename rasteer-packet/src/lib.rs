//! Packet construction library for rasteer
//!
//! Wire-exact construction of the spoofed Router Advertisement frames the
//! engine transmits, from layer 2 up:
//!
//! - **Ethernet II frames** ([`ethernet`])
//! - **IPv6 packets** with forged source addresses ([`ipv6`])
//! - **ICMPv6 Router Advertisements** and their Neighbor Discovery
//!   options: Prefix Information, Source Link-Layer Address, Recursive
//!   DNS Server ([`ndp`])
//! - **Checksums**: RFC 1071 Internet checksum and the ICMPv6
//!   pseudo-header variant ([`checksum`])
//! - **A frame builder** that ties the pieces together and preserves the
//!   gateway-identity invariant ([`builder`])
//!
//! # Quick start
//!
//! ```
//! use rasteer_core::MacAddr;
//! use rasteer_packet::builder::{AdvertisedRouter, RaDestination, RaFrameBuilder};
//!
//! let gateway = AdvertisedRouter {
//!     mac: "6e:80:5a:e0:46:fe".parse().unwrap(),
//!     link_local: "fe80::6c80:5aff:fee0:46fe".parse().unwrap(),
//! };
//! let transmit_mac: MacAddr = "02:00:00:00:00:01".parse().unwrap();
//!
//! let frame = RaFrameBuilder::new(gateway, transmit_mac)
//!     .destination(RaDestination::AllNodes)
//!     .prefix("2001:db8::".parse().unwrap(), 64)
//!     .router_lifetime(300)
//!     .build()
//!     .unwrap();
//! ```

pub mod builder;
pub mod checksum;
pub mod ethernet;
pub mod ipv6;
pub mod ndp;

// Re-export commonly used types for convenience
pub use builder::{AdvertisedRouter, RaDestination, RaFrameBuilder};
pub use checksum::{icmpv6_checksum, internet_checksum};
pub use ethernet::{EtherType, EthernetFrame};
pub use ipv6::{Ipv6Packet, NextHeader};
pub use ndp::{NdpOption, NdpOptionType, RouterAdvertisement};
