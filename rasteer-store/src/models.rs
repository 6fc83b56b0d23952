//! Topology records: tags, devices, and gateways.
//!
//! A tag groups devices with the gateways that may serve them and carries
//! the DNS servers advertised to that group. Devices and gateways are
//! keyed by MAC address; tags get a store-assigned numeric id that never
//! changes once issued.

use rasteer_core::MacAddr;
use serde::{Deserialize, Serialize};
use std::net::Ipv6Addr;

/// A device group and its advertised DNS servers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub tag_id: u32,
    pub alias: String,
    /// May be empty; an empty list means no RDNSS option is advertised.
    #[serde(default)]
    pub dns: Vec<Ipv6Addr>,
}

/// A client host to be steered, keyed by MAC address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub mac: MacAddr,
    /// May reference a tag that currently has no gateways (or no longer
    /// exists); such a device is skipped each cycle, not an error.
    pub tag_id: u32,
    #[serde(default)]
    pub alias: Option<String>,
}

/// A candidate redirect target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gateway {
    pub mac: MacAddr,
    pub tag_id: u32,
    #[serde(default)]
    pub alias: Option<String>,
    /// Link-local address advertised as the spoofed RA source.
    pub local_ipv6: Ipv6Addr,
}
