//! Passive neighbor-table inspection for rasteer
//!
//! The engine wants to know which link-local IPv6 address belongs to a
//! device MAC, and the control plane exposes the observed neighbors for
//! display. Both go through the [`NeighborTable`] capability trait so the
//! engine and its tests never need kernel access: the Linux
//! implementation shells out to `ip neigh`, and [`StaticNeighborTable`]
//! serves fixed entries.

pub mod linux;

use async_trait::async_trait;
use rasteer_core::{MacAddr, Result};
use std::net::{Ipv4Addr, Ipv6Addr};

pub use linux::LinuxNeighborTable;

/// One observed IPv6 neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborEntry {
    pub local_ipv6: Ipv6Addr,
    pub mac: MacAddr,
}

/// Read access to the host's neighbor tables.
#[async_trait]
pub trait NeighborTable: Send + Sync {
    /// Link-local IPv6 neighbors currently known on the interface.
    async fn scan(&self) -> Result<Vec<NeighborEntry>>;

    /// Nudge the kernel into repopulating its neighbor table, typically
    /// by pinging the all-nodes group. Best-effort; failures are ignored.
    async fn refresh(&self) {}

    /// Resolve an IPv4 address to its MAC via the IPv4 neighbor table.
    async fn ipv4_to_mac(&self, ip: Ipv4Addr) -> Result<Option<MacAddr>>;

    /// First link-local address observed for the given MAC.
    async fn link_local_for(&self, mac: MacAddr) -> Option<Ipv6Addr> {
        self.scan()
            .await
            .ok()?
            .into_iter()
            .find(|entry| entry.mac == mac)
            .map(|entry| entry.local_ipv6)
    }
}

/// A neighbor table with fixed contents, for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct StaticNeighborTable {
    entries: Vec<NeighborEntry>,
}

impl StaticNeighborTable {
    pub fn new(entries: Vec<NeighborEntry>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl NeighborTable for StaticNeighborTable {
    async fn scan(&self) -> Result<Vec<NeighborEntry>> {
        Ok(self.entries.clone())
    }

    async fn ipv4_to_mac(&self, _ip: Ipv4Addr) -> Result<Option<MacAddr>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_table_lookup() {
        let mac: MacAddr = "d2:8c:f5:e1:b4:f4".parse().unwrap();
        let lla: Ipv6Addr = "fe80::d08c:f5ff:fee1:b4f4".parse().unwrap();
        let table = StaticNeighborTable::new(vec![NeighborEntry {
            local_ipv6: lla,
            mac,
        }]);

        assert_eq!(table.link_local_for(mac).await, Some(lla));
        assert_eq!(
            table
                .link_local_for("aa:aa:aa:aa:aa:aa".parse().unwrap())
                .await,
            None
        );
    }
}
