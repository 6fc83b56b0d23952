//! Linux neighbor-table access via the `ip` utility.

use crate::{NeighborEntry, NeighborTable};
use async_trait::async_trait;
use rasteer_core::{Error, MacAddr, Result};
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::{debug, warn};

/// Reads `ip neigh show` output for one interface.
#[derive(Debug, Clone)]
pub struct LinuxNeighborTable {
    interface: String,
}

impl LinuxNeighborTable {
    pub fn new(interface: &str) -> Self {
        Self {
            interface: interface.to_string(),
        }
    }

    async fn ip_neigh(&self, family: &str, extra: &[&str]) -> Result<String> {
        let mut args = vec![family, "neigh", "show"];
        args.extend_from_slice(extra);
        args.extend_from_slice(&["dev", &self.interface]);

        let output = tokio::process::Command::new("ip")
            .args(&args)
            .output()
            .await
            .map_err(|e| Error::Neighbor(format!("failed to run ip: {e}")))?;

        if !output.status.success() {
            return Err(Error::Neighbor(format!(
                "ip {family} neigh show failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl NeighborTable for LinuxNeighborTable {
    async fn scan(&self) -> Result<Vec<NeighborEntry>> {
        if !cfg!(target_os = "linux") {
            return Ok(Vec::new());
        }

        let output = self.ip_neigh("-6", &[]).await?;
        Ok(parse_ipv6_neighbors(&output))
    }

    async fn refresh(&self) {
        if !cfg!(target_os = "linux") {
            return;
        }

        // Two pings to ff02::1 make every live host answer, repopulating
        // the kernel table before we read it.
        let result = tokio::process::Command::new("ping")
            .args(["-6", "-c", "2", "-W", "1", "-I", &self.interface, "ff02::1"])
            .output()
            .await;

        match result {
            Ok(o) if o.status.success() => debug!(interface = %self.interface, "neighbor refresh done"),
            Ok(_) => debug!(interface = %self.interface, "neighbor refresh ping got no replies"),
            Err(e) => warn!(interface = %self.interface, error = %e, "neighbor refresh failed"),
        }
    }

    async fn ipv4_to_mac(&self, ip: Ipv4Addr) -> Result<Option<MacAddr>> {
        if !cfg!(target_os = "linux") {
            return Ok(None);
        }

        // Poke the address first so the kernel performs ARP resolution if
        // the entry is missing or stale.
        let _ = tokio::process::Command::new("ping")
            .args(["-c", "1", "-W", "1", &ip.to_string()])
            .output()
            .await;

        let ip_text = ip.to_string();
        let output = self.ip_neigh("-4", &[ip_text.as_str()]).await?;
        Ok(parse_lladdr(&output))
    }
}

/// Parse `ip -6 neigh show` output into link-local entries.
///
/// Accepts both the `dev`-qualified and the per-interface form:
/// `fe80::8c3:39ff:fe21:3863 dev eth0 lladdr 0a:0b:0c:0d:0e:0f STALE`
/// `fe80::8c3:39ff:fe21:3863 lladdr 0a:0b:0c:0d:0e:0f REACHABLE`
fn parse_ipv6_neighbors(output: &str) -> Vec<NeighborEntry> {
    let mut result = Vec::new();

    for line in output.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(addr_token) = tokens.first() else {
            continue;
        };
        let Ok(addr) = addr_token.parse::<Ipv6Addr>() else {
            continue;
        };
        if addr.segments()[0] & 0xffc0 != 0xfe80 {
            continue;
        }

        let Some(mac) = find_lladdr(&tokens) else {
            continue;
        };

        result.push(NeighborEntry {
            local_ipv6: addr,
            mac,
        });
    }

    result
}

fn parse_lladdr(output: &str) -> Option<MacAddr> {
    output.lines().find_map(|line| {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        find_lladdr(&tokens)
    })
}

fn find_lladdr(tokens: &[&str]) -> Option<MacAddr> {
    tokens
        .iter()
        .position(|t| *t == "lladdr")
        .and_then(|i| tokens.get(i + 1))
        .and_then(|t| t.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dev_qualified_lines() {
        let output = "\
fe80::8c3:39ff:fe21:3863 dev eth0 lladdr 0a:0b:0c:0d:0e:0f STALE
2001:db8::5 dev eth0 lladdr aa:bb:cc:dd:ee:ff REACHABLE
fe80::1 dev eth0  FAILED
";
        let entries = parse_ipv6_neighbors(output);

        // Only link-local entries with a known lladdr survive
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].local_ipv6,
            "fe80::8c3:39ff:fe21:3863".parse::<Ipv6Addr>().unwrap()
        );
        assert_eq!(entries[0].mac, "0a:0b:0c:0d:0e:0f".parse().unwrap());
    }

    #[test]
    fn test_parse_per_interface_form() {
        let output = "fe80::d08c:f5ff:fee1:b4f4 lladdr d2:8c:f5:e1:b4:f4 REACHABLE\n";
        let entries = parse_ipv6_neighbors(output);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].mac, "d2:8c:f5:e1:b4:f4".parse().unwrap());
    }

    #[test]
    fn test_parse_ipv4_lladdr() {
        let output = "192.168.1.23 lladdr 9c:9e:d5:48:01:cf REACHABLE\n";
        assert_eq!(
            parse_lladdr(output),
            Some("9c:9e:d5:48:01:cf".parse().unwrap())
        );
        assert_eq!(parse_lladdr("192.168.1.23  FAILED\n"), None);
    }
}
