//! Common types used throughout rasteer

use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// MAC Address (6 bytes)
///
/// The canonical textual form is lowercase colon-separated
/// (`aa:bb:cc:dd:ee:ff`); parsing additionally accepts `-` separators and
/// uppercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// Create a new MAC address
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Broadcast MAC address (ff:ff:ff:ff:ff:ff)
    pub const fn broadcast() -> Self {
        Self([0xff, 0xff, 0xff, 0xff, 0xff, 0xff])
    }

    /// Zero MAC address (00:00:00:00:00:00)
    pub const fn zero() -> Self {
        Self([0x00, 0x00, 0x00, 0x00, 0x00, 0x00])
    }

    /// Link-layer multicast address for the IPv6 all-nodes group `ff02::1`
    /// (33:33:00:00:00:01)
    pub const ALL_NODES: Self = Self([0x33, 0x33, 0x00, 0x00, 0x00, 0x01]);

    /// Get bytes as slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Convert to array
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Is this a link-layer multicast address? (bit 0 of the first octet)
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 == 0x01
    }

    /// The MAC address as one big-endian 48-bit integer.
    ///
    /// This is the device key used for gateway load balancing: the 12 hex
    /// digits of the normalized address read as a single number.
    pub fn to_u48(&self) -> u64 {
        self.0.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
    }

    /// Derive the EUI-64 link-local IPv6 address for this MAC.
    ///
    /// Flips the universal/local bit of the first octet and inserts `ff:fe`
    /// in the middle, yielding `fe80::xxxx:xxff:fexx:xxxx`.
    pub fn eui64_link_local(&self) -> Ipv6Addr {
        let m = self.0;
        Ipv6Addr::new(
            0xfe80,
            0,
            0,
            0,
            u16::from_be_bytes([m[0] ^ 0x02, m[1]]),
            u16::from_be_bytes([m[2], 0xff]),
            u16::from_be_bytes([0xfe, m[3]]),
            u16::from_be_bytes([m[4], m[5]]),
        )
    }

    /// Map an IPv6 multicast address to its link-layer multicast address
    /// (`33:33` followed by the last four octets of the group address).
    pub fn ipv6_multicast(group: Ipv6Addr) -> Self {
        let o = group.octets();
        Self([0x33, 0x33, o[12], o[13], o[14], o[15]])
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl FromStr for MacAddr {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != ':' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        if normalized.len() != 12 {
            return Err(crate::Error::invalid_address(
                s,
                "expected 6 octets of hex",
            ));
        }

        let mut bytes = [0u8; 6];
        for (i, chunk) in normalized.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| crate::Error::invalid_address(s, "invalid hex"))?;
            bytes[i] = u8::from_str_radix(pair, 16)
                .map_err(|_| crate::Error::invalid_address(s, "invalid hex"))?;
        }

        Ok(MacAddr(bytes))
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// IPv6 all-nodes multicast group (ff02::1)
pub const ALL_NODES_ADDR: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 1);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_lowercase_colon_form() {
        let mac = MacAddr([0xAA, 0xBB, 0xCC, 0x00, 0x11, 0x22]);
        assert_eq!(mac.to_string(), "aa:bb:cc:00:11:22");
    }

    #[test]
    fn test_parse_separator_variants() {
        let canonical: MacAddr = "aa:bb:cc:dd:ee:01".parse().unwrap();
        assert_eq!("AA-BB-CC-DD-EE-01".parse::<MacAddr>().unwrap(), canonical);
        assert_eq!("aabbccddee01".parse::<MacAddr>().unwrap(), canonical);
        assert!("aa:bb:cc:dd:ee".parse::<MacAddr>().is_err());
        assert!("aa:bb:cc:dd:ee:zz".parse::<MacAddr>().is_err());
    }

    #[test]
    fn test_to_u48_is_big_endian() {
        let mac = MacAddr([0x00, 0x00, 0x00, 0x00, 0x01, 0x02]);
        assert_eq!(mac.to_u48(), 0x0102);

        let mac: MacAddr = "aa:bb:cc:dd:ee:ff".parse().unwrap();
        assert_eq!(mac.to_u48(), 0xaabb_ccdd_eeff);
    }

    #[test]
    fn test_eui64_link_local() {
        // 6e:80:5a:e0:46:fe -> fe80::6c80:5aff:fee0:46fe
        let mac: MacAddr = "6e:80:5a:e0:46:fe".parse().unwrap();
        let expected: Ipv6Addr = "fe80::6c80:5aff:fee0:46fe".parse().unwrap();
        assert_eq!(mac.eui64_link_local(), expected);
    }

    #[test]
    fn test_ipv6_multicast_mapping() {
        assert_eq!(MacAddr::ipv6_multicast(ALL_NODES_ADDR), MacAddr::ALL_NODES);

        let solicited: Ipv6Addr = "ff02::1:ff28:9c5a".parse().unwrap();
        assert_eq!(
            MacAddr::ipv6_multicast(solicited),
            MacAddr([0x33, 0x33, 0xff, 0x28, 0x9c, 0x5a])
        );
    }

    #[test]
    fn test_multicast_detection() {
        assert!(MacAddr::ALL_NODES.is_multicast());
        assert!(MacAddr::broadcast().is_multicast());
        assert!(!"aa:bb:cc:dd:ee:01"
            .parse::<MacAddr>()
            .unwrap()
            .is_multicast());
    }

    #[test]
    fn test_serde_round_trip() {
        let mac: MacAddr = "aa:bb:cc:dd:ee:01".parse().unwrap();
        let json = serde_json::to_string(&mac).unwrap();
        assert_eq!(json, "\"aa:bb:cc:dd:ee:01\"");
        let back: MacAddr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mac);
    }
}
