//! Network interface access
//!
//! The engine transmits prebuilt Ethernet frames on one configured
//! interface. Interface lookup and raw-frame transmission go through
//! `pnet_datalink`; a persistent sender is created once at startup and
//! shared across all per-device sends.

use crate::{Error, MacAddr};
use pnet_datalink::{self, Channel, DataLinkSender};
use std::fmt;
use std::net::Ipv6Addr;
use std::sync::{Arc, Mutex};

/// A transmit interface
#[derive(Debug, Clone)]
pub struct Interface {
    /// Interface name (e.g., "br0", "eth0")
    pub name: String,
    /// Interface index
    pub index: u32,
    /// Hardware address of the interface itself; used as the Ethernet
    /// source of every transmitted frame
    pub mac_address: MacAddr,
    /// Is the interface up?
    pub is_up: bool,
}

impl Interface {
    /// Create an interface description without consulting the OS.
    pub fn new(name: String, index: u32, mac_address: MacAddr) -> Self {
        Self {
            name,
            index,
            mac_address,
            is_up: true,
        }
    }

    /// Look up an interface by name.
    pub fn by_name(name: &str) -> Result<Self, Error> {
        let interfaces = pnet_datalink::interfaces();
        let iface = interfaces
            .into_iter()
            .find(|i| i.name == name)
            .ok_or_else(|| Error::InterfaceNotFound(name.to_string()))?;

        let mac_bytes = iface
            .mac
            .map(|mac| [mac.0, mac.1, mac.2, mac.3, mac.4, mac.5])
            .unwrap_or([0; 6]);

        Ok(Self {
            name: iface.name.clone(),
            index: iface.index,
            mac_address: MacAddr(mac_bytes),
            is_up: iface.is_up(),
        })
    }

    /// List all interfaces known to the OS.
    pub fn list_all() -> Result<Vec<Self>, Error> {
        let interfaces = pnet_datalink::interfaces();

        Ok(interfaces
            .into_iter()
            .map(|iface| {
                let mac_bytes = iface
                    .mac
                    .map(|mac| [mac.0, mac.1, mac.2, mac.3, mac.4, mac.5])
                    .unwrap_or([0; 6]);

                Self {
                    name: iface.name.clone(),
                    index: iface.index,
                    mac_address: MacAddr(mac_bytes),
                    is_up: iface.is_up(),
                }
            })
            .collect())
    }

    /// First link-local IPv6 address assigned to this interface, if any.
    pub fn link_local(&self) -> Option<Ipv6Addr> {
        let interfaces = pnet_datalink::interfaces();
        let interface = interfaces.into_iter().find(|iface| iface.name == self.name)?;

        for ip_network in interface.ips {
            if let ipnetwork::IpNetwork::V6(v6_net) = ip_network {
                let addr = v6_net.ip();
                if addr.segments()[0] & 0xffc0 == 0xfe80 {
                    return Some(addr);
                }
            }
        }

        None
    }

    /// Send a single raw frame, opening a throwaway channel.
    ///
    /// Prefer [`Interface::create_sender`] when sending more than once.
    pub fn send_raw(&self, frame: &[u8]) -> Result<(), Error> {
        let sender = self.create_sender()?;
        let mut tx = sender.lock().map_err(|_| {
            Error::Interface("sender lock poisoned".to_string())
        })?;
        send_on(&mut **tx, frame)
    }

    /// Create a persistent sender for this interface.
    ///
    /// The returned handle can be cloned across tasks; the inner mutex
    /// serializes writes because `pnet` senders are not safe for
    /// uncoordinated concurrent use.
    pub fn create_sender(&self) -> Result<Arc<Mutex<Box<dyn DataLinkSender>>>, Error> {
        let interfaces = pnet_datalink::interfaces();
        let interface = interfaces
            .into_iter()
            .find(|iface| iface.name == self.name)
            .ok_or_else(|| Error::InterfaceNotFound(self.name.clone()))?;

        let (tx, _) = match pnet_datalink::channel(&interface, Default::default()) {
            Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
            Ok(_) => return Err(Error::Interface("unsupported channel type".to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(Error::InsufficientPrivileges(format!(
                    "raw socket on {}: {e}",
                    self.name
                )))
            }
            Err(e) => {
                return Err(Error::Interface(format!(
                    "failed to open channel on {}: {e}",
                    self.name
                )))
            }
        };

        Ok(Arc::new(Mutex::new(tx)))
    }
}

/// Send one frame on an already-open sender.
pub fn send_on(tx: &mut dyn DataLinkSender, frame: &[u8]) -> Result<(), Error> {
    tx.send_to(frame, None)
        .ok_or_else(|| Error::Interface("send queue unavailable".to_string()))?
        .map_err(|e| Error::Interface(format!("send error: {e}")))?;
    Ok(())
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.mac_address)
    }
}
