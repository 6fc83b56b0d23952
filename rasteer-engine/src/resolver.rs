//! Device-to-gateway assignment
//!
//! Each device is mapped onto exactly one gateway from its tag group by a
//! modulo hash of the device MAC. The mapping is a pure function of the
//! MAC and the ordered gateway list, so it is stable across cycles while
//! the gateway set is unchanged.
//!
//! This is a load-balancing hash, not consistent hashing: adding or
//! removing a gateway can reassign many devices, not just the minimum
//! necessary. Known limitation, kept as-is.

use rasteer_store::{Device, Gateway};
use std::collections::BTreeMap;

/// Gateways grouped by tag, each group in a stable order.
///
/// Groups are ordered ascending by gateway MAC; the order only changes
/// when membership does, which keeps assignments from churning between
/// cycles.
pub struct GatewayGroups<'a> {
    by_tag: BTreeMap<u32, Vec<&'a Gateway>>,
}

impl<'a> GatewayGroups<'a> {
    pub fn new(gateways: &'a [Gateway]) -> Self {
        let mut by_tag: BTreeMap<u32, Vec<&'a Gateway>> = BTreeMap::new();
        for gateway in gateways {
            by_tag.entry(gateway.tag_id).or_default().push(gateway);
        }
        for group in by_tag.values_mut() {
            group.sort_by_key(|g| g.mac);
        }
        Self { by_tag }
    }

    /// Pick the gateway for a device, or `None` when its tag has no
    /// gateways (the device is skipped for the cycle, not an error).
    pub fn select(&self, device: &Device) -> Option<&'a Gateway> {
        let group = self.by_tag.get(&device.tag_id)?;
        if group.is_empty() {
            return None;
        }

        // The normalized MAC read as one 48-bit integer, modulo the
        // group size
        let index = (device.mac.to_u48() % group.len() as u64) as usize;
        Some(group[index])
    }
}

/// One device paired with its chosen gateway.
#[derive(Debug, Clone, Copy)]
pub struct Assignment<'a> {
    pub device: &'a Device,
    pub gateway: &'a Gateway,
}

/// Compute the full assignment set for one cycle.
///
/// Devices whose tag has no gateways produce no assignment.
pub fn resolve<'a>(devices: &'a [Device], gateways: &'a [Gateway]) -> Vec<Assignment<'a>> {
    let groups = GatewayGroups::new(gateways);

    devices
        .iter()
        .filter_map(|device| {
            groups.select(device).map(|gateway| Assignment {
                device,
                gateway,
            })
        })
        .collect()
}
