//! One broadcast cycle: snapshot, assign, build, send.
//!
//! Failures are contained per device: a frame that cannot be built or
//! sent is recorded in the cycle report and the loop moves on. Only a
//! failed topology snapshot aborts the whole cycle.

use crate::link::FrameSink;
use crate::resolver::GatewayGroups;
use crate::topology::TopologySource;
use rasteer_core::{EngineConfig, MacAddr, Result, TargetingMode};
use rasteer_neigh::NeighborTable;
use rasteer_packet::{AdvertisedRouter, RaDestination, RaFrameBuilder};
use std::collections::HashMap;
use std::net::Ipv6Addr;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// What happened to one device during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceOutcome {
    /// Advertisement transmitted, steering the device to this gateway
    Sent { gateway: MacAddr },
    /// The device's tag has no gateways; nothing to advertise
    SkippedNoGateway,
    /// The frame could not be constructed
    BuildFailed { reason: String },
    /// The frame was built but transmission failed
    SendFailed { gateway: MacAddr, reason: String },
}

/// Per-device record in a cycle report.
#[derive(Debug, Clone)]
pub struct DeviceReport {
    pub device: MacAddr,
    pub outcome: DeviceOutcome,
}

/// The result of one complete cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub id: Uuid,
    pub outcomes: Vec<DeviceReport>,
}

impl CycleReport {
    pub fn sent(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|r| matches!(r.outcome, DeviceOutcome::Sent { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|r| r.outcome == DeviceOutcome::SkippedNoGateway)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|r| {
                matches!(
                    r.outcome,
                    DeviceOutcome::BuildFailed { .. } | DeviceOutcome::SendFailed { .. }
                )
            })
            .count()
    }
}

/// The RA redirection engine.
///
/// Owns the seams the cycle runs across: topology snapshots, neighbor
/// lookup, and the frame sink. One instance is shared between the
/// scheduler and the control plane.
pub struct RaEngine {
    config: EngineConfig,
    transmit_mac: MacAddr,
    topology: Arc<dyn TopologySource>,
    neighbors: Arc<dyn NeighborTable>,
    sink: Arc<dyn FrameSink>,
}

impl RaEngine {
    pub fn new(
        config: EngineConfig,
        transmit_mac: MacAddr,
        topology: Arc<dyn TopologySource>,
        neighbors: Arc<dyn NeighborTable>,
        sink: Arc<dyn FrameSink>,
    ) -> Self {
        Self {
            config,
            transmit_mac,
            topology,
            neighbors,
            sink,
        }
    }

    /// Run one cycle: send one advertisement per eligible device.
    ///
    /// Returns an error only when the topology snapshot cannot be
    /// obtained; everything else degrades to a per-device outcome.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let id = Uuid::now_v7();
        let snapshot = self.topology.snapshot()?;

        debug!(
            cycle = %id,
            devices = snapshot.devices.len(),
            gateways = snapshot.gateways.len(),
            tags = snapshot.tags.len(),
            "cycle started"
        );

        if self.config.refresh_neighbors {
            self.neighbors.refresh().await;
        }

        let neighbor_lla: HashMap<MacAddr, Ipv6Addr> = match self.neighbors.scan().await {
            Ok(entries) => entries
                .into_iter()
                .map(|e| (e.mac, e.local_ipv6))
                .collect(),
            Err(e) => {
                warn!(error = %e, "neighbor scan failed, falling back to EUI-64 addresses");
                HashMap::new()
            }
        };

        let tag_dns: HashMap<u32, Vec<Ipv6Addr>> = snapshot
            .tags
            .iter()
            .map(|t| (t.tag_id, t.dns.clone()))
            .collect();

        let groups = GatewayGroups::new(&snapshot.gateways);
        let mut outcomes = Vec::with_capacity(snapshot.devices.len());

        for device in &snapshot.devices {
            let Some(gateway) = groups.select(device) else {
                debug!(device = %device.mac, tag = device.tag_id, "no gateway for tag, skipped");
                outcomes.push(DeviceReport {
                    device: device.mac,
                    outcome: DeviceOutcome::SkippedNoGateway,
                });
                continue;
            };

            let destination = match self.config.targeting {
                TargetingMode::Unicast => RaDestination::Unicast {
                    mac: device.mac,
                    addr: neighbor_lla
                        .get(&device.mac)
                        .copied()
                        .unwrap_or_else(|| device.mac.eui64_link_local()),
                },
                TargetingMode::AllNodes => RaDestination::AllNodes,
            };

            let dns = tag_dns.get(&device.tag_id).cloned().unwrap_or_default();

            let frame = RaFrameBuilder::new(
                AdvertisedRouter {
                    mac: gateway.mac,
                    link_local: gateway.local_ipv6,
                },
                self.transmit_mac,
            )
            .destination(destination)
            .prefix(
                self.config.prefix.network(),
                self.config.prefix.prefix_len(),
            )
            .router_lifetime(self.config.router_lifetime_secs)
            .dns_servers(dns)
            .build();

            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(device = %device.mac, error = %e, "advertisement build failed");
                    outcomes.push(DeviceReport {
                        device: device.mac,
                        outcome: DeviceOutcome::BuildFailed {
                            reason: e.to_string(),
                        },
                    });
                    continue;
                }
            };

            match self.sink.send_frame(&frame).await {
                Ok(()) => {
                    info!(
                        device = %device.mac,
                        gateway = %gateway.local_ipv6,
                        "advertisement sent"
                    );
                    outcomes.push(DeviceReport {
                        device: device.mac,
                        outcome: DeviceOutcome::Sent {
                            gateway: gateway.mac,
                        },
                    });
                }
                Err(e) => {
                    warn!(device = %device.mac, error = %e, "advertisement send failed");
                    outcomes.push(DeviceReport {
                        device: device.mac,
                        outcome: DeviceOutcome::SendFailed {
                            gateway: gateway.mac,
                            reason: e.to_string(),
                        },
                    });
                }
            }
        }

        let report = CycleReport { id, outcomes };
        info!(
            cycle = %id,
            sent = report.sent(),
            skipped = report.skipped(),
            failed = report.failed(),
            "cycle finished"
        );
        Ok(report)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::topology::TopologySnapshot;

    #[tokio::test]
    async fn test_tag_without_gateways_sends_nothing_but_completes() {
        let topology = Arc::new(FixedTopology::ok(TopologySnapshot {
            tags: vec![tag(1, &[])],
            devices: vec![device("aa:bb:cc:dd:ee:01", 1)],
            gateways: vec![],
        }));
        let sink = Arc::new(RecordingSink::default());
        let engine = engine_with(topology, sink.clone());

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.sent(), 0);
        assert!(sink.frames.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_one_failing_send_does_not_stop_the_cycle() {
        let topology = Arc::new(FixedTopology::ok(TopologySnapshot {
            tags: vec![tag(1, &[])],
            devices: vec![
                device("aa:bb:cc:dd:ee:01", 1),
                device("aa:bb:cc:dd:ee:02", 1),
            ],
            gateways: vec![gateway("02:00:00:00:00:0a", 1, "fe80::1")],
        }));
        let sink = Arc::new(RecordingSink::default());
        sink.fail_for_dst
            .lock()
            .unwrap()
            .push("aa:bb:cc:dd:ee:01".parse().unwrap());
        let engine = engine_with(topology, sink.clone());

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.sent(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(sink.frames.lock().unwrap().len(), 1);

        let failed = report
            .outcomes
            .iter()
            .find(|r| r.device == "aa:bb:cc:dd:ee:01".parse().unwrap())
            .unwrap();
        assert!(matches!(failed.outcome, DeviceOutcome::SendFailed { .. }));
    }

    #[tokio::test]
    async fn test_topology_failure_aborts_the_cycle() {
        let topology = Arc::new(FixedTopology::failing());
        let sink = Arc::new(RecordingSink::default());
        let engine = engine_with(topology, sink.clone());

        assert!(engine.run_cycle().await.is_err());
        assert!(sink.frames.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_frames_carry_tag_dns_and_gateway_identity() {
        let topology = Arc::new(FixedTopology::ok(TopologySnapshot {
            tags: vec![tag(1, &["2001:db8::1"])],
            devices: vec![device("aa:bb:cc:dd:ee:01", 1)],
            gateways: vec![gateway("6e:80:5a:e0:46:fe", 1, "fe80::6c80:5aff:fee0:46fe")],
        }));
        let sink = Arc::new(RecordingSink::default());
        let engine = engine_with(topology, sink.clone());

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.sent(), 1);

        let frames = sink.frames.lock().unwrap();
        let frame = &frames[0];

        // Ethernet destination is the device, source the transmit MAC
        let device_mac: MacAddr = "aa:bb:cc:dd:ee:01".parse().unwrap();
        assert_eq!(&frame[0..6], device_mac.as_bytes());
        assert_eq!(&frame[6..12], transmit_mac().as_bytes());

        // IPv6 source is the gateway's link-local address
        let gw_lla: std::net::Ipv6Addr = "fe80::6c80:5aff:fee0:46fe".parse().unwrap();
        assert_eq!(&frame[22..38], &gw_lla.octets());

        // No neighbor entry, so the destination falls back to EUI-64
        let eui64 = device_mac.eui64_link_local();
        assert_eq!(&frame[38..54], &eui64.octets());

        // The RDNSS server from the tag appears in the frame
        let dns: std::net::Ipv6Addr = "2001:db8::1".parse().unwrap();
        let dns_octets = dns.octets();
        assert!(frame
            .windows(dns_octets.len())
            .any(|window| window == dns_octets));
    }

    #[tokio::test]
    async fn test_device_with_missing_tag_record_still_gets_advertised() {
        // Gateways exist for the tag id, but the Tag record itself is gone:
        // the device is steered with an empty DNS list.
        let topology = Arc::new(FixedTopology::ok(TopologySnapshot {
            tags: vec![],
            devices: vec![device("aa:bb:cc:dd:ee:01", 1)],
            gateways: vec![gateway("02:00:00:00:00:0a", 1, "fe80::1")],
        }));
        let sink = Arc::new(RecordingSink::default());
        let engine = engine_with(topology, sink.clone());

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.sent(), 1);
    }

    #[tokio::test]
    async fn test_neighbor_entry_overrides_eui64_destination() {
        use rasteer_neigh::{NeighborEntry, StaticNeighborTable};

        let device_mac: MacAddr = "d2:8c:f5:e1:b4:f4".parse().unwrap();
        let observed: std::net::Ipv6Addr = "fe80::1234".parse().unwrap();

        let topology = Arc::new(FixedTopology::ok(TopologySnapshot {
            tags: vec![tag(1, &[])],
            devices: vec![device("d2:8c:f5:e1:b4:f4", 1)],
            gateways: vec![gateway("02:00:00:00:00:0a", 1, "fe80::1")],
        }));
        let sink = Arc::new(RecordingSink::default());
        let engine = RaEngine::new(
            engine_config(),
            transmit_mac(),
            topology,
            Arc::new(StaticNeighborTable::new(vec![NeighborEntry {
                local_ipv6: observed,
                mac: device_mac,
            }])),
            sink.clone(),
        );

        engine.run_cycle().await.unwrap();
        let frames = sink.frames.lock().unwrap();
        assert_eq!(&frames[0][38..54], &observed.octets());
    }
}
