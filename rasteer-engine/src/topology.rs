//! Topology snapshots consumed by the broadcast cycle.

use rasteer_core::{Error, Result};
use rasteer_store::{Db, Device, Gateway, Tag};

/// One cycle's view of the topology.
///
/// Taken fresh at the start of every cycle and discarded afterwards;
/// assignments are never cached across cycles because gateway membership
/// can change between them.
#[derive(Debug, Clone, Default)]
pub struct TopologySnapshot {
    pub tags: Vec<Tag>,
    pub devices: Vec<Device>,
    pub gateways: Vec<Gateway>,
}

/// Source of topology snapshots.
///
/// The three reads are independent point-in-time lookups; observing
/// different commits across them is acceptable.
pub trait TopologySource: Send + Sync {
    fn snapshot(&self) -> Result<TopologySnapshot>;
}

impl TopologySource for Db {
    fn snapshot(&self) -> Result<TopologySnapshot> {
        let tags = self
            .list_tags()
            .map_err(|e| Error::topology(e.to_string()))?;
        let devices = self
            .list_devices()
            .map_err(|e| Error::topology(e.to_string()))?;
        let gateways = self
            .list_gateways()
            .map_err(|e| Error::topology(e.to_string()))?;

        Ok(TopologySnapshot {
            tags,
            devices,
            gateways,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasteer_store::{Device, Gateway};

    #[test]
    fn test_db_snapshot_reads_all_three_tables() {
        let dir = tempfile::tempdir().unwrap();
        let db = Db::open(&dir.path().join("topo.db")).unwrap();

        let tag = db.create_tag("t1", vec!["2001:db8::1".parse().unwrap()]).unwrap();
        db.create_device(&Device {
            mac: "aa:bb:cc:dd:ee:01".parse().unwrap(),
            tag_id: tag.tag_id,
            alias: None,
        })
        .unwrap();
        db.create_gateway(&Gateway {
            mac: "6e:80:5a:e0:46:fe".parse().unwrap(),
            tag_id: tag.tag_id,
            alias: None,
            local_ipv6: "fe80::1".parse().unwrap(),
        })
        .unwrap();

        let snapshot = db.snapshot().unwrap();
        assert_eq!(snapshot.tags.len(), 1);
        assert_eq!(snapshot.devices.len(), 1);
        assert_eq!(snapshot.gateways.len(), 1);
        assert_eq!(snapshot.devices[0].tag_id, snapshot.gateways[0].tag_id);
    }
}
