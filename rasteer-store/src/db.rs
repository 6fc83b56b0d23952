use crate::error::{Error, Result};
use crate::models::{Device, Gateway, Tag};
use rasteer_core::MacAddr;
use redb::{Database, ReadableTable, TableDefinition};
use std::net::Ipv6Addr;
use std::path::Path;
use std::sync::Arc;

/// Tags table: tag_id -> Tag (JSON)
const TAGS_TABLE: TableDefinition<u32, &str> = TableDefinition::new("tags");

/// Devices table: canonical mac string -> Device (JSON)
const DEVICES_TABLE: TableDefinition<&str, &str> = TableDefinition::new("devices");

/// Gateways table: canonical mac string -> Gateway (JSON)
const GATEWAYS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("gateways");

/// Counters table; holds the next tag id so ids are never reissued
const META_TABLE: TableDefinition<&str, u32> = TableDefinition::new("meta");

const NEXT_TAG_ID: &str = "next_tag_id";

/// Fields of a tag that may be changed after creation.
#[derive(Debug, Default, Clone)]
pub struct TagUpdate {
    pub alias: Option<String>,
    pub dns: Option<Vec<Ipv6Addr>>,
}

/// Fields of a device that may be changed after creation.
#[derive(Debug, Default, Clone)]
pub struct DeviceUpdate {
    pub tag_id: Option<u32>,
    pub alias: Option<String>,
}

/// Fields of a gateway that may be changed after creation.
#[derive(Debug, Default, Clone)]
pub struct GatewayUpdate {
    pub tag_id: Option<u32>,
    pub alias: Option<String>,
    pub local_ipv6: Option<Ipv6Addr>,
}

/// The topology store.
///
/// Records are serialized as JSON into redb tables. All reads are
/// point-in-time; the engine takes its per-cycle snapshot with three
/// independent list calls and tolerates them observing different commits.
#[derive(Clone)]
pub struct Db {
    inner: Arc<Database>,
}

impl Db {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;

        // Initialize tables
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(TAGS_TABLE)?;
            let _ = write_txn.open_table(DEVICES_TABLE)?;
            let _ = write_txn.open_table(GATEWAYS_TABLE)?;
            let _ = write_txn.open_table(META_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self {
            inner: Arc::new(db),
        })
    }

    // --- Tag operations ---

    /// Create a tag, assigning it the next free id.
    pub fn create_tag(&self, alias: &str, dns: Vec<Ipv6Addr>) -> Result<Tag> {
        let write_txn = self.inner.begin_write()?;
        let tag = {
            let mut meta = write_txn.open_table(META_TABLE)?;
            let next_id = meta.get(NEXT_TAG_ID)?.map(|v| v.value()).unwrap_or(1);
            meta.insert(NEXT_TAG_ID, next_id + 1)?;

            let tag = Tag {
                tag_id: next_id,
                alias: alias.to_string(),
                dns,
            };
            let json = serde_json::to_string(&tag)?;

            let mut tags = write_txn.open_table(TAGS_TABLE)?;
            tags.insert(next_id, json.as_str())?;
            tag
        };
        write_txn.commit()?;
        Ok(tag)
    }

    pub fn get_tag(&self, tag_id: u32) -> Result<Option<Tag>> {
        let read_txn = self.inner.begin_read()?;
        let tags = read_txn.open_table(TAGS_TABLE)?;
        match tags.get(tag_id)? {
            Some(v) => Ok(Some(serde_json::from_str(v.value())?)),
            None => Ok(None),
        }
    }

    pub fn list_tags(&self) -> Result<Vec<Tag>> {
        let read_txn = self.inner.begin_read()?;
        let tags = read_txn.open_table(TAGS_TABLE)?;

        let mut result = Vec::new();
        for entry in tags.iter()? {
            let (_, v) = entry?;
            result.push(serde_json::from_str(v.value())?);
        }
        Ok(result)
    }

    pub fn update_tag(&self, tag_id: u32, update: TagUpdate) -> Result<Tag> {
        let write_txn = self.inner.begin_write()?;
        let tag = {
            let mut tags = write_txn.open_table(TAGS_TABLE)?;
            let mut tag: Tag = match tags.get(tag_id)? {
                Some(v) => serde_json::from_str(v.value())?,
                None => return Err(Error::TagNotFound(tag_id)),
            };

            if let Some(alias) = update.alias {
                tag.alias = alias;
            }
            if let Some(dns) = update.dns {
                tag.dns = dns;
            }

            let json = serde_json::to_string(&tag)?;
            tags.insert(tag_id, json.as_str())?;
            tag
        };
        write_txn.commit()?;
        Ok(tag)
    }

    /// Delete a tag.
    ///
    /// Devices and gateways referencing it are left in place; a dangling
    /// tag reference just means the device yields no assignment.
    pub fn delete_tag(&self, tag_id: u32) -> Result<()> {
        let write_txn = self.inner.begin_write()?;
        {
            let mut tags = write_txn.open_table(TAGS_TABLE)?;
            if tags.remove(tag_id)?.is_none() {
                return Err(Error::TagNotFound(tag_id));
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    // --- Device operations ---

    pub fn create_device(&self, device: &Device) -> Result<()> {
        let key = device.mac.to_string();
        let write_txn = self.inner.begin_write()?;
        {
            let mut devices = write_txn.open_table(DEVICES_TABLE)?;
            if devices.get(key.as_str())?.is_some() {
                return Err(Error::DuplicateDevice(key));
            }
            let json = serde_json::to_string(device)?;
            devices.insert(key.as_str(), json.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_device(&self, mac: MacAddr) -> Result<Option<Device>> {
        let read_txn = self.inner.begin_read()?;
        let devices = read_txn.open_table(DEVICES_TABLE)?;
        match devices.get(mac.to_string().as_str())? {
            Some(v) => Ok(Some(serde_json::from_str(v.value())?)),
            None => Ok(None),
        }
    }

    pub fn list_devices(&self) -> Result<Vec<Device>> {
        let read_txn = self.inner.begin_read()?;
        let devices = read_txn.open_table(DEVICES_TABLE)?;

        let mut result = Vec::new();
        for entry in devices.iter()? {
            let (_, v) = entry?;
            result.push(serde_json::from_str(v.value())?);
        }
        Ok(result)
    }

    pub fn update_device(&self, mac: MacAddr, update: DeviceUpdate) -> Result<Device> {
        let key = mac.to_string();
        let write_txn = self.inner.begin_write()?;
        let device = {
            let mut devices = write_txn.open_table(DEVICES_TABLE)?;
            let mut device: Device = match devices.get(key.as_str())? {
                Some(v) => serde_json::from_str(v.value())?,
                None => return Err(Error::DeviceNotFound(key)),
            };

            if let Some(tag_id) = update.tag_id {
                device.tag_id = tag_id;
            }
            if let Some(alias) = update.alias {
                device.alias = Some(alias);
            }

            let json = serde_json::to_string(&device)?;
            devices.insert(key.as_str(), json.as_str())?;
            device
        };
        write_txn.commit()?;
        Ok(device)
    }

    pub fn delete_device(&self, mac: MacAddr) -> Result<()> {
        let key = mac.to_string();
        let write_txn = self.inner.begin_write()?;
        {
            let mut devices = write_txn.open_table(DEVICES_TABLE)?;
            if devices.remove(key.as_str())?.is_none() {
                return Err(Error::DeviceNotFound(key));
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    // --- Gateway operations ---

    pub fn create_gateway(&self, gateway: &Gateway) -> Result<()> {
        let key = gateway.mac.to_string();
        let write_txn = self.inner.begin_write()?;
        {
            let mut gateways = write_txn.open_table(GATEWAYS_TABLE)?;
            if gateways.get(key.as_str())?.is_some() {
                return Err(Error::DuplicateGateway(key));
            }
            let json = serde_json::to_string(gateway)?;
            gateways.insert(key.as_str(), json.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_gateway(&self, mac: MacAddr) -> Result<Option<Gateway>> {
        let read_txn = self.inner.begin_read()?;
        let gateways = read_txn.open_table(GATEWAYS_TABLE)?;
        match gateways.get(mac.to_string().as_str())? {
            Some(v) => Ok(Some(serde_json::from_str(v.value())?)),
            None => Ok(None),
        }
    }

    pub fn list_gateways(&self) -> Result<Vec<Gateway>> {
        let read_txn = self.inner.begin_read()?;
        let gateways = read_txn.open_table(GATEWAYS_TABLE)?;

        let mut result = Vec::new();
        for entry in gateways.iter()? {
            let (_, v) = entry?;
            result.push(serde_json::from_str(v.value())?);
        }
        Ok(result)
    }

    pub fn update_gateway(&self, mac: MacAddr, update: GatewayUpdate) -> Result<Gateway> {
        let key = mac.to_string();
        let write_txn = self.inner.begin_write()?;
        let gateway = {
            let mut gateways = write_txn.open_table(GATEWAYS_TABLE)?;
            let mut gateway: Gateway = match gateways.get(key.as_str())? {
                Some(v) => serde_json::from_str(v.value())?,
                None => return Err(Error::GatewayNotFound(key)),
            };

            if let Some(tag_id) = update.tag_id {
                gateway.tag_id = tag_id;
            }
            if let Some(alias) = update.alias {
                gateway.alias = Some(alias);
            }
            if let Some(local_ipv6) = update.local_ipv6 {
                gateway.local_ipv6 = local_ipv6;
            }

            let json = serde_json::to_string(&gateway)?;
            gateways.insert(key.as_str(), json.as_str())?;
            gateway
        };
        write_txn.commit()?;
        Ok(gateway)
    }

    pub fn delete_gateway(&self, mac: MacAddr) -> Result<()> {
        let key = mac.to_string();
        let write_txn = self.inner.begin_write()?;
        {
            let mut gateways = write_txn.open_table(GATEWAYS_TABLE)?;
            if gateways.remove(key.as_str())?.is_none() {
                return Err(Error::GatewayNotFound(key));
            }
        }
        write_txn.commit()?;
        Ok(())
    }
}
