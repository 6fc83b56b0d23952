//! Topology store for rasteer
//!
//! Tag, Device, and Gateway records on an embedded redb database. The
//! engine only ever reads this store (one snapshot per broadcast cycle);
//! all mutation goes through the CRUD methods exposed to the control
//! plane.

pub mod db;
pub mod error;
pub mod models;

pub use db::{Db, DeviceUpdate, GatewayUpdate, TagUpdate};
pub use error::{Error, Result};
pub use models::{Device, Gateway, Tag};
