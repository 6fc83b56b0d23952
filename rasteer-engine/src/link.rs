//! Frame transmission seam.
//!
//! The cycle hands finished frames to a [`FrameSink`]; production wires
//! this to a persistent `pnet` sender on the configured interface, tests
//! substitute their own. The real sender is a single shared resource that
//! is not safe for uncoordinated concurrent writers, so sends are
//! serialized behind its mutex.

use async_trait::async_trait;
use pnet_datalink::DataLinkSender;
use rasteer_core::{interface::send_on, Error, Interface, Result};
use std::sync::{Arc, Mutex};

/// Where finished frames go.
#[async_trait]
pub trait FrameSink: Send + Sync {
    async fn send_frame(&self, frame: &[u8]) -> Result<()>;
}

/// Sends frames on a network interface through one persistent channel.
pub struct DataLinkSink {
    sender: Arc<Mutex<Box<dyn DataLinkSender>>>,
}

impl DataLinkSink {
    /// Open the transmit channel once. Interface existence and raw-socket
    /// capability are verified here, at startup, not per packet.
    pub fn open(interface: &Interface) -> Result<Self> {
        Ok(Self {
            sender: interface.create_sender()?,
        })
    }
}

#[async_trait]
impl FrameSink for DataLinkSink {
    async fn send_frame(&self, frame: &[u8]) -> Result<()> {
        let mut tx = self
            .sender
            .lock()
            .map_err(|_| Error::Interface("sender lock poisoned".to_string()))?;
        send_on(&mut **tx, frame)
    }
}
