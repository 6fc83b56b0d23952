//! Example: Building a spoofed Router Advertisement frame
//!
//! This example demonstrates how to use the rasteer-packet crate to build
//! a complete Router Advertisement frame addressed to one device, with the
//! Prefix Information, Source Link-Layer Address, and RDNSS options.

use rasteer_core::MacAddr;
use rasteer_packet::builder::{AdvertisedRouter, RaDestination, RaFrameBuilder};

fn main() {
    // The gateway we advertise: its real MAC and its link-local address
    let gateway = AdvertisedRouter {
        mac: "6e:80:5a:e0:46:fe".parse().unwrap(),
        link_local: "fe80::6c80:5aff:fee0:46fe".parse().unwrap(),
    };

    // The interface actually transmitting the frame
    let transmit_mac = MacAddr([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);

    // The device being steered
    let device_mac: MacAddr = "d2:8c:f5:e1:b4:f4".parse().unwrap();
    let device_lla = device_mac.eui64_link_local();

    let frame = RaFrameBuilder::new(gateway, transmit_mac)
        .destination(RaDestination::Unicast {
            mac: device_mac,
            addr: device_lla,
        })
        .prefix("2001:db8::".parse().unwrap(), 64)
        .router_lifetime(300)
        .dns_servers(vec![
            "2001:db8::102".parse().unwrap(),
            "2400:3200::1".parse().unwrap(),
        ])
        .build()
        .expect("Failed to build RA frame");

    println!("Router Advertisement frame built successfully!");
    println!("Total size: {} bytes", frame.len());
    println!("Ethernet header: {:02x?}", &frame[..14]);
    println!("IPv6 next header: {} (ICMPv6)", frame[20]);
    println!("ICMPv6 type: {} (Router Advertisement)", frame[54]);
    println!(
        "Router lifetime: {}s",
        u16::from_be_bytes([frame[60], frame[61]])
    );
}
