//! Wire-level senders. The core engine only depends on the [`Transport`]
//! trait; these are thin synchronous UDP senders for the two protocols
//! named in the external interfaces, built for the CLI demo to have
//! somewhere real to send bytes. Neither format is validated against a
//! receiver in tests — these are glue, not core.

use std::collections::HashMap;
use std::net::UdpSocket;

use log::{info, warn};

use crate::error::EngineError;

/// `start`/`send`/`stop` contract every output protocol implements. The
/// engine creates one transport per `play()` and owns it for the
/// lifetime of that session.
pub trait Transport: Send {
    fn start(&mut self) -> Result<(), EngineError>;
    fn send(&mut self, universe_data: &HashMap<u32, HashMap<u16, u8>>);
    fn stop(&mut self);
}

fn full_frame(universe: u32, data: &HashMap<u32, HashMap<u16, u8>>) -> [u8; 512] {
    let mut frame = [0u8; 512];
    if let Some(channels) = data.get(&universe) {
        for (&channel, &value) in channels {
            if (1..=512).contains(&channel) {
                frame[usize::from(channel - 1)] = value;
            }
        }
    }
    frame
}

/// sACN (E1.31) sender: one multicast or unicast UDP packet per universe
/// per tick, root + framing + DMP layers, no universe discovery/sync.
pub struct SacnTransport {
    socket: Option<UdpSocket>,
    universes: Vec<u32>,
    universe_ips: HashMap<u32, String>,
    sequence: HashMap<u32, u8>,
    cid: [u8; 16],
}

impl SacnTransport {
    const ACN_PACKET_IDENTIFIER: [u8; 12] =
        [0x41, 0x53, 0x43, 0x2d, 0x45, 0x31, 0x2e, 0x31, 0x37, 0x00, 0x00, 0x00];
    const SOURCE_NAME: &'static [u8; 64] = &[0u8; 64];

    #[must_use]
    pub fn new(universes: Vec<u32>, universe_ips: HashMap<u32, String>) -> Self {
        let sequence = universes.iter().map(|&u| (u, 0)).collect();
        Self { socket: None, universes, universe_ips, sequence, cid: *b"dmxcue-sacn-cid\0" }
    }

    fn multicast_addr(universe: u32) -> String {
        let hi = (universe >> 8) & 0xff;
        let lo = universe & 0xff;
        format!("239.255.{hi}.{lo}:5568")
    }

    fn build_packet(&self, universe: u32, dmx: &[u8; 512], sequence: u8) -> Vec<u8> {
        let mut packet = Vec::with_capacity(638);

        // Root layer.
        packet.extend_from_slice(&[0x00, 0x10]);
        packet.extend_from_slice(&(0x7000_u16 | 0x0026).to_be_bytes());
        packet.extend_from_slice(&Self::ACN_PACKET_IDENTIFIER);
        packet.extend_from_slice(&4u32.to_be_bytes());
        packet.extend_from_slice(&self.cid);

        // Framing layer.
        packet.extend_from_slice(&(0x7000_u16 | 0x0058).to_be_bytes());
        packet.extend_from_slice(&2u32.to_be_bytes());
        packet.extend_from_slice(Self::SOURCE_NAME);
        packet.push(100); // priority
        packet.extend_from_slice(&0u16.to_be_bytes()); // sync address: unused
        packet.push(sequence);
        packet.push(0); // options
        #[allow(clippy::cast_possible_truncation)]
        packet.extend_from_slice(&(universe as u16).to_be_bytes());

        // DMP layer.
        packet.extend_from_slice(&(0x7000_u16 | 0x000b).to_be_bytes());
        packet.push(2); // vector: set property
        packet.push(0xa1); // address type & data type
        packet.extend_from_slice(&0u16.to_be_bytes()); // first property address
        packet.extend_from_slice(&1u16.to_be_bytes()); // address increment
        packet.extend_from_slice(&513u16.to_be_bytes()); // property value count
        packet.push(0); // DMX start code
        packet.extend_from_slice(dmx);

        packet
    }
}

impl Transport for SacnTransport {
    fn start(&mut self) -> Result<(), EngineError> {
        let socket = UdpSocket::bind("0.0.0.0:0").map_err(|e| EngineError::transport(e.to_string()))?;
        info!("sACN transport bound, serving universes {:?}", self.universes);
        self.socket = Some(socket);
        Ok(())
    }

    fn send(&mut self, universe_data: &HashMap<u32, HashMap<u16, u8>>) {
        let Some(socket) = &self.socket else { return };
        for &universe in &self.universes {
            let dmx = full_frame(universe, universe_data);
            let sequence = self.sequence.entry(universe).or_insert(0);
            let packet = self.build_packet(universe, &dmx, *sequence);
            *sequence = sequence.wrapping_add(1);

            let dest = self.universe_ips.get(&universe).cloned().unwrap_or_else(|| Self::multicast_addr(universe));
            if let Err(err) = socket.send_to(&packet, &dest) {
                warn!("sACN send to {dest} (universe {universe}) dropped: {err}");
            }
        }
    }

    fn stop(&mut self) {
        info!("sACN transport stopped");
        self.socket = None;
    }
}

/// Art-Net sender: one `ArtDmx` UDP packet per universe per tick,
/// broadcast when no destination is configured for that universe.
pub struct ArtNetTransport {
    socket: Option<UdpSocket>,
    universes: Vec<u32>,
    targets: HashMap<u32, String>,
    sequence: HashMap<u32, u8>,
}

impl ArtNetTransport {
    const PORT: u16 = 6454;

    #[must_use]
    pub fn new(universes: Vec<u32>, universe_ips: HashMap<u32, String>, default_target: String) -> Self {
        let targets = universes.iter().map(|&u| (u, universe_ips.get(&u).cloned().unwrap_or_else(|| default_target.clone()))).collect();
        let sequence = universes.iter().map(|&u| (u, 1)).collect();
        Self { socket: None, universes, targets, sequence }
    }

    fn build_packet(universe: u32, dmx: &[u8; 512], sequence: u8) -> Vec<u8> {
        let mut packet = Vec::with_capacity(530);
        packet.extend_from_slice(b"Art-Net\0");
        packet.extend_from_slice(&0x5000_u16.to_be_bytes()); // OpOutput / OpDmx
        packet.extend_from_slice(&[0, 14]); // protocol version 14
        packet.push(sequence);
        packet.push(0); // physical port
        #[allow(clippy::cast_possible_truncation)]
        packet.extend_from_slice(&(universe as u16).to_le_bytes());
        packet.extend_from_slice(&512u16.to_be_bytes());
        packet.extend_from_slice(dmx);
        packet
    }
}

impl Transport for ArtNetTransport {
    fn start(&mut self) -> Result<(), EngineError> {
        let socket = UdpSocket::bind("0.0.0.0:0").map_err(|e| EngineError::transport(e.to_string()))?;
        socket.set_broadcast(true).map_err(|e| EngineError::transport(e.to_string()))?;
        info!("Art-Net transport bound, serving universes {:?}", self.universes);
        self.socket = Some(socket);
        Ok(())
    }

    fn send(&mut self, universe_data: &HashMap<u32, HashMap<u16, u8>>) {
        let Some(socket) = &self.socket else { return };
        for &universe in &self.universes {
            let dmx = full_frame(universe, universe_data);
            let sequence = self.sequence.entry(universe).or_insert(1);
            let packet = Self::build_packet(universe, &dmx, *sequence);
            *sequence = if *sequence == 255 { 1 } else { *sequence + 1 };

            let Some(target) = self.targets.get(&universe) else { continue };
            let dest = format!("{target}:{}", Self::PORT);
            if let Err(err) = socket.send_to(&packet, &dest) {
                warn!("Art-Net send to {dest} (universe {universe}) dropped: {err}");
            }
        }
    }

    fn stop(&mut self) {
        info!("Art-Net transport stopped");
        self.socket = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn full_frame_defaults_missing_channels_to_zero() {
        let mut data = HashMap::new();
        let mut channels = HashMap::new();
        channels.insert(1u16, 255u8);
        data.insert(1u32, channels);

        let frame = full_frame(1, &data);
        assert_eq!(frame[0], 255);
        assert_eq!(frame[1], 0);
    }

    #[test]
    fn sacn_multicast_address_encodes_universe_in_last_two_octets() {
        assert_eq!(SacnTransport::multicast_addr(1), "239.255.0.1:5568");
        assert_eq!(SacnTransport::multicast_addr(300), "239.255.1.44:5568");
    }

    #[test]
    fn sacn_packet_carries_dmx_data_at_its_tail() {
        let transport = SacnTransport::new(vec![1], HashMap::new());
        let mut dmx = [0u8; 512];
        dmx[0] = 42;
        let packet = transport.build_packet(1, &dmx, 0);
        assert_eq!(packet[packet.len() - 512], 42);
    }

    #[test]
    fn artnet_packet_starts_with_protocol_header() {
        let dmx = [0u8; 512];
        let packet = ArtNetTransport::build_packet(1, &dmx, 1);
        assert_eq!(&packet[0..8], b"Art-Net\0");
    }
}
