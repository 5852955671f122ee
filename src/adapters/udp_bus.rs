//! UDP datagram transport.
//!
//! A datagram carries one message: the channel name, a newline, then the
//! raw payload.
//!
//! ```text
//!  raspberrypi/3\n"assistance_requested"
//!  └── channel ─┘  └────── payload ─────┘
//! ```
//!
//! Every publication is sent to each configured peer, or broadcast on the
//! bind port when no peers are configured.  A unit that lists its own
//! address (or a broadcast address) among its peers receives its own
//! publications back, as a broker would deliver them.

use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use log::{debug, info, warn};

use crate::app::ports::{CommsError, InboundMessage, InboundPort, PublishPort};
use crate::config::NetworkConfig;

/// Largest datagram accepted.
pub const MAX_DATAGRAM: usize = 512;

/// Build the wire form of one message.
pub fn encode_frame(channel: &str, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(channel.len() + 1 + payload.len());
    frame.extend_from_slice(channel.as_bytes());
    frame.push(b'\n');
    frame.extend_from_slice(payload);
    frame
}

/// Split a datagram into channel and payload.
pub fn decode_frame(frame: &[u8]) -> Result<InboundMessage, CommsError> {
    let split = frame
        .iter()
        .position(|&b| b == b'\n')
        .ok_or(CommsError::BadFrame)?;
    let channel = core::str::from_utf8(&frame[..split]).map_err(|_| CommsError::BadFrame)?;
    if channel.is_empty() {
        return Err(CommsError::BadFrame);
    }
    Ok(InboundMessage {
        channel: channel.to_string(),
        payload: frame[split + 1..].to_vec(),
    })
}

pub struct UdpBus {
    socket: UdpSocket,
    peers: Vec<SocketAddr>,
    buf: [u8; MAX_DATAGRAM],
}

impl UdpBus {
    /// Bind the receive socket and resolve the peer list.
    pub fn bind(config: &NetworkConfig) -> Result<Self, CommsError> {
        let socket = UdpSocket::bind(config.bind_addr.as_str()).map_err(|e| {
            warn!("UDP: bind {} failed: {}", config.bind_addr, e);
            CommsError::BindFailed
        })?;
        if let Err(e) = socket.set_broadcast(true) {
            debug!("UDP: broadcast unavailable: {}", e);
        }
        let peers = config.publish_targets();
        if peers.len() < config.peers.len() {
            warn!("UDP: skipped {} invalid peer(s)", config.peers.len() - peers.len());
        }
        if peers.is_empty() {
            warn!("UDP: no peers and no broadcast port, publications go nowhere");
        }
        let bus = Self {
            socket,
            peers,
            buf: [0; MAX_DATAGRAM],
        };
        info!(
            "UDP: bound {:?}, {} peer(s)",
            bus.local_addr(),
            bus.peers.len()
        );
        Ok(bus)
    }

    /// A second handle on the same socket, so sending and receiving can
    /// live on different threads.
    pub fn try_clone(&self) -> Result<Self, CommsError> {
        let socket = self.socket.try_clone().map_err(|_| CommsError::BindFailed)?;
        Ok(Self {
            socket,
            peers: self.peers.clone(),
            buf: [0; MAX_DATAGRAM],
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.local_addr().ok()
    }

    pub fn add_peer(&mut self, peer: SocketAddr) {
        if !self.peers.contains(&peer) {
            self.peers.push(peer);
        }
    }

    pub fn peers(&self) -> &[SocketAddr] {
        &self.peers
    }
}

impl PublishPort for UdpBus {
    fn publish(&mut self, channel: &str, payload: &[u8]) -> Result<(), CommsError> {
        let frame = encode_frame(channel, payload);
        let mut result = Ok(());
        for peer in &self.peers {
            if let Err(e) = self.socket.send_to(&frame, peer) {
                warn!("UDP: send to {} failed: {}", peer, e);
                result = Err(CommsError::PublishFailed);
            }
        }
        result
    }
}

impl InboundPort for UdpBus {
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<InboundMessage>, CommsError> {
        // A zero timeout would mean "block forever".
        let timeout = timeout.max(Duration::from_millis(1));
        self.socket
            .set_read_timeout(Some(timeout))
            .map_err(|_| CommsError::ReceiveFailed)?;

        let (len, from) = match self.socket.recv_from(&mut self.buf) {
            Ok(received) => received,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Ok(None);
            }
            Err(e) => {
                debug!("UDP: receive failed: {}", e);
                return Err(CommsError::ReceiveFailed);
            }
        };

        match decode_frame(&self.buf[..len]) {
            Ok(msg) => Ok(Some(msg)),
            Err(e) => {
                warn!("UDP: {} from {}, dropped", e, from);
                Ok(None)
            }
        }
    }
}
