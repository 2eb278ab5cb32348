#![allow(dead_code)]

use std::net::{SocketAddr, UdpSocket};
use std::thread;
use std::time::{Duration, Instant};

use verilandia::{Channel, ChannelTransport, TransportConfig};

/// Stands in for the game server: a plain socket that speaks raw datagrams.
pub struct FakeServer {
    socket: UdpSocket,
}

impl FakeServer {
    pub fn bind() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        Self { socket }
    }

    pub fn addr(&self) -> SocketAddr {
        self.socket.local_addr().unwrap()
    }

    pub fn send(&self, to: SocketAddr, tag: u8, body: &[u8]) {
        let mut datagram = vec![tag];
        datagram.extend_from_slice(body);
        self.socket.send_to(&datagram, to).unwrap();
    }

    pub fn recv(&self, timeout_ms: u64) -> Option<(u8, Vec<u8>, SocketAddr)> {
        self.socket
            .set_read_timeout(Some(Duration::from_millis(timeout_ms.max(1))))
            .unwrap();

        let mut buffer = [0u8; 65_536];
        match self.socket.recv_from(&mut buffer) {
            Ok((0, _)) | Err(_) => None,
            Ok((size, from)) => Some((buffer[0], buffer[1..size].to_vec(), from)),
        }
    }

    /// Waits for the next datagram on `channel`, skipping everything else.
    pub fn recv_on(&self, channel: Channel, timeout_ms: u64) -> Option<(Vec<u8>, SocketAddr)> {
        let start = Instant::now();
        while start.elapsed() < Duration::from_millis(timeout_ms) {
            if let Some((tag, body, from)) = self.recv(5) {
                if tag == channel.tag() {
                    return Some((body, from));
                }
            }
        }
        None
    }

    /// Collects every datagram on `channel` that arrives within the window.
    pub fn collect_on(&self, channel: Channel, window_ms: u64) -> Vec<Vec<u8>> {
        let mut bodies = Vec::new();
        let start = Instant::now();
        while start.elapsed() < Duration::from_millis(window_ms) {
            if let Some((tag, body, _)) = self.recv(5) {
                if tag == channel.tag() {
                    bodies.push(body);
                }
            }
        }
        bodies
    }

    /// Answers pending probes on the echo channel, as the real server does.
    pub fn echo_probes(&self, timeout_ms: u64) -> usize {
        let mut echoed = 0;
        while let Some((tag, body, from)) = self.recv(timeout_ms) {
            if tag == Channel::Probe.tag() {
                self.send(from, Channel::Echo.tag(), &body);
                echoed += 1;
            }
        }
        echoed
    }
}

pub fn loopback_config() -> TransportConfig {
    TransportConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        ping_interval: Duration::from_secs(3600),
        ..Default::default()
    }
}

pub fn poll_until<C>(
    transport: &mut ChannelTransport<C>,
    ctx: &mut C,
    timeout_ms: u64,
    mut done: impl FnMut(&C) -> bool,
) -> bool {
    let start = Instant::now();
    while start.elapsed() < Duration::from_millis(timeout_ms) {
        transport.poll(ctx);
        if done(ctx) {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}
