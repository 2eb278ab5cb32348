use std::collections::{HashMap, VecDeque};
use std::io;
use std::net::{Ipv6Addr, SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use super::channel::Channel;
use super::ping::PingTracker;
use super::protocol::MAX_DATAGRAM_SIZE;
use super::stats::NetworkStats;

const DEFAULT_PING_INTERVAL_MS: u64 = 250;
const DEFAULT_MAX_OUTSTANDING_PROBES: usize = 16;
const DEFAULT_MAX_QUEUED_WRITES: usize = 256;

const PROBE_LEN: usize = std::mem::size_of::<u64>();

/// Handler for one channel. Receives the caller's context and the datagram
/// body with the channel tag already stripped.
pub type ChannelHandler<C> = Box<dyn FnMut(&mut C, &[u8])>;
pub type ErrorHandler = Box<dyn FnMut(&TransportError)>;
pub type WriteCallback = Box<dyn FnOnce(WriteOutcome)>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("no handler registered for channel tag {tag}")]
    UnknownChannel { tag: u8 },
    #[error("channel {0} is reserved for latency probes")]
    ReservedChannel(Channel),
    #[error("socket error: {0}")]
    Socket(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub bind_addr: SocketAddr,
    pub ping_interval: Duration,
    pub max_outstanding_probes: usize,
    pub max_queued_writes: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 0)),
            ping_interval: Duration::from_millis(DEFAULT_PING_INTERVAL_MS),
            max_outstanding_probes: DEFAULT_MAX_OUTSTANDING_PROBES,
            max_queued_writes: DEFAULT_MAX_QUEUED_WRITES,
        }
    }
}

/// Result of a write, delivered to its completion callback.
///
/// `buffer` is the datagram that was handed to the socket, channel tag
/// included. The callback owns it from here on; dropping it releases it.
#[derive(Debug)]
pub struct WriteOutcome {
    pub channel: Channel,
    pub result: Result<usize, io::ErrorKind>,
    pub buffer: Vec<u8>,
}

struct PendingWrite {
    channel: Channel,
    datagram: Vec<u8>,
    on_complete: WriteCallback,
}

struct CompletedWrite {
    on_complete: WriteCallback,
    outcome: WriteOutcome,
}

/// A single UDP socket to one server, split into tagged channels.
///
/// All handlers, completion callbacks and the error callback run inside
/// [`ChannelTransport::poll`] on the calling thread. `C` is the state that
/// channel handlers mutate; the caller passes it to every `poll`.
pub struct ChannelTransport<C> {
    socket: UdpSocket,
    local_addr: SocketAddr,
    remote_addr: SocketAddr,
    config: TransportConfig,
    handlers: HashMap<Channel, ChannelHandler<C>>,
    on_error: Option<ErrorHandler>,
    outbound: VecDeque<PendingWrite>,
    completed: VecDeque<CompletedWrite>,
    ping: PingTracker,
    stats: NetworkStats,
    recv_buffer: Box<[u8]>,
    epoch: Instant,
    last_probe: Option<Instant>,
    reported_error: Option<io::ErrorKind>,
}

impl<C> ChannelTransport<C> {
    pub fn bind(remote_addr: SocketAddr, config: TransportConfig) -> io::Result<Self> {
        let bind_addr = match (config.bind_addr, remote_addr) {
            (SocketAddr::V4(local), SocketAddr::V6(_)) if local.ip().is_unspecified() => {
                SocketAddr::from((Ipv6Addr::UNSPECIFIED, local.port()))
            }
            (local, _) => local,
        };

        let socket = UdpSocket::bind(bind_addr)?;
        socket.connect(remote_addr)?;
        socket.set_nonblocking(true)?;

        let local_addr = socket.local_addr()?;
        log::debug!("Transport bound on {} for server {}", local_addr, remote_addr);

        Ok(Self {
            socket,
            local_addr,
            remote_addr,
            ping: PingTracker::new(config.max_outstanding_probes),
            config,
            handlers: HashMap::new(),
            on_error: None,
            outbound: VecDeque::new(),
            completed: VecDeque::new(),
            stats: NetworkStats::default(),
            recv_buffer: vec![0u8; MAX_DATAGRAM_SIZE].into_boxed_slice(),
            epoch: Instant::now(),
            last_probe: None,
            reported_error: None,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    pub fn stats(&self) -> &NetworkStats {
        &self.stats
    }

    /// Smoothed round-trip time, zero until a probe has been echoed.
    pub fn ping(&self) -> Duration {
        self.ping.ping()
    }

    /// Registers the handler for `channel`, replacing any previous one.
    pub fn listen(
        &mut self,
        channel: Channel,
        handler: impl FnMut(&mut C, &[u8]) + 'static,
    ) -> Result<(), TransportError> {
        if channel.is_reserved() {
            return Err(TransportError::ReservedChannel(channel));
        }

        if self.handlers.insert(channel, Box::new(handler)).is_some() {
            log::debug!("Replaced handler for channel {}", channel);
        }
        Ok(())
    }

    pub fn on_error(&mut self, handler: impl FnMut(&TransportError) + 'static) {
        self.on_error = Some(Box::new(handler));
    }

    /// Sends `frame` on `channel` without waiting.
    ///
    /// `on_complete` runs during the next `poll` after the OS accepted (or
    /// refused) the datagram, never from inside this call.
    pub fn write(
        &mut self,
        channel: Channel,
        frame: Vec<u8>,
        on_complete: impl FnOnce(WriteOutcome) + 'static,
    ) -> Result<(), TransportError> {
        if channel.is_reserved() {
            return Err(TransportError::ReservedChannel(channel));
        }

        let mut datagram = frame;
        datagram.insert(0, channel.tag());

        let write = PendingWrite {
            channel,
            datagram,
            on_complete: Box::new(on_complete),
        };

        if !self.outbound.is_empty() {
            self.queue_blocked(write);
        } else if let Some(blocked) = self.issue(write) {
            self.queue_blocked(blocked);
        }

        Ok(())
    }

    pub fn poll(&mut self, ctx: &mut C) {
        self.flush_outbound();
        self.run_completions();
        self.maybe_probe();
        self.receive_all(ctx);
    }

    /// Number of writes whose completion has not run yet.
    pub fn pending_writes(&self) -> usize {
        self.outbound.len() + self.completed.len()
    }

    fn issue(&mut self, write: PendingWrite) -> Option<PendingWrite> {
        let result = match self.socket.send(&write.datagram) {
            Ok(sent) => {
                self.stats.datagrams_sent += 1;
                self.stats.bytes_sent += sent as u64;
                Ok(sent)
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return Some(write),
            Err(e) => {
                let kind = e.kind();
                self.report_socket_error(e);
                Err(kind)
            }
        };

        let PendingWrite {
            channel,
            datagram,
            on_complete,
        } = write;

        self.completed.push_back(CompletedWrite {
            on_complete,
            outcome: WriteOutcome {
                channel,
                result,
                buffer: datagram,
            },
        });
        None
    }

    fn queue_blocked(&mut self, write: PendingWrite) {
        if self.outbound.len() < self.config.max_queued_writes {
            self.outbound.push_back(write);
            return;
        }

        log::warn!("Send queue full, dropping {} datagram", write.channel);
        self.stats.datagrams_dropped += 1;
        self.completed.push_back(CompletedWrite {
            on_complete: write.on_complete,
            outcome: WriteOutcome {
                channel: write.channel,
                result: Err(io::ErrorKind::WouldBlock),
                buffer: write.datagram,
            },
        });
    }

    fn flush_outbound(&mut self) {
        while let Some(write) = self.outbound.pop_front() {
            if let Some(blocked) = self.issue(write) {
                self.outbound.push_front(blocked);
                break;
            }
        }
    }

    fn run_completions(&mut self) {
        while let Some(CompletedWrite {
            on_complete,
            outcome,
        }) = self.completed.pop_front()
        {
            on_complete(outcome);
        }
    }

    fn maybe_probe(&mut self) {
        let now = Instant::now();
        if self
            .last_probe
            .is_some_and(|last| now.duration_since(last) < self.config.ping_interval)
        {
            return;
        }
        self.last_probe = Some(now);

        let stamp = self.micros_since_epoch(now);
        let mut datagram = [0u8; 1 + PROBE_LEN];
        datagram[0] = Channel::Probe.tag();
        datagram[1..].copy_from_slice(&stamp.to_ne_bytes());

        match self.socket.send(&datagram) {
            Ok(sent) => {
                self.stats.datagrams_sent += 1;
                self.stats.bytes_sent += sent as u64;
                self.stats.probes_sent += 1;
                self.ping.track_probe(stamp);
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => self.report_socket_error(e),
        }
    }

    fn receive_all(&mut self, ctx: &mut C) {
        // A pending ICMP error is returned ahead of queued datagrams and
        // cleared by that read; one retry drains what sits behind it.
        let mut retried = false;
        loop {
            let size = match self.socket.recv(&mut self.recv_buffer) {
                Ok(size) => size,
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.report_socket_error(e);
                    if retried {
                        break;
                    }
                    retried = true;
                    continue;
                }
            };

            self.reported_error = None;
            self.stats.datagrams_received += 1;
            self.stats.bytes_received += size as u64;

            if size == 0 {
                self.stats.datagrams_dropped += 1;
                log::debug!("Dropping empty datagram");
                continue;
            }

            let tag = self.recv_buffer[0];
            match Channel::from_tag(tag) {
                Some(Channel::Echo) => {
                    let stamp = <[u8; PROBE_LEN]>::try_from(&self.recv_buffer[1..size])
                        .ok()
                        .map(u64::from_ne_bytes);
                    self.handle_echo(stamp);
                }
                Some(channel) => match self.handlers.get_mut(&channel) {
                    Some(handler) => handler(ctx, &self.recv_buffer[1..size]),
                    None => {
                        self.stats.datagrams_dropped += 1;
                        log::info!("{}", TransportError::UnknownChannel { tag });
                    }
                },
                None => {
                    self.stats.datagrams_dropped += 1;
                    log::info!("{}", TransportError::UnknownChannel { tag });
                }
            }
        }
    }

    fn handle_echo(&mut self, stamp: Option<u64>) {
        let Some(sent_us) = stamp else {
            self.stats.datagrams_dropped += 1;
            log::debug!("Dropping malformed echo");
            return;
        };

        let now_us = self.micros_since_epoch(Instant::now());
        match self.ping.process_echo(sent_us, now_us) {
            Some(rtt) => {
                log::trace!("Probe round trip {:?}", rtt);
                self.stats.rtt_samples = self.ping.samples();
                self.stats.rtt_ms = self.ping.srtt_ms();
                self.stats.rtt_variance = self.ping.rtt_var_ms();
            }
            None => {
                self.stats.datagrams_dropped += 1;
                log::debug!("Dropping echo for unknown probe {}", sent_us);
            }
        }
    }

    /// Reports a socket error once per kind until traffic flows again.
    fn report_socket_error(&mut self, error: io::Error) {
        let kind = error.kind();
        if self.reported_error == Some(kind) {
            log::trace!("Suppressed repeated socket error: {}", error);
            return;
        }
        self.reported_error = Some(kind);

        let error = TransportError::Socket(error);
        log::warn!("{}", error);
        if let Some(handler) = self.on_error.as_mut() {
            handler(&error);
        }
    }

    fn micros_since_epoch(&self, now: Instant) -> u64 {
        now.duration_since(self.epoch).as_micros() as u64
    }
}
