#[derive(Debug, Clone, Default)]
pub struct NetworkStats {
    pub datagrams_sent: u64,
    pub datagrams_received: u64,
    pub datagrams_dropped: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub probes_sent: u64,
    pub rtt_samples: u64,
    pub rtt_ms: f32,
    pub rtt_variance: f32,
}
