use std::collections::VecDeque;
use std::time::Duration;

const ALPHA: f32 = 0.125;
const BETA: f32 = 0.25;

/// Round-trip estimator fed by probe/echo pairs.
///
/// Probes are identified by their send timestamp in microseconds. Only echoes
/// of outstanding probes count; anything else is treated as noise.
#[derive(Debug)]
pub struct PingTracker {
    outstanding: VecDeque<u64>,
    max_outstanding: usize,
    srtt_ms: f32,
    rtt_var_ms: f32,
    samples: u64,
}

impl PingTracker {
    pub fn new(max_outstanding: usize) -> Self {
        Self {
            outstanding: VecDeque::with_capacity(max_outstanding),
            max_outstanding: max_outstanding.max(1),
            srtt_ms: 0.0,
            rtt_var_ms: 0.0,
            samples: 0,
        }
    }

    pub fn track_probe(&mut self, sent_us: u64) {
        while self.outstanding.len() >= self.max_outstanding {
            self.outstanding.pop_front();
        }
        self.outstanding.push_back(sent_us);
    }

    /// Matches an echo against outstanding probes and folds in the sample.
    ///
    /// Probes sent before the matched one are forgotten: their echoes are
    /// either lost or would arrive out of order.
    pub fn process_echo(&mut self, sent_us: u64, now_us: u64) -> Option<Duration> {
        let index = self.outstanding.iter().position(|&t| t == sent_us)?;
        self.outstanding.drain(..=index);

        let rtt_us = now_us.checked_sub(sent_us)?;
        let rtt_ms = rtt_us as f32 / 1000.0;
        self.update_rtt(rtt_ms);

        Some(Duration::from_micros(rtt_us))
    }

    fn update_rtt(&mut self, rtt_ms: f32) {
        if self.samples == 0 {
            self.srtt_ms = rtt_ms;
            self.rtt_var_ms = rtt_ms / 2.0;
        } else {
            let diff = (rtt_ms - self.srtt_ms).abs();
            self.rtt_var_ms = (1.0 - BETA) * self.rtt_var_ms + BETA * diff;
            self.srtt_ms = (1.0 - ALPHA) * self.srtt_ms + ALPHA * rtt_ms;
        }
        self.samples += 1;
    }

    /// Smoothed RTT, or zero until the first echo arrives.
    pub fn ping(&self) -> Duration {
        if self.samples == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f32(self.srtt_ms / 1000.0)
    }

    pub fn srtt_ms(&self) -> f32 {
        self.srtt_ms
    }

    pub fn rtt_var_ms(&self) -> f32 {
        self.rtt_var_ms
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn outstanding_count(&self) -> usize {
        self.outstanding.len()
    }
}
