//! tests/common/harness.rs
#![allow(dead_code)]

use datagram_congestion::{AckOutcome, AckSample, Controller};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::{collections::VecDeque, sync::Once};

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter = std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "datagram_congestion=info".to_string());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// Shape of an emulated path.
#[derive(Debug, Clone)]
pub struct LinkProfile {
    /// One-way propagation delay, each direction.
    pub propagation_ms: u64,
    /// Bottleneck service time per datagram. Zero means unlimited capacity.
    pub service_ms: u64,
    /// Probability that a datagram is dropped.
    pub loss_rate: f64,
    /// Constant offset of the receiver clock from the sender clock.
    pub receiver_clock_offset: u64,
    pub seed: u64,
}

impl Default for LinkProfile {
    fn default() -> Self {
        Self {
            propagation_ms: 20,
            service_ms: 1,
            loss_rate: 0.0,
            receiver_clock_offset: 0,
            seed: 1,
        }
    }
}

/// A single FIFO bottleneck followed by fixed propagation delay. Acks come
/// back in send order.
pub struct Link {
    profile: LinkProfile,
    rng: StdRng,
    next_free: u64,
    down: bool,
    pending: VecDeque<AckSample>,
}

impl Link {
    pub fn new(profile: LinkProfile) -> Self {
        Self {
            rng: StdRng::seed_from_u64(profile.seed),
            profile,
            next_free: 0,
            down: false,
            pending: VecDeque::new(),
        }
    }

    pub fn set_down(&mut self, down: bool) {
        self.down = down;
    }

    pub fn transmit(&mut self, sequence_number: u64, now: u64) {
        if self.down
            || (self.profile.loss_rate > 0.0 && self.rng.random_bool(self.profile.loss_rate))
        {
            return;
        }
        let departure = self.next_free.max(now) + self.profile.service_ms;
        self.next_free = departure;
        let arrival = departure + self.profile.propagation_ms;
        self.pending.push_back(AckSample {
            sequence_number,
            send_time: now,
            receive_time: arrival + self.profile.receiver_clock_offset,
            ack_arrival_time: arrival + self.profile.propagation_ms,
        });
    }

    pub fn acks_due(&mut self, now: u64) -> Vec<AckSample> {
        let mut due = Vec::new();
        while self
            .pending
            .front()
            .is_some_and(|ack| ack.ack_arrival_time <= now)
        {
            due.extend(self.pending.pop_front());
        }
        due
    }
}

/// A sender loop in 1 ms ticks: take due acks, fill the window, and send one
/// probe whenever the window has been stalled for the idle timeout.
pub struct SenderSim {
    pub controller: Controller,
    pub link: Link,
    pub now: u64,
    pub probes: u64,
    pub acked: u64,
    pub min_window_seen: f64,
    pub loss_rate_sum: f64,
    pub ticks: u64,
    next_seq: u64,
    last_activity: u64,
}

impl SenderSim {
    pub fn new(controller: Controller, profile: LinkProfile) -> Self {
        let min_window_seen = controller.current_window_size();
        Self {
            controller,
            link: Link::new(profile),
            now: 0,
            probes: 0,
            acked: 0,
            min_window_seen,
            loss_rate_sum: 0.0,
            ticks: 0,
            next_seq: 0,
            last_activity: 0,
        }
    }

    pub fn run_for(&mut self, duration_ms: u64) {
        let end = self.now + duration_ms;
        while self.now < end {
            for ack in self.link.acks_due(self.now) {
                if self.controller.on_ack(ack) == AckOutcome::Acknowledged {
                    self.acked += 1;
                }
                self.last_activity = self.now;
            }

            while self.controller.window_is_open() {
                self.send();
            }

            let idle_ms = self.controller.idle_timeout().as_millis() as u64;
            if self.now.saturating_sub(self.last_activity) >= idle_ms {
                self.send();
                self.probes += 1;
                self.last_activity = self.now;
            }

            self.min_window_seen = self
                .min_window_seen
                .min(self.controller.current_window_size());
            self.loss_rate_sum += self.controller.loss_rate();
            self.ticks += 1;
            self.now += 1;
        }
    }

    pub fn mean_loss_rate(&self) -> f64 {
        self.loss_rate_sum / self.ticks.max(1) as f64
    }

    fn send(&mut self) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.controller
            .on_sent(seq, self.now)
            .expect("sequence numbers are unique");
        self.link.transmit(seq, self.now);
    }
}
