//! 拥塞控制器门面
//! Congestion Controller Facade
//!
//! The single object a sender talks to. It wires the outstanding-set tracker,
//! the loss estimator and the selected window policy together.
//!
//! 发送方唯一需要交互的对象。它把在途跟踪器、丢包估算器和所选的窗口策略连接在一起。

use crate::{
    config::{Config, IdleTimeoutConfig},
    delay::{AckSample, DelaySignal},
    diagnostics::{ControllerEvent, DiagnosticSink, TracingSink},
    error::Result,
    loss::LossEstimator,
    policy::{self, WindowPolicy},
    tracker::{AckOutcome, OutstandingTracker},
    window::Window,
};
use std::{fmt, time::Duration};

/// Whether the flow has datagrams in flight.
///
/// 流是否有在途数据报。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    HasOutstanding,
}

/// A snapshot of the controller, for telemetry.
///
/// 控制器快照，用于遥测。
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerStats {
    pub policy: &'static str,
    pub window_size: f64,
    pub outstanding: usize,
    pub loss_rate: f64,
    pub delay: Option<DelaySignal>,
    pub sent: u64,
    pub delivered: u64,
    pub lost: u64,
    pub stale_acks: u64,
}

impl fmt::Display for ControllerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Controller[policy:{}, window:{:.2}, outstanding:{}, loss:{:.3}",
            self.policy, self.window_size, self.outstanding, self.loss_rate
        )?;
        if let Some(delay) = self.delay {
            write!(
                f,
                ", delay:{:.1}ms/{:.1}ms",
                delay.current, delay.baseline
            )?;
        }
        write!(
            f,
            ", sent:{}, delivered:{}, lost:{}, stale:{}]",
            self.sent, self.delivered, self.lost, self.stale_acks
        )
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    sent: u64,
    delivered: u64,
    lost: u64,
    stale_acks: u64,
}

/// A congestion controller for one flow.
///
/// 单个流的拥塞控制器。
pub struct Controller {
    config: Config,
    tracker: OutstandingTracker,
    loss: LossEstimator,
    window: Window,
    policy: Box<dyn WindowPolicy>,
    sink: Box<dyn DiagnosticSink>,
    counters: Counters,
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("tracker", &self.tracker)
            .field("loss", &self.loss)
            .field("window", &self.window)
            .field("policy", &self.policy)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}

impl Controller {
    /// Creates a controller. Fails if any construction-time invariant is violated.
    ///
    /// 创建控制器。任何构造期不变量被违反时都会失败。
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tracker: OutstandingTracker::from_config(&config.tracker),
            loss: LossEstimator::new(config.loss_alpha),
            window: Window::new(&config.window),
            policy: policy::from_config(&config.policy),
            sink: Box::new(TracingSink),
            counters: Counters::default(),
            config,
        })
    }

    /// Replaces the diagnostic sink.
    /// 替换诊断接收器。
    pub fn with_sink(mut self, sink: impl DiagnosticSink) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A datagram was sent.
    ///
    /// 一个数据报已发送。
    pub fn on_sent(&mut self, sequence_number: u64, send_time: u64) -> Result<()> {
        self.tracker.record_sent(sequence_number, send_time)?;
        self.counters.sent += 1;
        self.sink.record(&ControllerEvent::Sent {
            sequence_number,
            send_time,
        });
        Ok(())
    }

    /// An ack was received.
    ///
    /// Acks for sequence numbers that are not outstanding are ignored entirely
    /// and leave every estimate untouched. Otherwise older records past the
    /// reorder window are swept as lost, in send order, before the acknowledged
    /// record is delivered.
    ///
    /// 收到一个ACK。
    ///
    /// 对不在途的序列号的ACK会被完全忽略，不影响任何估计。否则先按发送顺序
    /// 清除超出乱序窗口的较早记录，再确认被ACK的记录。
    pub fn on_ack(&mut self, sample: AckSample) -> AckOutcome {
        if !self.tracker.contains(sample.sequence_number) {
            self.counters.stale_acks += 1;
            self.sink.record(&ControllerEvent::StaleAck {
                sequence_number: sample.sequence_number,
            });
            return AckOutcome::AlreadyGone;
        }

        let resolution = self
            .tracker
            .resolve(sample.sequence_number, sample.send_time);

        for record in &resolution.lost {
            self.counters.lost += 1;
            self.loss.on_lost();
            self.sink.record(&ControllerEvent::Lost {
                sequence_number: record.sequence_number,
                send_time: record.send_time,
            });
            if let Some(adjustment) = self.policy.on_lost(&mut self.window, record) {
                self.sink.record(&ControllerEvent::WindowAdjusted(adjustment));
            }
        }

        if resolution.delivered.is_some() {
            self.counters.delivered += 1;
            self.loss.on_delivered();
            self.tracker.observe_rtt(sample.rtt());
            self.sink.record(&ControllerEvent::Delivered {
                sequence_number: sample.sequence_number,
                send_time: sample.send_time,
                receive_time: sample.receive_time,
                ack_arrival_time: sample.ack_arrival_time,
            });
            for adjustment in self
                .policy
                .on_delivered(&mut self.window, &sample, &self.loss)
            {
                self.sink.record(&ControllerEvent::WindowAdjusted(adjustment));
            }
        }

        resolution.outcome()
    }

    /// Whether the sender may transmit another datagram now.
    ///
    /// 发送方现在是否可以再发送一个数据报。
    pub fn window_is_open(&self) -> bool {
        (self.tracker.len() as u64) < self.window.allowance()
    }

    /// The clamped window, for telemetry only.
    /// 限制范围后的窗口大小，仅用于遥测。
    pub fn current_window_size(&self) -> f64 {
        self.window.size()
    }

    pub fn outstanding_count(&self) -> usize {
        self.tracker.len()
    }

    pub fn state(&self) -> FlowState {
        if self.tracker.is_empty() {
            FlowState::Idle
        } else {
            FlowState::HasOutstanding
        }
    }

    pub fn loss_rate(&self) -> f64 {
        self.loss.rate()
    }

    pub fn delay_signal(&self) -> Option<DelaySignal> {
        self.policy.delay_signal()
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn reorder_window_ms(&self) -> u64 {
        self.tracker.reorder_window_ms()
    }

    /// How long to wait with no acks before the sender takes a fallback action.
    ///
    /// A delay-derived timeout needs a round-trip estimate; flows without
    /// samples yet get the configured minimum. Results past `max` saturate.
    ///
    /// 在没有ACK的情况下，发送方采取后备动作前应等待的时长。
    pub fn idle_timeout(&self) -> Duration {
        match self.config.idle_timeout {
            IdleTimeoutConfig::Fixed(timeout) => timeout,
            IdleTimeoutConfig::DelayDerived {
                multiplier,
                min,
                max,
            } => match self.policy.rtt_estimate() {
                Some(rtt) if rtt.is_finite() && rtt > 0.0 => {
                    let timeout_ms = rtt * multiplier;
                    if timeout_ms >= max.as_secs_f64() * 1000.0 {
                        return max;
                    }
                    Duration::try_from_secs_f64(timeout_ms / 1000.0)
                        .map_or(max, |timeout| timeout.clamp(min, max))
                }
                _ => min,
            },
        }
    }

    pub fn stats(&self) -> ControllerStats {
        ControllerStats {
            policy: self.policy.name(),
            window_size: self.window.size(),
            outstanding: self.tracker.len(),
            loss_rate: self.loss.rate(),
            delay: self.policy.delay_signal(),
            sent: self.counters.sent,
            delivered: self.counters.delivered,
            lost: self.counters.lost,
            stale_acks: self.counters.stale_acks,
        }
    }
}
