//! The clamped congestion window.
//! 带范围限制的拥塞窗口。

use crate::config::WindowConfig;

/// A floating-point window, clamped into `[min, max]` after every mutation.
///
/// 浮点窗口，每次修改后都被限制在 `[min, max]` 之内。
#[derive(Debug, Clone)]
pub struct Window {
    size: f64,
    min: f64,
    max: f64,
    /// Sender time of the last rate-limited decision.
    /// 上一次限速决策的发送方时间。
    last_adjusted_at: Option<u64>,
}

impl Window {
    pub fn new(config: &WindowConfig) -> Self {
        Self {
            size: config.initial_size.clamp(config.min_size, config.max_size),
            min: config.min_size,
            max: config.max_size,
            last_adjusted_at: None,
        }
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    /// The whole number of datagrams the sender may keep in flight.
    /// 发送方可保持在途的数据报整数个数。
    pub fn allowance(&self) -> u64 {
        self.size.floor() as u64
    }

    /// Adds `delta` (which may be negative) and clamps. Returns the new size.
    ///
    /// 加上 `delta`（可为负）并限制范围。返回新的大小。
    pub fn adjust(&mut self, delta: f64) -> f64 {
        self.size = (self.size + delta).clamp(self.min, self.max);
        self.size
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    pub fn last_adjusted_at(&self) -> Option<u64> {
        self.last_adjusted_at
    }

    /// Whether at least `interval_ms` passed since the last decision.
    /// 距上次决策是否已过去至少 `interval_ms`。
    pub fn decision_due(&self, now: u64, interval_ms: u64) -> bool {
        self.last_adjusted_at
            .is_none_or(|last| now.saturating_sub(last) >= interval_ms)
    }

    pub fn mark_decision(&mut self, now: u64) {
        self.last_adjusted_at = Some(now);
    }
}
