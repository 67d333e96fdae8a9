//! 延迟估算器
//! Delay Estimators
//!
//! Both strategies reduce noisy timing samples to the same shape: a best-ever
//! baseline and a current value. The decision policies only look at that shape.
//!
//! 两种策略都把带噪声的时间样本归约为同一形式：历史最佳基线与当前值。

use tracing::trace;

/// The timing information carried by one acknowledgment.
///
/// 一个ACK携带的时间信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckSample {
    /// 被确认的序列号
    pub sequence_number: u64,
    /// When the datagram was sent (sender clock).
    /// 数据报的发送时间（发送方时钟）。
    pub send_time: u64,
    /// When the datagram was received (receiver clock).
    /// 数据报的接收时间（接收方时钟）。
    pub receive_time: u64,
    /// When the ack reached the sender (sender clock).
    /// ACK 到达发送方的时间（发送方时钟）。
    pub ack_arrival_time: u64,
}

impl AckSample {
    /// Receive time minus send time across unsynchronized clocks. Only
    /// meaningful relative to its own minimum; may be negative.
    ///
    /// 跨非同步时钟的接收时间减发送时间。仅相对其自身最小值有意义，可能为负。
    pub fn skew(&self) -> i64 {
        (self.receive_time as i64).wrapping_sub(self.send_time as i64)
    }

    /// Round-trip time, measured entirely on the sender clock.
    /// 往返时间，完全在发送方时钟上测量。
    pub fn rtt(&self) -> i64 {
        (self.ack_arrival_time as i64).wrapping_sub(self.send_time as i64)
    }
}

/// The delay signal consumed by the decision policies, in milliseconds.
///
/// 决策策略所使用的延迟信号（毫秒）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelaySignal {
    /// The best (lowest) value ever seen. Never increases.
    /// 见过的最佳（最低）值。只减不增。
    pub baseline: f64,
    /// The current, possibly smoothed, value.
    /// 当前值（可能经过平滑）。
    pub current: f64,
    /// The raw value of the most recent sample.
    /// 最近一个样本的原始值。
    pub latest: f64,
}

impl DelaySignal {
    /// Current delay in excess of the baseline.
    /// 当前延迟超出基线的部分。
    pub fn excess(&self) -> f64 {
        self.current - self.baseline
    }
}

/// A strategy turning delivered-ack samples into a [`DelaySignal`].
///
/// 把已送达ACK的样本转换为 [`DelaySignal`] 的策略。
pub trait DelayEstimator: std::fmt::Debug + Send + Sync + 'static {
    /// Called once per delivered datagram.
    /// 每个送达的数据报调用一次。
    fn on_delivered(&mut self, sample: &AckSample);

    /// `None` until the first sample.
    /// 在第一个样本之前为 `None`。
    fn signal(&self) -> Option<DelaySignal>;

    fn name(&self) -> &'static str;
}

/// Tracks excess one-way delay relative to the best skew ever seen. Constant
/// clock offset between the peers cancels out.
///
/// 跟踪相对历史最佳偏差的单向额外延迟。两端时钟的固定偏移会被抵消。
#[derive(Debug, Clone, Default)]
pub struct OwtSkewEstimator {
    best_skew: Option<i64>,
    last_skew: Option<i64>,
}

impl OwtSkewEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn best_skew(&self) -> Option<i64> {
        self.best_skew
    }

    /// Latest skew minus the best skew. Zero or positive.
    /// 最近偏差减去最佳偏差，非负。
    pub fn relative_delay(&self) -> Option<f64> {
        self.signal().map(|signal| signal.excess())
    }
}

impl DelayEstimator for OwtSkewEstimator {
    fn on_delivered(&mut self, sample: &AckSample) {
        let skew = sample.skew();
        let best = self.best_skew.map_or(skew, |best| best.min(skew));
        self.best_skew = Some(best);
        self.last_skew = Some(skew);
        trace!(skew, best_skew = best, "OWT skew sample");
    }

    fn signal(&self) -> Option<DelaySignal> {
        let (best, last) = (self.best_skew?, self.last_skew?);
        Some(DelaySignal {
            baseline: best as f64,
            current: last as f64,
            latest: last as f64,
        })
    }

    fn name(&self) -> &'static str {
        "owt-skew"
    }
}

/// Tracks the minimum RTT and an exponentially-weighted moving average of it.
/// The first sample seeds the average.
///
/// 跟踪最小 RTT 及其指数加权移动平均。第一个样本作为平均值的初值。
#[derive(Debug, Clone)]
pub struct RttEstimator {
    alpha: f64,
    min_rtt: Option<f64>,
    rtt_ewma: Option<f64>,
    latest: Option<f64>,
}

impl RttEstimator {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            min_rtt: None,
            rtt_ewma: None,
            latest: None,
        }
    }

    pub fn min_rtt(&self) -> Option<f64> {
        self.min_rtt
    }

    pub fn rtt_ewma(&self) -> Option<f64> {
        self.rtt_ewma
    }

    pub fn latest_rtt(&self) -> Option<f64> {
        self.latest
    }
}

impl DelayEstimator for RttEstimator {
    fn on_delivered(&mut self, sample: &AckSample) {
        let rtt = sample.rtt() as f64;
        self.min_rtt = Some(self.min_rtt.map_or(rtt, |min| min.min(rtt)));
        self.rtt_ewma = Some(match self.rtt_ewma {
            None => rtt,
            Some(ewma) => self.alpha * rtt + (1.0 - self.alpha) * ewma,
        });
        self.latest = Some(rtt);
        trace!(rtt, min_rtt = ?self.min_rtt, rtt_ewma = ?self.rtt_ewma, "RTT sample");
    }

    fn signal(&self) -> Option<DelaySignal> {
        Some(DelaySignal {
            baseline: self.min_rtt?,
            current: self.rtt_ewma?,
            latest: self.latest?,
        })
    }

    fn name(&self) -> &'static str {
        "rtt-ewma"
    }
}
