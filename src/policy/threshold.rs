//! Threshold-on-relative-delay decisions over the one-way-delay skew.
//!
//! 基于单向延迟偏差的相对延迟阈值决策。

use super::{Adjustment, AdjustmentReason, WindowPolicy};
use crate::{
    config::{RttScaledLimit, ThresholdConfig},
    delay::{AckSample, DelayEstimator, DelaySignal, OwtSkewEstimator},
    loss::LossEstimator,
    tracker::SentRecord,
    window::Window,
};
use tracing::trace;

/// Evaluates every delivered ack immediately. The increase and decrease
/// conditions are independent, so both fire when the relative delay equals
/// a shared threshold.
///
/// With an [`RttScaledLimit`] the fixed thresholds are replaced by a single
/// limit derived from the minimum RTT, and exactly one of the two fires.
///
/// 对每个送达的ACK立即评估。增窗与减窗条件相互独立，
/// 当相对延迟恰好等于共同阈值时两者都会触发。
/// 配置 [`RttScaledLimit`] 时改用由最小 RTT 推导出的单一上限，且只触发其一。
#[derive(Debug)]
pub struct ThresholdDelayPolicy {
    config: ThresholdConfig,
    estimator: OwtSkewEstimator,
    min_rtt: Option<f64>,
}

impl ThresholdDelayPolicy {
    pub fn new(config: ThresholdConfig) -> Self {
        Self {
            config,
            estimator: OwtSkewEstimator::new(),
            min_rtt: None,
        }
    }

    pub fn estimator(&self) -> &OwtSkewEstimator {
        &self.estimator
    }

    /// Lowest RTT seen on the sender clock.
    /// 发送方时钟上观测到的最小 RTT。
    pub fn min_rtt(&self) -> Option<f64> {
        self.min_rtt
    }

    /// The relative delay tolerated before the window shrinks under `limit`.
    ///
    /// 在 `limit` 下窗口开始缩小之前可容忍的相对延迟。
    pub fn tolerated_delay(limit: &RttScaledLimit, min_rtt: f64) -> f64 {
        let owt = min_rtt / 2.0;
        (limit.factor * owt).max(owt + limit.min_headroom_ms) - owt
    }

    fn observe_rtt(&mut self, sample: &AckSample) {
        let rtt = sample.rtt() as f64;
        self.min_rtt = Some(self.min_rtt.map_or(rtt, |min| min.min(rtt)));
    }
}

impl WindowPolicy for ThresholdDelayPolicy {
    fn on_lost(&mut self, window: &mut Window, _record: &SentRecord) -> Option<Adjustment> {
        (self.config.loss_delta > 0.0)
            .then(|| Adjustment::apply(window, AdjustmentReason::Loss, -self.config.loss_delta))
    }

    fn on_delivered(
        &mut self,
        window: &mut Window,
        sample: &AckSample,
        _loss: &LossEstimator,
    ) -> Vec<Adjustment> {
        self.estimator.on_delivered(sample);
        self.observe_rtt(sample);
        let Some(relative_delay) = self.estimator.relative_delay() else {
            return Vec::new();
        };

        if let (Some(limit), Some(min_rtt)) = (self.config.rtt_scaled_limit, self.min_rtt) {
            let tolerated = Self::tolerated_delay(&limit, min_rtt);
            let adjustment = if relative_delay <= tolerated {
                Adjustment::apply(window, AdjustmentReason::LowDelay, self.config.up_delta)
            } else {
                Adjustment::apply(window, AdjustmentReason::HighDelay, -self.config.down_delta)
            };
            trace!(
                relative_delay,
                tolerated,
                min_rtt,
                window = window.size(),
                "Threshold policy evaluated against RTT-scaled limit"
            );
            return vec![adjustment];
        }

        let mut adjustments = Vec::with_capacity(2);
        if relative_delay <= self.config.up_threshold {
            adjustments.push(Adjustment::apply(
                window,
                AdjustmentReason::LowDelay,
                self.config.up_delta,
            ));
        }
        if relative_delay >= self.config.down_threshold {
            adjustments.push(Adjustment::apply(
                window,
                AdjustmentReason::HighDelay,
                -self.config.down_delta,
            ));
        }
        trace!(
            relative_delay,
            window = window.size(),
            "Threshold policy evaluated"
        );
        adjustments
    }

    fn delay_signal(&self) -> Option<DelaySignal> {
        self.estimator.signal()
    }

    fn rtt_estimate(&self) -> Option<f64> {
        self.min_rtt
    }

    fn name(&self) -> &'static str {
        "threshold-delay"
    }
}
