//! Rate-limited, prioritized decisions over the RTT and loss EWMAs.
//!
//! 基于 RTT 与丢包 EWMA 的限速优先级决策。

use super::{Adjustment, AdjustmentReason, WindowPolicy};
use crate::{
    config::EwmaPriorityConfig,
    delay::{AckSample, DelayEstimator, DelaySignal, RttEstimator},
    loss::LossEstimator,
    tracker::SentRecord,
    window::Window,
};
use tracing::trace;

/// At most one decision per `decision_interval_ms`. When due, the first
/// matching rule wins:
///
/// 1. loss EWMA above the severe rate: shrink by two steps
/// 2. loss EWMA above the moderate rate: shrink by one step
/// 3. RTT EWMA within the fast-growth headroom of the minimum: grow by two steps
/// 4. RTT EWMA within the slow-growth headroom of the minimum: grow by one step
/// 5. latest RTT above the ceiling: shrink by one step
///
/// 每个 `decision_interval_ms` 最多决策一次；到期时第一条匹配的规则生效。
#[derive(Debug)]
pub struct EwmaPriorityPolicy {
    config: EwmaPriorityConfig,
    estimator: RttEstimator,
}

impl EwmaPriorityPolicy {
    pub fn new(config: EwmaPriorityConfig) -> Self {
        let estimator = RttEstimator::new(config.rtt_alpha);
        Self { config, estimator }
    }

    pub fn estimator(&self) -> &RttEstimator {
        &self.estimator
    }

    fn decide(&self, signal: &DelaySignal, loss_rate: f64) -> Option<(AdjustmentReason, f64)> {
        let step = self.config.step;
        if loss_rate > self.config.severe_loss_rate {
            Some((AdjustmentReason::SevereLoss, -2.0 * step))
        } else if loss_rate > self.config.moderate_loss_rate {
            Some((AdjustmentReason::ModerateLoss, -step))
        } else if signal.current < signal.baseline + self.config.fast_growth_headroom_ms {
            Some((AdjustmentReason::FastGrowth, 2.0 * step))
        } else if signal.current < signal.baseline + self.config.slow_growth_headroom_ms {
            Some((AdjustmentReason::SlowGrowth, step))
        } else if signal.latest > self.config.rtt_ceiling_ms {
            Some((AdjustmentReason::RttCeiling, -step))
        } else {
            None
        }
    }
}

impl WindowPolicy for EwmaPriorityPolicy {
    fn on_lost(&mut self, window: &mut Window, _record: &SentRecord) -> Option<Adjustment> {
        (self.config.loss_delta > 0.0)
            .then(|| Adjustment::apply(window, AdjustmentReason::Loss, -self.config.loss_delta))
    }

    fn on_delivered(
        &mut self,
        window: &mut Window,
        sample: &AckSample,
        loss: &LossEstimator,
    ) -> Vec<Adjustment> {
        self.estimator.on_delivered(sample);

        let now = sample.ack_arrival_time;
        if !window.decision_due(now, self.config.decision_interval_ms) {
            return Vec::new();
        }
        let Some(signal) = self.estimator.signal() else {
            return Vec::new();
        };
        window.mark_decision(now);

        let decision = self.decide(&signal, loss.rate());
        trace!(
            rtt_ewma = signal.current,
            min_rtt = signal.baseline,
            loss_rate = loss.rate(),
            ?decision,
            "EWMA policy evaluated"
        );
        decision
            .map(|(reason, delta)| Adjustment::apply(window, reason, delta))
            .into_iter()
            .collect()
    }

    fn delay_signal(&self) -> Option<DelaySignal> {
        self.estimator.signal()
    }

    fn rtt_estimate(&self) -> Option<f64> {
        self.estimator.rtt_ewma()
    }

    fn name(&self) -> &'static str {
        "ewma-priority"
    }
}
