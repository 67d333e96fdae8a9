//! A smoothed loss-rate estimator.
//! 平滑丢包率估算器。

/// Maintains `loss_ewma` over binary samples: `1.0` per lost datagram and
/// `0.0` per delivered one.
///
/// 在二值样本上维护 `loss_ewma`：每个丢失的数据报为 `1.0`，每个送达的为 `0.0`。
#[derive(Debug, Clone)]
pub struct LossEstimator {
    alpha: f64,
    loss_ewma: f64,
}

impl LossEstimator {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            loss_ewma: 0.0,
        }
    }

    pub fn on_lost(&mut self) {
        self.update(1.0);
    }

    pub fn on_delivered(&mut self) {
        self.update(0.0);
    }

    /// The current smoothed loss rate, always within `[0, 1]`.
    /// 当前平滑丢包率，始终在 `[0, 1]` 内。
    pub fn rate(&self) -> f64 {
        self.loss_ewma
    }

    fn update(&mut self, sample: f64) {
        self.loss_ewma = self.alpha * sample + (1.0 - self.alpha) * self.loss_ewma;
    }
}
