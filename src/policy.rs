//! 窗口决策策略接口
//! Window Decision Policy Interface
//!
//! 职责：
//! - 定义延迟/丢包信号到窗口调整的统一接口
//! - 每个策略拥有与之配套的延迟估算器
//! - 支持在构造时选择不同的策略

use crate::{
    config::PolicyConfig,
    delay::{AckSample, DelaySignal},
    loss::LossEstimator,
    tracker::SentRecord,
    window::Window,
};

pub mod ewma;
pub mod threshold;

pub use ewma::EwmaPriorityPolicy;
pub use threshold::ThresholdDelayPolicy;

/// Why the window moved.
///
/// 窗口调整的原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentReason {
    /// A datagram was presumed lost.
    /// 数据报被判定丢失。
    Loss,
    /// Relative delay at or below the increase threshold.
    LowDelay,
    /// Relative delay at or above the decrease threshold.
    HighDelay,
    /// Loss EWMA above the severe threshold.
    SevereLoss,
    /// Loss EWMA above the moderate threshold.
    ModerateLoss,
    /// RTT EWMA close to the minimum RTT.
    FastGrowth,
    /// RTT EWMA moderately above the minimum RTT.
    SlowGrowth,
    /// Latest RTT sample above the absolute ceiling.
    RttCeiling,
}

/// One applied window adjustment.
///
/// 一次已应用的窗口调整。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    pub reason: AdjustmentReason,
    /// The requested change, before clamping.
    /// 请求的变化量（限制范围之前）。
    pub delta: f64,
    /// The window size after clamping.
    /// 限制范围后的窗口大小。
    pub new_size: f64,
}

impl Adjustment {
    /// Applies `delta` to `window` and records the outcome.
    /// 把 `delta` 应用到 `window` 并记录结果。
    pub fn apply(window: &mut Window, reason: AdjustmentReason, delta: f64) -> Self {
        let new_size = window.adjust(delta);
        Self {
            reason,
            delta,
            new_size,
        }
    }
}

/// A rule converting delay and loss signals into window adjustments.
///
/// 将延迟与丢包信号转换为窗口调整的规则。
pub trait WindowPolicy: std::fmt::Debug + Send + Sync + 'static {
    /// Called for every record swept as lost, in send-time order. Loss-driven
    /// decreases are never rate limited.
    ///
    /// 对每个被判定丢失的记录按发送时间顺序调用。丢包导致的减窗不受限速约束。
    fn on_lost(&mut self, window: &mut Window, record: &SentRecord) -> Option<Adjustment>;

    /// Called once per delivered datagram, after `loss` has taken the sample.
    /// Feeds the paired delay estimator, then decides.
    ///
    /// 每个送达的数据报调用一次（在 `loss` 已更新之后）。先更新配套的延迟估算器，再做决策。
    fn on_delivered(
        &mut self,
        window: &mut Window,
        sample: &AckSample,
        loss: &LossEstimator,
    ) -> Vec<Adjustment>;

    /// The paired estimator's signal, `None` before the first sample.
    /// 配套估算器的信号，第一个样本之前为 `None`。
    fn delay_signal(&self) -> Option<DelaySignal>;

    /// A current round-trip estimate in milliseconds, when the policy has one.
    /// 当前往返时间估计（毫秒），策略不具备时为 `None`。
    fn rtt_estimate(&self) -> Option<f64> {
        None
    }

    fn name(&self) -> &'static str;
}

/// Builds the policy selected by `config`. The config is assumed validated.
///
/// 根据 `config` 构建所选策略。假定配置已通过校验。
pub fn from_config(config: &PolicyConfig) -> Box<dyn WindowPolicy> {
    match config {
        PolicyConfig::Threshold(cfg) => Box::new(ThresholdDelayPolicy::new(cfg.clone())),
        PolicyConfig::EwmaPriority(cfg) => Box::new(EwmaPriorityPolicy::new(cfg.clone())),
    }
}
