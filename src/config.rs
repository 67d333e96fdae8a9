//! 定义了拥塞控制器的可配置参数。
//! Defines configurable parameters for the congestion controller.

use crate::error::{Error, Result};
use std::time::Duration;

/// A structure containing all configurable parameters for one flow's controller.
///
/// 包含单个流控制器所有可配置参数的结构体。
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Outstanding-set tracking parameters.
    /// 在途集合跟踪参数。
    pub tracker: TrackerConfig,

    /// Window bounds and initial size.
    /// 窗口范围与初始大小。
    pub window: WindowConfig,

    /// Smoothing factor of the loss-rate EWMA.
    /// 丢包率 EWMA 的平滑因子。
    pub loss_alpha: f64,

    /// The decision policy and its paired delay estimator.
    /// 决策策略及其配套的延迟估算器。
    pub policy: PolicyConfig,

    /// How long the sender waits with a stalled window before acting.
    /// 窗口停滞时发送方在采取行动前等待的时长。
    pub idle_timeout: IdleTimeoutConfig,
}

/// Outstanding-set tracking parameters.
///
/// 在途集合跟踪参数。
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// The maximum send-time skew tolerated before an older outstanding
    /// datagram is presumed lost rather than reordered.
    /// 在较早的在途数据报被判定为丢失（而不是乱序）之前所容忍的最大发送时间差。
    pub reorder_window_ms: u64,
    /// When set, every new minimum RTT resets the reorder window to
    /// `(min_rtt + 10) / 2`.
    /// 启用后，每个新的最小 RTT 会把乱序窗口重置为 `(min_rtt + 10) / 2`。
    pub adapt_to_min_rtt: bool,
}

/// Window bounds.
///
/// 窗口范围。
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    /// 初始窗口大小（以数据报为单位）。
    pub initial_size: f64,
    /// 最小窗口大小。
    pub min_size: f64,
    /// 最大窗口大小。
    pub max_size: f64,
    /// The lowest `min_size` this deployment accepts. At least one datagram,
    /// so an empty flow can always send.
    /// 本部署接受的最小 `min_size`。至少为一个数据报。
    pub floor: f64,
}

/// Selects the decision rule together with the delay estimator it consumes.
///
/// 选择决策规则及其使用的延迟估算器。
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyConfig {
    /// One-way-delay skew with per-ack threshold decisions.
    /// 单向延迟偏差 + 逐ACK阈值决策。
    Threshold(ThresholdConfig),
    /// RTT EWMA with rate-limited, prioritized decisions.
    /// RTT EWMA + 限速的优先级决策。
    EwmaPriority(EwmaPriorityConfig),
}

/// Parameters of the threshold-on-relative-delay rule.
///
/// 相对延迟阈值规则的参数。
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdConfig {
    /// Relative delay (ms) at or below which the window grows.
    /// 相对延迟（毫秒）不高于此值时增大窗口。
    pub up_threshold: f64,
    /// Relative delay (ms) at or above which the window shrinks.
    /// 相对延迟（毫秒）不低于此值时减小窗口。
    pub down_threshold: f64,
    pub up_delta: f64,
    pub down_delta: f64,
    /// Decrease applied for every datagram swept as lost.
    /// 每个被判定丢失的数据报所导致的减少量。
    pub loss_delta: f64,
    /// When set, the tolerated relative delay follows the path's minimum RTT
    /// instead of the fixed thresholds.
    /// 启用后，可容忍的相对延迟随路径最小 RTT 变化，而不是使用固定阈值。
    pub rtt_scaled_limit: Option<RttScaledLimit>,
}

/// A delay limit proportional to the path length.
///
/// With `owt = min_rtt / 2`, the estimated one-way delay may reach
/// `max(factor * owt, owt + min_headroom_ms)` before the window shrinks.
/// Below or at the limit the window grows by `up_delta`, above it it shrinks
/// by `down_delta`.
///
/// 与路径长度成比例的延迟上限。估计单向延迟不超过
/// `max(factor * owt, owt + min_headroom_ms)` 时增窗，否则减窗。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RttScaledLimit {
    pub factor: f64,
    pub min_headroom_ms: f64,
}

/// Parameters of the thresholded EWMA rule.
///
/// 阈值化 EWMA 规则的参数。
#[derive(Debug, Clone, PartialEq)]
pub struct EwmaPriorityConfig {
    /// Smoothing factor of the RTT EWMA.
    /// RTT EWMA 的平滑因子。
    pub rtt_alpha: f64,
    /// Minimum spacing between two delay/loss driven decisions.
    /// 两次由延迟/丢包驱动的决策之间的最小间隔。
    pub decision_interval_ms: u64,
    /// Size of one adjustment step, in datagrams.
    /// 单次调整步长（以数据报为单位）。
    pub step: f64,
    /// Decrease applied for every datagram swept as lost, outside of the rate limit.
    /// 每个被判定丢失的数据报所导致的减少量，不受限速约束。
    pub loss_delta: f64,
    /// Loss EWMA above which the window shrinks by two steps.
    pub severe_loss_rate: f64,
    /// Loss EWMA above which the window shrinks by one step.
    pub moderate_loss_rate: f64,
    /// RTT headroom over the minimum below which the window grows by two steps.
    pub fast_growth_headroom_ms: f64,
    /// RTT headroom over the minimum below which the window grows by one step.
    pub slow_growth_headroom_ms: f64,
    /// Absolute RTT above which the window shrinks by one step.
    pub rtt_ceiling_ms: f64,
}

/// How the idle timeout is chosen.
///
/// 空闲超时的确定方式。
#[derive(Debug, Clone, PartialEq)]
pub enum IdleTimeoutConfig {
    /// A policy constant.
    /// 固定常量。
    Fixed(Duration),
    /// `multiplier` times the policy's current delay estimate, clamped to
    /// `[min, max]`. Before the first sample the timeout is `min`.
    ///
    /// 策略当前延迟估计乘以 `multiplier`，并限制在 `[min, max]` 内。
    DelayDerived {
        multiplier: f64,
        min: Duration,
        max: Duration,
    },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            window: WindowConfig::default(),
            loss_alpha: 0.1,
            policy: PolicyConfig::default(),
            idle_timeout: IdleTimeoutConfig::default(),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            reorder_window_ms: 20,
            adapt_to_min_rtt: false,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            initial_size: 16.0,
            min_size: 2.0,
            max_size: 10_000.0,
            floor: 2.0,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::Threshold(ThresholdConfig::default())
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            up_threshold: 10.0,
            down_threshold: 10.0,
            up_delta: 0.25,
            down_delta: 0.25,
            loss_delta: 0.25,
            rtt_scaled_limit: None,
        }
    }
}

impl Default for RttScaledLimit {
    fn default() -> Self {
        Self {
            factor: 1.45,
            min_headroom_ms: 10.0,
        }
    }
}

impl Default for EwmaPriorityConfig {
    fn default() -> Self {
        Self {
            rtt_alpha: 0.1,
            decision_interval_ms: 10,
            step: 1.0,
            loss_delta: 0.0,
            severe_loss_rate: 0.5,
            moderate_loss_rate: 0.05,
            fast_growth_headroom_ms: 40.0,
            slow_growth_headroom_ms: 200.0,
            rtt_ceiling_ms: 1200.0,
        }
    }
}

impl Default for IdleTimeoutConfig {
    fn default() -> Self {
        Self::Fixed(Duration::from_millis(50))
    }
}

impl Config {
    /// Checks every construction-time invariant. Nothing is clamped silently.
    ///
    /// 检查所有构造期不变量。不会静默修正任何值。
    pub fn validate(&self) -> Result<()> {
        self.window.validate()?;
        check_alpha("loss_alpha", self.loss_alpha)?;
        match &self.policy {
            PolicyConfig::Threshold(cfg) => cfg.validate()?,
            PolicyConfig::EwmaPriority(cfg) => cfg.validate()?,
        }
        self.idle_timeout.validate()
    }
}

impl WindowConfig {
    fn validate(&self) -> Result<()> {
        let Self {
            initial_size,
            min_size,
            max_size,
            floor,
        } = *self;
        if !floor.is_finite() || floor < 1.0 {
            return Err(Error::InvalidParameter {
                name: "window.floor",
                value: floor,
            });
        }
        if !min_size.is_finite() || min_size < floor {
            return Err(Error::WindowBelowFloor {
                min: min_size,
                floor,
            });
        }
        if !max_size.is_finite() || min_size > max_size {
            return Err(Error::InvalidWindowBounds {
                min: min_size,
                max: max_size,
            });
        }
        if !(min_size..=max_size).contains(&initial_size) {
            return Err(Error::InitialWindowOutOfRange {
                initial: initial_size,
                min: min_size,
                max: max_size,
            });
        }
        Ok(())
    }
}

impl ThresholdConfig {
    fn validate(&self) -> Result<()> {
        if self.up_threshold > self.down_threshold {
            return Err(Error::InvertedThresholds {
                up: self.up_threshold,
                down: self.down_threshold,
            });
        }
        check_non_negative("up_delta", self.up_delta)?;
        check_non_negative("down_delta", self.down_delta)?;
        check_non_negative("loss_delta", self.loss_delta)?;
        if let Some(limit) = self.rtt_scaled_limit {
            if !limit.factor.is_finite() || limit.factor < 1.0 {
                return Err(Error::InvalidParameter {
                    name: "rtt_scaled_limit.factor",
                    value: limit.factor,
                });
            }
            check_non_negative("rtt_scaled_limit.min_headroom_ms", limit.min_headroom_ms)?;
        }
        Ok(())
    }
}

impl EwmaPriorityConfig {
    fn validate(&self) -> Result<()> {
        check_alpha("rtt_alpha", self.rtt_alpha)?;
        if self.decision_interval_ms == 0 {
            return Err(Error::InvalidParameter {
                name: "decision_interval_ms",
                value: 0.0,
            });
        }
        check_non_negative("step", self.step)?;
        check_non_negative("loss_delta", self.loss_delta)?;
        if self.moderate_loss_rate > self.severe_loss_rate {
            return Err(Error::InvertedThresholds {
                up: self.moderate_loss_rate,
                down: self.severe_loss_rate,
            });
        }
        if self.fast_growth_headroom_ms > self.slow_growth_headroom_ms {
            return Err(Error::InvertedThresholds {
                up: self.fast_growth_headroom_ms,
                down: self.slow_growth_headroom_ms,
            });
        }
        Ok(())
    }
}

impl IdleTimeoutConfig {
    fn validate(&self) -> Result<()> {
        match *self {
            Self::Fixed(_) => Ok(()),
            Self::DelayDerived { multiplier, min, max } => {
                if !multiplier.is_finite() || multiplier <= 0.0 {
                    return Err(Error::InvalidParameter {
                        name: "idle_timeout.multiplier",
                        value: multiplier,
                    });
                }
                if min > max {
                    return Err(Error::InvalidParameter {
                        name: "idle_timeout.min",
                        value: min.as_secs_f64() * 1000.0,
                    });
                }
                Ok(())
            }
        }
    }
}

fn check_alpha(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidSmoothingFactor { name, value })
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));

        let ewma = Config {
            policy: PolicyConfig::EwmaPriority(EwmaPriorityConfig::default()),
            ..Default::default()
        };
        assert_eq!(ewma.validate(), Ok(()));
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let config = Config {
            policy: PolicyConfig::Threshold(ThresholdConfig {
                up_threshold: 20.0,
                down_threshold: 10.0,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(Error::InvertedThresholds {
                up: 20.0,
                down: 10.0
            })
        );
    }

    #[test]
    fn test_bad_smoothing_factor_rejected() {
        let mut config = Config::default();
        config.loss_alpha = 0.0;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidSmoothingFactor {
                name: "loss_alpha",
                ..
            })
        ));

        let config = Config {
            policy: PolicyConfig::EwmaPriority(EwmaPriorityConfig {
                rtt_alpha: 1.5,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidSmoothingFactor {
                name: "rtt_alpha",
                ..
            })
        ));
    }

    #[test]
    fn test_window_bounds_rejected() {
        let mut config = Config::default();
        config.window = WindowConfig {
            initial_size: 16.0,
            min_size: 50.0,
            max_size: 20.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(Error::InvalidWindowBounds {
                min: 50.0,
                max: 20.0
            })
        );

        config.window = WindowConfig {
            initial_size: 16.0,
            min_size: 0.5,
            max_size: 20.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::WindowBelowFloor { .. })
        ));

        config.window = WindowConfig {
            initial_size: 1.0,
            min_size: 2.0,
            max_size: 20.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InitialWindowOutOfRange { .. })
        ));
    }

    #[test]
    fn test_configured_floor_bounds_min_size() {
        let mut config = Config::default();
        config.window.floor = 4.0;
        assert_eq!(
            config.validate(),
            Err(Error::WindowBelowFloor {
                min: 2.0,
                floor: 4.0
            })
        );

        config.window.min_size = 4.0;
        assert_eq!(config.validate(), Ok(()));

        config.window.floor = 0.5;
        config.window.min_size = 0.5;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidParameter {
                name: "window.floor",
                ..
            })
        ));
    }

    #[test]
    fn test_rtt_scaled_limit_validated() {
        let mut threshold = ThresholdConfig {
            rtt_scaled_limit: Some(RttScaledLimit::default()),
            ..Default::default()
        };
        let mut config = Config {
            policy: PolicyConfig::Threshold(threshold.clone()),
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));

        threshold.rtt_scaled_limit = Some(RttScaledLimit {
            factor: 0.9,
            min_headroom_ms: 10.0,
        });
        config.policy = PolicyConfig::Threshold(threshold);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidParameter {
                name: "rtt_scaled_limit.factor",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_decision_interval_rejected() {
        let config = Config {
            policy: PolicyConfig::EwmaPriority(EwmaPriorityConfig {
                decision_interval_ms: 0,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidParameter {
                name: "decision_interval_ms",
                ..
            })
        ));
    }

    #[test]
    fn test_delay_derived_idle_timeout_bounds() {
        let mut config = Config::default();
        config.idle_timeout = IdleTimeoutConfig::DelayDerived {
            multiplier: 2.0,
            min: Duration::from_millis(100),
            max: Duration::from_millis(10),
        };
        assert!(config.validate().is_err());

        config.idle_timeout = IdleTimeoutConfig::DelayDerived {
            multiplier: 2.0,
            min: Duration::from_millis(10),
            max: Duration::from_millis(100),
        };
        assert_eq!(config.validate(), Ok(()));
    }
}
