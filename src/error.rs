//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.

use thiserror::Error;

/// The primary error type for the congestion controller.
/// 拥塞控制器的主要错误类型。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The increase threshold is above the decrease threshold.
    /// 增窗阈值高于减窗阈值。
    #[error("up threshold {up} must not exceed down threshold {down}")]
    InvertedThresholds { up: f64, down: f64 },

    /// A smoothing factor lies outside of `(0, 1]`.
    /// 平滑因子不在 `(0, 1]` 范围内。
    #[error("smoothing factor `{name}` must lie in (0, 1], got {value}")]
    InvalidSmoothingFactor { name: &'static str, value: f64 },

    /// The minimum window is larger than the maximum window.
    /// 最小窗口大于最大窗口。
    #[error("min window {min} exceeds max window {max}")]
    InvalidWindowBounds { min: f64, max: f64 },

    /// The minimum window would not allow forward progress.
    /// 最小窗口无法保证前进。
    #[error("min window {min} is below the floor of {floor}")]
    WindowBelowFloor { min: f64, floor: f64 },

    /// The initial window lies outside of the configured bounds.
    /// 初始窗口不在配置的范围内。
    #[error("initial window {initial} lies outside [{min}, {max}]")]
    InitialWindowOutOfRange { initial: f64, min: f64, max: f64 },

    /// Any other numeric parameter that failed validation.
    /// 其他未通过校验的数值参数。
    #[error("invalid value for `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// A datagram was recorded twice while still outstanding.
    /// 同一个数据报在未完成时被重复记录。
    #[error("sequence number {0} is already outstanding")]
    DuplicateSequence(u64),

    /// The controller actor has stopped.
    /// 控制器 actor 已停止。
    #[error("Internal channel is broken")]
    ChannelClosed,
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;
