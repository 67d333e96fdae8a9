#![deny(clippy::expect_used, clippy::unwrap_used)]

//! Congestion control for a datagram sender.
//!
//! Given "datagram sent" and "ack received" events, a [`Controller`] decides
//! how many datagrams may be outstanding at once and how long the sender
//! should wait, with no acks, before acting on its own.
//!
//! 数据报发送方的拥塞控制。
//!
//! 根据"数据报已发送"与"收到ACK"事件，[`Controller`] 决定同时可以有多少个在途数据报，
//! 以及在没有ACK时发送方应等待多久再自行采取行动。

pub mod clock;
pub mod config;
pub mod controller;
pub mod delay;
pub mod diagnostics;
pub mod error;
pub mod handle;
pub mod loss;
pub mod policy;
pub mod tracker;
pub mod window;

pub use config::{
    Config, EwmaPriorityConfig, IdleTimeoutConfig, PolicyConfig, RttScaledLimit, ThresholdConfig,
    TrackerConfig, WindowConfig,
};
pub use controller::{Controller, ControllerStats, FlowState};
pub use delay::{AckSample, DelaySignal};
pub use diagnostics::{ControllerEvent, DiagnosticSink, NullSink, TracingSink};
pub use error::{Error, Result};
pub use handle::ControllerHandle;
pub use policy::{Adjustment, AdjustmentReason, EwmaPriorityPolicy, ThresholdDelayPolicy, WindowPolicy};
pub use tracker::{AckOutcome, SentRecord};
