//! Commands sent to the controller actor.

use crate::{
    controller::ControllerStats,
    delay::AckSample,
    error::Result,
    tracker::AckOutcome,
};
use std::time::Duration;
use tokio::sync::oneshot;

/// Commands sent to the `ControllerActor`.
///
/// 发送到 `ControllerActor` 的命令。
#[derive(Debug)]
pub enum ControllerCommand {
    /// 一个数据报已发送
    Sent {
        sequence_number: u64,
        send_time: u64,
        response_tx: oneshot::Sender<Result<()>>,
    },
    /// 收到一个ACK
    Ack {
        sample: AckSample,
        response_tx: oneshot::Sender<AckOutcome>,
    },
    WindowIsOpen {
        response_tx: oneshot::Sender<bool>,
    },
    WindowSize {
        response_tx: oneshot::Sender<f64>,
    },
    IdleTimeout {
        response_tx: oneshot::Sender<Duration>,
    },
    Stats {
        response_tx: oneshot::Sender<ControllerStats>,
    },
}
