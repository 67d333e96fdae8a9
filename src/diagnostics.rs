//! 诊断旁路通道
//! Diagnostic side-channel
//!
//! The controller never writes output itself. Every notable step is reported
//! as a [`ControllerEvent`] to an injected [`DiagnosticSink`].
//!
//! 控制器本身从不输出。每个值得注意的步骤都会以 [`ControllerEvent`]
//! 的形式报告给注入的 [`DiagnosticSink`]。

use crate::policy::Adjustment;
use tracing::{debug, trace};

/// A notable step inside the controller.
///
/// 控制器内部的一个值得注意的步骤。
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// 数据报已发送
    Sent { sequence_number: u64, send_time: u64 },
    /// 数据报被判定丢失
    Lost { sequence_number: u64, send_time: u64 },
    /// 数据报已送达
    Delivered {
        sequence_number: u64,
        send_time: u64,
        receive_time: u64,
        ack_arrival_time: u64,
    },
    /// An ack matched nothing.
    /// ACK 未匹配任何记录。
    StaleAck { sequence_number: u64 },
    /// 窗口已调整
    WindowAdjusted(Adjustment),
}

/// Receives controller events. Implementations must be cheap and must not
/// call back into the controller.
///
/// 接收控制器事件。实现必须开销低廉，且不得回调控制器。
pub trait DiagnosticSink: Send + Sync + 'static {
    fn record(&self, event: &ControllerEvent);
}

/// Forwards events to `tracing`.
///
/// 将事件转发给 `tracing`。
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, event: &ControllerEvent) {
        match event {
            ControllerEvent::Sent {
                sequence_number,
                send_time,
            } => trace!(seq = sequence_number, send_time, "Sent datagram"),
            ControllerEvent::Lost {
                sequence_number,
                send_time,
            } => debug!(seq = sequence_number, send_time, "Datagram presumed lost"),
            ControllerEvent::Delivered {
                sequence_number,
                send_time,
                receive_time,
                ack_arrival_time,
            } => trace!(
                seq = sequence_number,
                send_time,
                receive_time,
                ack_arrival_time,
                "Received ack"
            ),
            ControllerEvent::StaleAck { sequence_number } => {
                debug!(seq = sequence_number, "Ignoring stale or duplicate ack")
            }
            ControllerEvent::WindowAdjusted(adjustment) => debug!(
                reason = ?adjustment.reason,
                delta = adjustment.delta,
                window = adjustment.new_size,
                "Window adjusted"
            ),
        }
    }
}

/// Discards every event.
/// 丢弃所有事件。
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&self, _event: &ControllerEvent) {}
}

#[cfg(test)]
pub(crate) use self::testing::RecordingSink;

#[cfg(test)]
mod testing {
    use super::{ControllerEvent, DiagnosticSink};
    use std::sync::{Arc, Mutex};

    /// Keeps every event for later inspection.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct RecordingSink {
        events: Arc<Mutex<Vec<ControllerEvent>>>,
    }

    impl RecordingSink {
        pub(crate) fn events(&self) -> Vec<ControllerEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl DiagnosticSink for RecordingSink {
        fn record(&self, event: &ControllerEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }
}
