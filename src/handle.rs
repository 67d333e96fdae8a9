//! A cloneable, task-safe handle to a controller.
//!
//! The controller itself is synchronous and single-owner. When several tasks
//! drive one flow (say a send task and a receive task), the handle serialises
//! their calls through an actor mailbox.
//!
//! 可克隆、可跨任务使用的控制器句柄。控制器本身是同步且单一所有者的；
//! 当多个任务驱动同一个流时，句柄通过 actor 邮箱串行化它们的调用。

use crate::{
    clock::SenderClock,
    controller::{Controller, ControllerStats},
    delay::AckSample,
    error::{Error, Result},
    tracker::AckOutcome,
};
use actor::ControllerActor;
use command::ControllerCommand;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

mod actor;
pub mod command;

const COMMAND_CHANNEL_CAPACITY: usize = 1024;

/// A handle to a controller running in its own task.
///
/// 指向在独立任务中运行的控制器的句柄。
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    command_tx: mpsc::Sender<ControllerCommand>,
    clock: SenderClock,
}

impl ControllerHandle {
    /// Moves `controller` into a new task. Must be called within a tokio runtime.
    /// The task ends once every handle is dropped.
    ///
    /// 把 `controller` 移入一个新任务。必须在 tokio 运行时中调用。所有句柄被丢弃后任务结束。
    pub fn spawn(controller: Controller) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let actor = ControllerActor {
            controller,
            command_rx,
        };
        tokio::spawn(actor.run());
        Self {
            command_tx,
            clock: SenderClock::new(),
        }
    }

    /// The sender clock used by [`Self::on_sent_now`].
    /// [`Self::on_sent_now`] 使用的发送方时钟。
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub async fn on_sent(&self, sequence_number: u64, send_time: u64) -> Result<()> {
        self.request(|response_tx| ControllerCommand::Sent {
            sequence_number,
            send_time,
            response_tx,
        })
        .await?
    }

    /// Records a datagram sent now. Returns the send time used.
    ///
    /// 记录一个此刻发送的数据报。返回所使用的发送时间。
    pub async fn on_sent_now(&self, sequence_number: u64) -> Result<u64> {
        let send_time = self.now_ms();
        self.on_sent(sequence_number, send_time).await?;
        Ok(send_time)
    }

    pub async fn on_ack(&self, sample: AckSample) -> Result<AckOutcome> {
        self.request(|response_tx| ControllerCommand::Ack {
            sample,
            response_tx,
        })
        .await
    }

    pub async fn window_is_open(&self) -> Result<bool> {
        self.request(|response_tx| ControllerCommand::WindowIsOpen { response_tx })
            .await
    }

    pub async fn current_window_size(&self) -> Result<f64> {
        self.request(|response_tx| ControllerCommand::WindowSize { response_tx })
            .await
    }

    pub async fn idle_timeout(&self) -> Result<Duration> {
        self.request(|response_tx| ControllerCommand::IdleTimeout { response_tx })
            .await
    }

    pub async fn stats(&self) -> Result<ControllerStats> {
        self.request(|response_tx| ControllerCommand::Stats { response_tx })
            .await
    }

    async fn request<T>(
        &self,
        make_command: impl FnOnce(oneshot::Sender<T>) -> ControllerCommand,
    ) -> Result<T> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(make_command(response_tx))
            .await
            .map_err(|_| Error::ChannelClosed)?;
        response_rx.await.map_err(|_| Error::ChannelClosed)
    }
}
