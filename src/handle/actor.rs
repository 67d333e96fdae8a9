//! The actor owning a flow's controller.
//!
//! 拥有单个流控制器的 actor。

use super::command::ControllerCommand;
use crate::controller::Controller;
use tokio::sync::mpsc;
use tracing::debug;

/// Owns the controller and applies commands one at a time, so callers on
/// several tasks never touch it concurrently.
///
/// 拥有控制器并逐条执行命令，多个任务上的调用者因此不会并发访问它。
pub(crate) struct ControllerActor {
    pub(crate) controller: Controller,
    pub(crate) command_rx: mpsc::Receiver<ControllerCommand>,
}

impl ControllerActor {
    /// Runs until every handle has been dropped.
    ///
    /// 运行直到所有句柄都被丢弃。
    pub(crate) async fn run(mut self) {
        debug!(policy = self.controller.policy_name(), "Controller actor started");
        while let Some(command) = self.command_rx.recv().await {
            self.handle_command(command);
        }
        debug!(stats = %self.controller.stats(), "Controller actor stopped");
    }

    fn handle_command(&mut self, command: ControllerCommand) {
        // A dropped response receiver only means the caller gave up waiting.
        match command {
            ControllerCommand::Sent {
                sequence_number,
                send_time,
                response_tx,
            } => {
                let _ = response_tx.send(self.controller.on_sent(sequence_number, send_time));
            }
            ControllerCommand::Ack {
                sample,
                response_tx,
            } => {
                let _ = response_tx.send(self.controller.on_ack(sample));
            }
            ControllerCommand::WindowIsOpen { response_tx } => {
                let _ = response_tx.send(self.controller.window_is_open());
            }
            ControllerCommand::WindowSize { response_tx } => {
                let _ = response_tx.send(self.controller.current_window_size());
            }
            ControllerCommand::IdleTimeout { response_tx } => {
                let _ = response_tx.send(self.controller.idle_timeout());
            }
            ControllerCommand::Stats { response_tx } => {
                let _ = response_tx.send(self.controller.stats());
            }
        }
    }
}
