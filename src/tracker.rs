//! 在途数据报跟踪器
//! Outstanding-Set Tracker
//!
//! 职责：
//! - 记录每个已发送的数据报
//! - 按发送时间推断丢包（无显式NACK）
//! - 在ACK到达时移除对应记录

use crate::{
    config::TrackerConfig,
    error::{Error, Result},
};
use std::collections::{HashSet, VecDeque};
use tracing::trace;

/// A datagram that has been sent and not yet resolved.
///
/// 已发送但尚未完结的数据报。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentRecord {
    pub sequence_number: u64,
    /// Sender clock, in milliseconds.
    /// 发送方时钟（毫秒）。
    pub send_time: u64,
}

/// Whether an acknowledgment matched a live record.
///
/// ACK 是否匹配到一个在途记录。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// The record was outstanding and is now delivered.
    /// 记录在途，现已送达。
    Acknowledged,
    /// Duplicate, stale, or already presumed lost.
    /// 重复、过期或已被判定为丢失。
    AlreadyGone,
}

/// Everything one acknowledgment resolved, in send-time order.
///
/// 一次 ACK 所完结的全部记录，按发送时间排序。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Records swept as lost before matching.
    /// 匹配前被判定丢失的记录。
    pub lost: Vec<SentRecord>,
    /// The matched record, if it was still outstanding.
    /// 匹配到的记录（如果仍在途）。
    pub delivered: Option<SentRecord>,
}

impl Resolution {
    pub fn outcome(&self) -> AckOutcome {
        if self.delivered.is_some() {
            AckOutcome::Acknowledged
        } else {
            AckOutcome::AlreadyGone
        }
    }
}

/// The queue of outstanding datagrams, ordered by send time.
///
/// 按发送时间排序的在途数据报队列。
#[derive(Debug)]
pub struct OutstandingTracker {
    queue: VecDeque<SentRecord>,
    /// 在途序列号集合，用于拒绝重复记录
    /// Live sequence numbers, used to reject duplicates
    live: HashSet<u64>,
    reorder_window_ms: u64,
    adapt_to_min_rtt: bool,
    lowest_rtt: Option<i64>,
}

impl OutstandingTracker {
    pub fn new(reorder_window_ms: u64) -> Self {
        Self {
            queue: VecDeque::new(),
            live: HashSet::new(),
            reorder_window_ms,
            adapt_to_min_rtt: false,
            lowest_rtt: None,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self {
            adapt_to_min_rtt: config.adapt_to_min_rtt,
            ..Self::new(config.reorder_window_ms)
        }
    }

    /// Feeds a round-trip sample. With adaptation enabled, a new minimum
    /// shrinks or grows the reorder window to `(rtt + 10) / 2`.
    ///
    /// 输入一个往返时间样本。启用自适应时，新的最小值会把乱序窗口设为 `(rtt + 10) / 2`。
    pub fn observe_rtt(&mut self, rtt_ms: i64) {
        if !self.adapt_to_min_rtt || self.lowest_rtt.is_some_and(|lowest| rtt_ms >= lowest) {
            return;
        }
        self.lowest_rtt = Some(rtt_ms);
        self.reorder_window_ms = (rtt_ms.saturating_add(10) / 2).max(0) as u64;
        trace!(
            rtt = rtt_ms,
            reorder_window = self.reorder_window_ms,
            "Reorder window adapted to new minimum RTT"
        );
    }

    /// Appends a record. Fails if `sequence_number` is already outstanding.
    ///
    /// 追加一条记录。如果序列号已在途则失败。
    pub fn record_sent(&mut self, sequence_number: u64, send_time: u64) -> Result<()> {
        if !self.live.insert(sequence_number) {
            return Err(Error::DuplicateSequence(sequence_number));
        }
        self.queue.push_back(SentRecord {
            sequence_number,
            send_time,
        });
        trace!(seq = sequence_number, send_time, "Recorded outstanding datagram");
        Ok(())
    }

    /// Sweeps presumed-lost records, then removes the acknowledged one. The
    /// sweep stops at the acknowledged record so it is never counted as lost.
    ///
    /// 先清除被判定丢失的记录，再移除被确认的记录。清除在被确认的记录处停止。
    pub fn resolve(&mut self, sequence_number: u64, send_time_acked: u64) -> Resolution {
        let lost = self.sweep(send_time_acked, Some(sequence_number));
        let delivered = self.take(sequence_number);
        Resolution { lost, delivered }
    }

    /// Pops every record sent more than `reorder_window_ms` before
    /// `send_time_acked`. An empty queue yields nothing.
    ///
    /// 弹出所有比 `send_time_acked` 早超过 `reorder_window_ms` 发送的记录。
    pub fn sweep_lost(&mut self, send_time_acked: u64) -> Vec<SentRecord> {
        self.sweep(send_time_acked, None)
    }

    fn sweep(&mut self, send_time_acked: u64, stop_at: Option<u64>) -> Vec<SentRecord> {
        let mut lost = Vec::new();
        while let Some(front) = self.front() {
            if Some(front.sequence_number) == stop_at
                || front.send_time.saturating_add(self.reorder_window_ms) >= send_time_acked
            {
                break;
            }
            if let Some(record) = self.queue.pop_front() {
                self.live.remove(&record.sequence_number);
                trace!(seq = record.sequence_number, "Presumed lost");
                lost.push(record);
            }
        }
        lost
    }

    fn take(&mut self, sequence_number: u64) -> Option<SentRecord> {
        if !self.live.contains(&sequence_number) {
            return None;
        }
        let index = self
            .queue
            .iter()
            .position(|record| record.sequence_number == sequence_number)?;
        let record = self.queue.remove(index)?;
        self.live.remove(&sequence_number);
        Some(record)
    }

    /// The oldest outstanding record, or `None` when the queue is empty.
    /// 最早的在途记录；队列为空时返回 `None`。
    pub fn front(&self) -> Option<&SentRecord> {
        self.queue.front()
    }

    pub fn contains(&self, sequence_number: u64) -> bool {
        self.live.contains(&sequence_number)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn reorder_window_ms(&self) -> u64 {
        self.reorder_window_ms
    }

    pub fn set_reorder_window_ms(&mut self, reorder_window_ms: u64) {
        self.reorder_window_ms = reorder_window_ms;
    }
}
