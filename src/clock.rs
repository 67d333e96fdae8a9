//! A millisecond sender clock.
//! 毫秒级发送方时钟。

use tokio::time::Instant;

/// Milliseconds elapsed since the clock was created. Built on tokio's clock,
/// so it follows `tokio::time::pause` in tests.
///
/// 自时钟创建以来经过的毫秒数。基于 tokio 时钟，测试中会遵循 `tokio::time::pause`。
#[derive(Debug, Clone, Copy)]
pub struct SenderClock {
    origin: Instant,
}

impl SenderClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for SenderClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_clock_follows_tokio_time() {
        let clock = SenderClock::new();
        assert_eq!(clock.now_ms(), 0);

        tokio::time::advance(Duration::from_millis(250)).await;
        assert_eq!(clock.now_ms(), 250);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(clock.now_ms(), 2_250);
    }
}
