//! Resend cooldown timer. One ticker task per cooldown decrements a watched
//! seconds counter; restarting aborts the previous ticker first so two
//! intervals never run at once.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct ResendCooldown {
    remaining: Arc<watch::Sender<u32>>,
    ticker: Option<JoinHandle<()>>,
}

impl Default for ResendCooldown {
    fn default() -> Self {
        Self::new()
    }
}

impl ResendCooldown {
    /// An idle cooldown at zero.
    #[must_use]
    pub fn new() -> Self {
        let (remaining, _) = watch::channel(0);
        Self {
            remaining: Arc::new(remaining),
            ticker: None,
        }
    }

    /// Restarts the countdown at `seconds`. Must be called inside a tokio
    /// runtime.
    pub fn start(&mut self, seconds: u32) {
        self.stop();
        self.remaining.send_replace(seconds);
        if seconds == 0 {
            return;
        }

        let remaining = Arc::clone(&self.remaining);
        self.ticker = Some(tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + TICK, TICK);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let mut finished = false;
                remaining.send_modify(|seconds| {
                    *seconds = seconds.saturating_sub(1);
                    finished = *seconds == 0;
                });
                if finished {
                    break;
                }
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        *self.remaining.borrow()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.remaining() > 0
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.remaining.subscribe()
    }
}

impl Drop for ResendCooldown {
    fn drop(&mut self) {
        self.stop();
    }
}
