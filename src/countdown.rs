use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Period between countdown ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// What a countdown tick asks the controller to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// Show the new remaining value and play the count cue
    Show(u32),
    /// Stop ticking, play the shutter cue and take the photo
    Fire,
}

/// Remaining-seconds counter of the shutter delay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    /// Reset the counter to `value` and return the value to show first
    pub fn start(&mut self, value: u32) -> u32 {
        self.remaining = value;
        value
    }

    /// Advance by one tick
    pub fn tick(&mut self) -> CountdownStep {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining < 1 {
            CountdownStep::Fire
        } else {
            CountdownStep::Show(self.remaining)
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// A countdown was started and has not fired yet
    pub fn is_pending(&self) -> bool {
        self.remaining > 0
    }
}

/// Repeating timer driving a countdown. Dropping or cancelling it stops the ticks.
pub struct CountdownTicker {
    generation: u64,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl CountdownTicker {
    /// Call `on_tick(generation)` every `period`, first after one period.
    /// The ticker stops by itself once `on_tick` returns `false`.
    pub fn spawn<F>(generation: u64, period: Duration, on_tick: F) -> Self
    where
        F: Fn(u64) -> bool + Send + 'static,
    {
        let token = CancellationToken::new();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => {
                        trace!("Countdown ticker {} cancelled", generation);
                        break;
                    }
                    _ = interval.tick() => {
                        if !on_tick(generation) {
                            debug!("Countdown ticker {} has no receiver, stopping", generation);
                            break;
                        }
                    }
                }
            }
        });

        Self {
            generation,
            token,
            handle,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled() && !self.handle.is_finished()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    #[test]
    fn test_countdown_shows_each_value_then_fires() {
        let mut countdown = Countdown::default();
        assert_eq!(countdown.start(3), 3);

        assert_eq!(countdown.tick(), CountdownStep::Show(2));
        assert_eq!(countdown.tick(), CountdownStep::Show(1));
        assert_eq!(countdown.tick(), CountdownStep::Fire);
        assert!(!countdown.is_pending());
    }

    #[test]
    fn test_countdown_fires_after_exactly_n_ticks() {
        for n in 1..=10 {
            let mut countdown = Countdown::default();
            countdown.start(n);

            let mut ticks = 0;
            loop {
                ticks += 1;
                if countdown.tick() == CountdownStep::Fire {
                    break;
                }
            }
            assert_eq!(ticks, n);
        }
    }

    #[test]
    fn test_restart_keeps_latest_value() {
        let mut countdown = Countdown::default();
        countdown.start(10);
        countdown.tick();
        countdown.start(2);

        assert_eq!(countdown.remaining(), 2);
        assert_eq!(countdown.tick(), CountdownStep::Show(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = Instant::now();
        let ticker = CountdownTicker::spawn(7, TICK_PERIOD, move |generation| {
            tx.send(generation).is_ok()
        });

        for _ in 0..3 {
            assert_eq!(rx.recv().await, Some(7));
        }
        assert_eq!(start.elapsed(), Duration::from_secs(3));
        assert!(ticker.is_active());

        ticker.cancel();
        assert!(!ticker.is_active());
        let next = timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(matches!(next, Ok(None) | Err(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_ticker_stops_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ticker = CountdownTicker::spawn(1, TICK_PERIOD, move |generation| {
            tx.send(generation).is_ok()
        });

        assert_eq!(rx.recv().await, Some(1));
        drop(ticker);

        let next = timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(matches!(next, Ok(None) | Err(_)));
    }
}
