use tokio::task::JoinHandle;

/// Owns the single live countdown for the active turn: the deadline task
/// and the once-per-second tick task. Any transition that changes who is
/// active, or whether the round is active, must go through `cancel` (or
/// `set`, which cancels first) so that at most one pair is ever live.
pub struct TurnScheduler {
    turn_timer: Option<JoinHandle<()>>,
    timer_interval: Option<JoinHandle<()>>,
}

impl TurnScheduler {
    pub fn new() -> TurnScheduler {
        TurnScheduler {
            turn_timer: None,
            timer_interval: None,
        }
    }

    /// Replaces whatever pair is live with a fresh one.
    pub fn set(&mut self, deadline: JoinHandle<()>, ticker: JoinHandle<()>) {
        self.cancel();
        self.turn_timer = Some(deadline);
        self.timer_interval = Some(ticker);
    }

    /// Idempotent; cancelling with nothing armed is a no-op.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.turn_timer.take() {
            handle.abort();
        }
        if let Some(handle) = self.timer_interval.take() {
            handle.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.turn_timer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::sleep;

    fn idle_pair() -> (JoinHandle<()>, JoinHandle<()>) {
        (
            tokio::spawn(async { sleep(Duration::from_secs(3600)).await }),
            tokio::spawn(async { sleep(Duration::from_secs(3600)).await }),
        )
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let mut scheduler = TurnScheduler::new();
        scheduler.cancel();

        let (deadline, ticker) = idle_pair();
        scheduler.set(deadline, ticker);
        assert!(scheduler.is_armed());

        scheduler.cancel();
        scheduler.cancel();
        assert!(!scheduler.is_armed());
    }

    #[tokio::test]
    async fn set_aborts_the_previous_pair() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let deadline = tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            flag.store(true, Ordering::SeqCst);
        });
        let ticker = tokio::spawn(async {});

        let mut scheduler = TurnScheduler::new();
        scheduler.set(deadline, ticker);

        let (deadline, ticker) = idle_pair();
        scheduler.set(deadline, ticker);

        sleep(Duration::from_millis(150)).await;
        assert!(!fired.load(Ordering::SeqCst));
        scheduler.cancel();
    }
}
