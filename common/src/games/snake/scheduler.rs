use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

pub trait TickHandler: Send + Sync + Clone + 'static {
    /// `generation` identifies the timer that fired; see [`TickScheduler::is_current`].
    fn on_tick(&self, generation: u64) -> impl Future<Output = ()> + Send;
}

/// Owns at most one periodic timer task. Arming a new timer always cancels the
/// previous one first, and every stop bumps the generation so a tick that was
/// already in flight can be recognised as stale.
pub struct TickScheduler<H: TickHandler> {
    handler: H,
    handle: Option<JoinHandle<()>>,
    generation: u64,
    interval: Option<Duration>,
}

impl<H: TickHandler> TickScheduler<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            handle: None,
            generation: 0,
            interval: None,
        }
    }

    pub fn start(&mut self, interval: Duration) -> u64 {
        self.stop();

        let period = interval.max(MIN_TICK_INTERVAL);
        let generation = self.generation;
        let handler = self.handler.clone();

        self.handle = Some(tokio::spawn(async move {
            let mut timer = tokio::time::interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                handler.on_tick(generation).await;
            }
        }));
        self.interval = Some(period);
        generation
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.interval = None;
        self.generation += 1;
    }

    /// Re-arms a running timer with a new period. Does nothing when stopped.
    pub fn reschedule(&mut self, interval: Duration) -> Option<u64> {
        if !self.is_running() {
            return None;
        }
        Some(self.start(interval))
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.is_running() && generation == self.generation
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }
}

impl<H: TickHandler> Drop for TickScheduler<H> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingHandler {
        fired: Arc<Mutex<Vec<u64>>>,
    }

    impl RecordingHandler {
        fn count(&self) -> usize {
            self.fired.lock().unwrap().len()
        }

        fn generations(&self) -> Vec<u64> {
            self.fired.lock().unwrap().clone()
        }
    }

    impl TickHandler for RecordingHandler {
        async fn on_tick(&self, generation: u64) {
            self.fired.lock().unwrap().push(generation);
        }
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_at_interval() {
        let handler = RecordingHandler::default();
        let mut scheduler = TickScheduler::new(handler.clone());

        scheduler.start(ms(100));
        tokio::time::sleep(ms(350)).await;

        assert_eq!(handler.count(), 3);
        assert_eq!(scheduler.interval(), Some(ms(100)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_tick_after_stop() {
        let handler = RecordingHandler::default();
        let mut scheduler = TickScheduler::new(handler.clone());

        let generation = scheduler.start(ms(100));
        tokio::time::sleep(ms(250)).await;
        scheduler.stop();
        tokio::time::sleep(ms(1000)).await;

        assert_eq!(handler.count(), 2);
        assert!(!scheduler.is_running());
        assert!(!scheduler.is_current(generation));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_timer() {
        let handler = RecordingHandler::default();
        let mut scheduler = TickScheduler::new(handler.clone());

        let first = scheduler.start(ms(100));
        tokio::time::sleep(ms(150)).await;
        let second = scheduler.reschedule(ms(50)).unwrap();
        tokio::time::sleep(ms(160)).await;

        assert_ne!(first, second);
        assert!(scheduler.is_current(second));
        assert!(!scheduler.is_current(first));
        // One tick from the first timer, three from the second; never both.
        assert_eq!(handler.generations(), vec![first, second, second, second]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_when_stopped_does_nothing() {
        let handler = RecordingHandler::default();
        let mut scheduler = TickScheduler::new(handler.clone());

        assert_eq!(scheduler.reschedule(ms(50)), None);
        tokio::time::sleep(ms(500)).await;
        assert_eq!(handler.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_clamped() {
        let handler = RecordingHandler::default();
        let mut scheduler = TickScheduler::new(handler.clone());

        scheduler.start(Duration::ZERO);
        assert_eq!(scheduler.interval(), Some(MIN_TICK_INTERVAL));
        tokio::time::sleep(ms(5)).await;
        scheduler.stop();
        assert!(handler.count() >= 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timer() {
        let handler = RecordingHandler::default();
        let mut scheduler = TickScheduler::new(handler.clone());
        scheduler.start(ms(10));
        drop(scheduler);
        tokio::time::sleep(ms(100)).await;
        assert_eq!(handler.count(), 0);
    }
}
