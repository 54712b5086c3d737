use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{watch, Mutex};

use crate::games::SessionRng;
use crate::log;
use super::game_state::{GameSnapshot, SnakeGameState, TickOutcome};
use super::input::{map_key, Command};
use super::scheduler::{TickHandler, TickScheduler};
use super::settings::SnakeSettings;
use super::types::GameStatus;

struct ControllerInner {
    state: SnakeGameState,
    rng: SessionRng,
    scheduler: TickScheduler<ControllerTicker>,
}

#[derive(Clone)]
struct ControllerTicker {
    inner: Weak<Mutex<ControllerInner>>,
    state_tx: Arc<watch::Sender<GameSnapshot>>,
}

impl TickHandler for ControllerTicker {
    async fn on_tick(&self, generation: u64) {
        let Some(shared) = self.inner.upgrade() else {
            return;
        };
        let mut inner = shared.lock().await;
        if inner.on_tick(generation) {
            self.state_tx.send_replace(inner.state.snapshot());
        }
    }
}

fn speed_interval(speed_ms: u32) -> Duration {
    Duration::from_millis(speed_ms as u64)
}

impl ControllerInner {
    fn on_tick(&mut self, generation: u64) -> bool {
        if !self.scheduler.is_current(generation) {
            return false;
        }

        match self.state.tick(&mut self.rng) {
            TickOutcome::Ignored => {
                self.scheduler.stop();
                false
            }
            TickOutcome::Moved => true,
            TickOutcome::Ate { leveled_up, .. } => {
                if leveled_up {
                    self.scheduler
                        .reschedule(speed_interval(self.state.speed_ms()));
                }
                true
            }
            TickOutcome::GameOver(_) => {
                self.scheduler.stop();
                true
            }
        }
    }

    fn dispatch(&mut self, command: Command) -> bool {
        match command {
            Command::Start => {
                if !self.state.start(&mut self.rng) {
                    return false;
                }
                log!("Run {} started", self.state.run());
                self.scheduler.start(speed_interval(self.state.speed_ms()));
                true
            }
            Command::Turn(direction) => self.state.set_direction(direction),
            Command::TogglePause => {
                if !self.state.toggle_pause() {
                    return false;
                }
                match self.state.status() {
                    GameStatus::Paused => self.scheduler.stop(),
                    _ => {
                        self.scheduler.start(speed_interval(self.state.speed_ms()));
                    }
                }
                true
            }
        }
    }
}

/// Owns one game session and drives it from commands and its own tick timer.
/// State changes are published to subscribers as [`GameSnapshot`]s.
pub struct GameController {
    inner: Arc<Mutex<ControllerInner>>,
    state_tx: Arc<watch::Sender<GameSnapshot>>,
}

impl GameController {
    pub fn new(settings: SnakeSettings, mut rng: SessionRng) -> Self {
        let state = SnakeGameState::new(settings, &mut rng);
        Self::from_state(state, rng)
    }

    fn from_state(state: SnakeGameState, rng: SessionRng) -> Self {
        let state_tx = Arc::new(watch::channel(state.snapshot()).0);
        let ticker_tx = state_tx.clone();

        let inner = Arc::new_cyclic(|weak| {
            Mutex::new(ControllerInner {
                state,
                rng,
                scheduler: TickScheduler::new(ControllerTicker {
                    inner: weak.clone(),
                    state_tx: ticker_tx,
                }),
            })
        });

        Self { inner, state_tx }
    }

    pub fn get_state(&self) -> GameSnapshot {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.state_tx.subscribe()
    }

    /// Applies a command. Commands that are not valid in the current state are
    /// ignored and return `false`.
    pub async fn dispatch(&self, command: Command) -> bool {
        let mut inner = self.inner.lock().await;
        let changed = inner.dispatch(command);
        if changed {
            self.state_tx.send_replace(inner.state.snapshot());
        }
        changed
    }

    pub async fn handle_key(&self, key: &str) -> bool {
        match map_key(key) {
            Some(command) => self.dispatch(command).await,
            None => false,
        }
    }

    pub async fn is_ticking(&self) -> bool {
        self.inner.lock().await.scheduler.is_running()
    }

    pub async fn tick_interval(&self) -> Option<Duration> {
        self.inner.lock().await.scheduler.interval()
    }

    pub async fn shutdown(&self) {
        self.inner.lock().await.scheduler.stop();
    }

    #[cfg(test)]
    async fn with_running_state(state: SnakeGameState, rng: SessionRng) -> Self {
        let controller = Self::from_state(state, rng);
        {
            let mut inner = controller.inner.lock().await;
            let interval = speed_interval(inner.state.speed_ms());
            inner.scheduler.start(interval);
        }
        controller
    }
}
