//! Async driver that ticks a [`TimerEngine`] on a repeating interval.
//!
//! The driver owns the engine on a single task, so every state change is
//! serialized through its command channel. The repeating tick exists only
//! while the engine is running: pause, reset and completion drop it, and
//! start/resume schedule a fresh one.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use super::countdown::TICK_INTERVAL;
use super::engine::{TimerEngine, TimerState};
use crate::error::TimerError;
use crate::events::Event;

const COMMAND_BUFFER: usize = 16;
const EVENT_BUFFER: usize = 256;

#[derive(Debug)]
pub enum TimerCommand {
    Start,
    Pause,
    Resume,
    Reset,
    Snapshot(oneshot::Sender<Event>),
    Shutdown,
}

/// Cloneable handle for sending commands to a running driver.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    commands: mpsc::Sender<TimerCommand>,
}

impl TimerHandle {
    pub async fn start(&self) -> Result<(), TimerError> {
        self.send(TimerCommand::Start).await
    }

    pub async fn pause(&self) -> Result<(), TimerError> {
        self.send(TimerCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<(), TimerError> {
        self.send(TimerCommand::Resume).await
    }

    pub async fn reset(&self) -> Result<(), TimerError> {
        self.send(TimerCommand::Reset).await
    }

    pub async fn shutdown(&self) -> Result<(), TimerError> {
        self.send(TimerCommand::Shutdown).await
    }

    /// Current [`Event::StateSnapshot`].
    pub async fn snapshot(&self) -> Result<Event, TimerError> {
        let (tx, rx) = oneshot::channel();
        self.send(TimerCommand::Snapshot(tx)).await?;
        rx.await.map_err(|_| TimerError::DriverClosed)
    }

    async fn send(&self, cmd: TimerCommand) -> Result<(), TimerError> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| TimerError::DriverClosed)
    }
}

pub struct TimerDriver {
    engine: TimerEngine,
    commands: mpsc::Receiver<TimerCommand>,
    events: mpsc::Sender<Event>,
    /// Emit a progress event every N ticks (0 disables).
    progress_every: u64,
    ticker: Option<Interval>,
}

impl TimerDriver {
    /// Spawn the driver on the current tokio runtime.
    ///
    /// Returns the command handle, the event stream, and a join handle that
    /// yields the engine back once the driver shuts down (on
    /// [`TimerHandle::shutdown`] or when every handle is dropped).
    pub fn spawn(
        engine: TimerEngine,
        progress_every: u64,
    ) -> (TimerHandle, mpsc::Receiver<Event>, JoinHandle<TimerEngine>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let (ev_tx, ev_rx) = mpsc::channel(EVENT_BUFFER);
        let driver = TimerDriver {
            engine,
            commands: cmd_rx,
            events: ev_tx,
            progress_every,
            ticker: None,
        };
        let join = tokio::spawn(driver.run());
        (TimerHandle { commands: cmd_tx }, ev_rx, join)
    }

    async fn run(mut self) -> TimerEngine {
        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    None | Some(TimerCommand::Shutdown) => break,
                    Some(cmd) => self.handle(cmd).await,
                },
                _ = next_tick(&mut self.ticker) => self.on_tick().await,
            }
        }
        tracing::debug!("timer driver stopped");
        self.engine
    }

    async fn handle(&mut self, cmd: TimerCommand) {
        let event = match cmd {
            TimerCommand::Start => self.engine.start(),
            TimerCommand::Pause => self.engine.pause(),
            TimerCommand::Resume => self.engine.resume(),
            TimerCommand::Reset => self.engine.reset(),
            TimerCommand::Snapshot(reply) => {
                let _ = reply.send(self.engine.snapshot());
                None
            }
            TimerCommand::Shutdown => None,
        };
        self.sync_ticker();
        if let Some(event) = event {
            self.emit(event).await;
        }
    }

    async fn on_tick(&mut self) {
        let completed = self.engine.tick();
        if let Some(event) = completed {
            self.sync_ticker();
            self.emit(event).await;
            return;
        }
        let ticks = self.engine.elapsed_ticks();
        if self.progress_every > 0 && ticks > 0 && ticks % self.progress_every == 0 {
            let remaining = self.engine.remaining();
            self.emit(Event::TimerProgress {
                remaining: remaining.to_string(),
                remaining_ms: remaining.as_millis(),
                progress: self.engine.progress(),
            })
            .await;
        }
    }

    /// Keep the repeating tick alive exactly while the engine runs.
    fn sync_ticker(&mut self) {
        match (self.engine.state(), self.ticker.is_some()) {
            (TimerState::Running, false) => {
                let mut ticker = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
                self.ticker = Some(ticker);
            }
            (TimerState::Running, true) => {}
            (_, true) => self.ticker = None,
            (_, false) => {}
        }
    }

    async fn emit(&self, event: Event) {
        if self.events.send(event).await.is_err() {
            tracing::debug!("timer event dropped: no listener");
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::timer::Countdown;

    fn remaining_ms(event: &Event) -> u64 {
        match event {
            Event::StateSnapshot { remaining_ms, .. } => *remaining_ms,
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn runs_to_completion() {
        let engine = TimerEngine::new(Countdown::new(0, 2).unwrap());
        let (handle, mut events, join) = TimerDriver::spawn(engine, 100);
        handle.start().await.unwrap();

        let mut seen = Vec::new();
        while let Some(ev) = events.recv().await {
            let done = matches!(ev, Event::TimerCompleted { .. });
            seen.push(ev);
            if done {
                break;
            }
        }
        assert!(matches!(seen.first(), Some(Event::TimerStarted { duration_secs: 2, .. })));
        let progress = seen
            .iter()
            .filter(|e| matches!(e, Event::TimerProgress { .. }))
            .count();
        assert_eq!(progress, 1);

        handle.shutdown().await.unwrap();
        let engine = join.await.unwrap();
        assert_eq!(engine.state(), TimerState::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_countdown() {
        let engine = TimerEngine::new(Countdown::new(0, 10).unwrap());
        let (handle, _events, _join) = TimerDriver::spawn(engine, 0);
        handle.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(1_005)).await;
        handle.pause().await.unwrap();

        let at_pause = remaining_ms(&handle.snapshot().await.unwrap());
        assert!((8_900..=9_100).contains(&at_pause), "remaining {at_pause}");

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(remaining_ms(&handle.snapshot().await.unwrap()), at_pause);

        handle.resume().await.unwrap();
        tokio::time::sleep(Duration::from_millis(505)).await;
        let after = remaining_ms(&handle.snapshot().await.unwrap());
        assert!(after < at_pause);
        assert!(at_pause - after <= 600, "jumped {}", at_pause - after);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handles_stops_driver() {
        let engine = TimerEngine::new(Countdown::new(0, 10).unwrap());
        let (handle, _events, join) = TimerDriver::spawn(engine, 0);
        handle.start().await.unwrap();
        drop(handle);
        let engine = join.await.unwrap();
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn commands_fail_after_shutdown() {
        let engine = TimerEngine::new(Countdown::new(0, 10).unwrap());
        let (handle, _events, join) = TimerDriver::spawn(engine, 0);
        handle.shutdown().await.unwrap();
        join.await.unwrap();
        assert_eq!(handle.start().await, Err(TimerError::DriverClosed));
    }
}
