//! Media clock — tracks elapsed position for one playback session.
//!
//! The clock runs in exactly one [`ClockMode`], chosen when the asset is
//! created and never changed afterwards:
//!
//! | Mode        | Position source                 | Completion            |
//! |-------------|---------------------------------|-----------------------|
//! | `RealMedia` | element's `TimeUpdate` events   | element's `Ended`     |
//! | `Simulated` | +1 s per timer tick             | position reaches total|
//!
//! Either way completion pauses, rewinds to 0 and sends one
//! [`PlaybackEvent::Completed`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::media::{MediaElement, MediaError, MediaEvent};
use super::state::{lock, SharedPlayback};

/// Events the clock emits to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Playback reached the end and rewound to 0.
    Completed,
}

// ---------------------------------------------------------------------------
// SimulatedTimer
// ---------------------------------------------------------------------------

/// One-second ticker used when there is no real audio to follow.
pub struct SimulatedTimer {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl SimulatedTimer {
    pub fn new(period: Duration) -> Self {
        Self { period, task: None }
    }

    /// `true` while the tick task is alive.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Outcome of one simulated tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Advanced,
    Completed,
    /// The clock was paused between ticks; the timer should exit.
    Idle,
}

/// Advance a simulated clock by one second.
pub fn simulated_tick(state: &SharedPlayback) -> Tick {
    let mut st = lock(state);
    if !st.is_playing {
        return Tick::Idle;
    }
    st.position_seconds += 1.0;
    if st.position_seconds >= st.total_seconds {
        st.is_playing = false;
        st.position_seconds = 0.0;
        Tick::Completed
    } else {
        Tick::Advanced
    }
}

// ---------------------------------------------------------------------------
// ClockMode / MediaClock
// ---------------------------------------------------------------------------

pub enum ClockMode {
    RealMedia(Box<dyn MediaElement>),
    Simulated(SimulatedTimer),
}

pub struct MediaClock {
    mode: ClockMode,
    state: SharedPlayback,
    events: mpsc::UnboundedSender<PlaybackEvent>,
}

impl MediaClock {
    pub fn new(
        mode: ClockMode,
        state: SharedPlayback,
        events: mpsc::UnboundedSender<PlaybackEvent>,
    ) -> Self {
        Self {
            mode,
            state,
            events,
        }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self.mode, ClockMode::Simulated(_))
    }

    /// `true` while the simulated tick task is alive. Always `false` for real media.
    pub fn timer_running(&self) -> bool {
        match &self.mode {
            ClockMode::Simulated(timer) => timer.is_running(),
            ClockMode::RealMedia(_) => false,
        }
    }

    pub fn current_position(&self) -> f64 {
        lock(&self.state).position_seconds
    }

    /// Start or resume playback.
    ///
    /// In real-media mode the element may reject; the state then stays paused
    /// and the error is returned for the caller to log.
    pub async fn start(&mut self) -> Result<(), MediaError> {
        match &mut self.mode {
            ClockMode::RealMedia(element) => {
                element.play().await?;
                lock(&self.state).is_playing = true;
                Ok(())
            }
            ClockMode::Simulated(timer) => {
                let was_playing = std::mem::replace(&mut lock(&self.state).is_playing, true);
                // A ticker from a finished run may still be winding down.
                if !was_playing || !timer.is_running() {
                    timer.cancel();
                    timer.task = Some(spawn_ticker(
                        timer.period,
                        Arc::clone(&self.state),
                        self.events.clone(),
                    ));
                }
                Ok(())
            }
        }
    }

    pub fn pause(&mut self) {
        match &mut self.mode {
            ClockMode::RealMedia(element) => element.pause(),
            ClockMode::Simulated(timer) => timer.cancel(),
        }
        lock(&self.state).is_playing = false;
    }

    /// Jump to `seconds`, clamped to `[0, total]`. Returns the applied position.
    pub fn seek(&mut self, seconds: f64) -> f64 {
        let target = {
            let mut st = lock(&self.state);
            let target = st.clamp_position(seconds);
            st.position_seconds = target;
            target
        };
        if let ClockMode::RealMedia(element) = &mut self.mode {
            element.set_position(target);
        }
        target
    }

    pub fn set_volume(&mut self, volume: f32) {
        if let ClockMode::RealMedia(element) = &mut self.mode {
            element.set_volume(volume);
        }
    }

    /// Apply a notification from the real media element.
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        if self.is_simulated() {
            log::debug!("clock: ignoring {event:?} in simulated mode");
            return;
        }

        let completed = {
            let mut st = lock(&self.state);
            match event {
                MediaEvent::MetadataLoaded { duration_seconds } => {
                    if duration_seconds.is_finite() && duration_seconds > 0.0 {
                        st.total_seconds = duration_seconds;
                    }
                    false
                }
                MediaEvent::TimeUpdate { position_seconds } => {
                    if position_seconds.is_finite() {
                        st.position_seconds = position_seconds.max(0.0);
                    }
                    false
                }
                MediaEvent::Playing => {
                    st.is_playing = true;
                    false
                }
                MediaEvent::Paused => {
                    st.is_playing = false;
                    false
                }
                MediaEvent::Ended => {
                    st.is_playing = false;
                    st.position_seconds = 0.0;
                    true
                }
            }
        };

        if completed {
            let _ = self.events.send(PlaybackEvent::Completed);
        }
    }

    /// Tear down: cancel the timer or pause the element.
    pub fn stop(&mut self) {
        self.pause();
    }
}

impl Drop for MediaClock {
    fn drop(&mut self) {
        if let ClockMode::Simulated(timer) = &mut self.mode {
            timer.cancel();
        }
    }
}

fn spawn_ticker(
    period: Duration,
    state: SharedPlayback,
    events: mpsc::UnboundedSender<PlaybackEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match simulated_tick(&state) {
                Tick::Advanced => {}
                Tick::Completed => {
                    log::debug!("clock: simulated playback complete");
                    let _ = events.send(PlaybackEvent::Completed);
                    break;
                }
                Tick::Idle => break,
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::state::{new_shared_playback, PlaybackState};
    use crate::playback::testing::FakeElement;

    fn shared(total: f64) -> SharedPlayback {
        new_shared_playback(PlaybackState::new(total, 0.8))
    }

    fn simulated(total: f64) -> (MediaClock, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let clock = MediaClock::new(
            ClockMode::Simulated(SimulatedTimer::new(Duration::from_secs(1))),
            shared(total),
            tx,
        );
        (clock, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<PlaybackEvent>) -> usize {
        let mut n = 0;
        while rx.try_recv().is_ok() {
            n += 1;
        }
        n
    }

    #[test]
    fn ten_ticks_complete_a_ten_second_session() {
        let state = shared(10.0);
        lock(&state).is_playing = true;

        let outcomes: Vec<Tick> = (0..10).map(|_| simulated_tick(&state)).collect();

        assert!(outcomes[..9].iter().all(|t| *t == Tick::Advanced));
        assert_eq!(outcomes[9], Tick::Completed);
        let st = lock(&state);
        assert!(!st.is_playing);
        assert_eq!(st.position_seconds, 0.0);
    }

    #[test]
    fn tick_while_paused_is_idle() {
        let state = shared(10.0);
        assert_eq!(simulated_tick(&state), Tick::Idle);
        assert_eq!(lock(&state).position_seconds, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_timer_completes_once_and_stops() {
        let (mut clock, mut rx) = simulated(10.0);
        clock.start().await.unwrap();

        tokio::time::sleep(Duration::from_millis(9_500)).await;
        assert_eq!(clock.current_position(), 9.0);
        assert_eq!(drain(&mut rx), 0);

        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(clock.current_position(), 0.0);
        assert!(!lock(&clock.state).is_playing);
        assert_eq!(drain(&mut rx), 1);

        // Nothing keeps ticking after completion.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(!clock.timer_running());
        assert_eq!(clock.current_position(), 0.0);
        assert_eq!(drain(&mut rx), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_cancels_the_timer() {
        let (mut clock, _rx) = simulated(60.0);
        clock.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(3_500)).await;

        clock.pause();
        tokio::task::yield_now().await;
        assert!(!clock.timer_running());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(clock.current_position(), 3.0);
    }

    #[tokio::test(start_paused = true)]
    async fn resume_continues_from_position() {
        let (mut clock, _rx) = simulated(60.0);
        clock.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        clock.pause();

        clock.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(clock.current_position(), 4.0);
    }

    #[tokio::test(start_paused = true)]
    async fn starting_twice_does_not_double_speed() {
        let (mut clock, _rx) = simulated(60.0);
        clock.start().await.unwrap();
        clock.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(clock.current_position(), 5.0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_a_ticker_that_is_winding_down() {
        let (mut clock, _rx) = simulated(60.0);
        // Stands in for a ticker that reported completion but has not exited.
        if let ClockMode::Simulated(timer) = &mut clock.mode {
            timer.task = Some(tokio::spawn(std::future::pending::<()>()));
        }
        assert!(clock.timer_running());

        clock.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(3_500)).await;

        assert!(lock(&clock.state).is_playing);
        assert_eq!(clock.current_position(), 3.0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_completion_keeps_ticking() {
        let (mut clock, mut rx) = simulated(3.0);
        clock.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(drain(&mut rx), 1);

        clock.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(clock.current_position(), 2.0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_clock_stops_ticking() {
        let (mut clock, _rx) = simulated(60.0);
        let state = Arc::clone(&clock.state);
        clock.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(2_500)).await;

        drop(clock);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(lock(&state).position_seconds, 2.0);
    }

    #[test]
    fn simulated_seek_is_clamped() {
        let (mut clock, _rx) = simulated(100.0);
        assert_eq!(clock.seek(-15.0), 0.0);
        assert_eq!(clock.seek(250.0), 100.0);
        assert_eq!(clock.seek(42.0), 42.0);
        assert_eq!(clock.current_position(), 42.0);
    }

    #[tokio::test]
    async fn real_media_follows_element_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let element = FakeElement::new();
        let log = element.log();
        let mut clock = MediaClock::new(ClockMode::RealMedia(Box::new(element)), shared(900.0), tx);

        clock.start().await.unwrap();
        assert!(lock(&clock.state).is_playing);
        assert_eq!(log.lock().unwrap().plays, 1);

        clock.handle_media_event(MediaEvent::MetadataLoaded {
            duration_seconds: 872.4,
        });
        clock.handle_media_event(MediaEvent::TimeUpdate {
            position_seconds: 12.25,
        });
        {
            let st = lock(&clock.state);
            assert_eq!(st.total_seconds, 872.4);
            assert_eq!(st.position_seconds, 12.25);
        }

        clock.handle_media_event(MediaEvent::Ended);
        let st = lock(&clock.state).clone();
        assert!(!st.is_playing);
        assert_eq!(st.position_seconds, 0.0);
        assert_eq!(drain(&mut rx), 1);
    }

    #[tokio::test]
    async fn rejected_play_leaves_state_paused() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut clock = MediaClock::new(
            ClockMode::RealMedia(Box::new(FakeElement::rejecting())),
            shared(900.0),
            tx,
        );

        let err = clock.start().await.unwrap_err();
        assert!(matches!(err, MediaError::PlayRejected(_)));
        assert!(!lock(&clock.state).is_playing);
    }

    #[test]
    fn real_media_seek_moves_the_element() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let element = FakeElement::new();
        let log = element.log();
        let mut clock = MediaClock::new(ClockMode::RealMedia(Box::new(element)), shared(100.0), tx);

        assert_eq!(clock.seek(130.0), 100.0);
        assert_eq!(log.lock().unwrap().positions, vec![100.0]);
    }

    #[test]
    fn media_events_are_ignored_when_simulated() {
        let (mut clock, mut rx) = simulated(100.0);
        clock.handle_media_event(MediaEvent::Ended);
        clock.handle_media_event(MediaEvent::MetadataLoaded {
            duration_seconds: 5.0,
        });
        assert_eq!(drain(&mut rx), 0);
        assert_eq!(lock(&clock.state).total_seconds, 100.0);
    }
}
