//! Session view — the selection → generation → playback screen as a state
//! machine a front end can drive.
//!
//! [`SessionView`] is shared by reference (`Arc<SessionView>`): the phase,
//! selection and error live behind a short-lived std `Mutex`, the
//! [`PlaybackController`] behind a tokio `Mutex` because its play call awaits.
//! Neither std lock is held across `.await`.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

use crate::catalog::OptionSet;
use crate::config::{PlaybackConfig, Theme};
use crate::identity::Identity;
use crate::model::{MeditationAsset, MoodSelection};
use crate::pipeline::GenerationPipeline;
use crate::playback::{
    MediaBackend, MediaEvent, PlaybackController, PlaybackEvent, PlaybackState, SharedPlayback,
};

use super::state::{ViewError, ViewState};

/// Render-ready summary of the view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewStatus {
    pub state: ViewState,
    pub label: String,
    pub title: Option<String>,
    /// `"m:ss / m:ss"` while an asset is loaded.
    pub time_label: Option<String>,
    pub progress_percent: Option<f64>,
    pub is_playing: bool,
    pub error: Option<String>,
}

#[derive(Default)]
struct ViewInner {
    state: ViewState,
    selection: MoodSelection,
    asset: Option<MeditationAsset>,
    playback: Option<SharedPlayback>,
    error: Option<String>,
    completed_plays: u32,
}

pub struct SessionView {
    pipeline: Arc<GenerationPipeline>,
    media: Option<Arc<dyn MediaBackend>>,
    playback_config: PlaybackConfig,
    theme: Theme,
    inner: Mutex<ViewInner>,
    player: tokio::sync::Mutex<Option<PlaybackController>>,
    events_tx: mpsc::UnboundedSender<PlaybackEvent>,
    events_rx: Mutex<mpsc::UnboundedReceiver<PlaybackEvent>>,
}

impl SessionView {
    pub fn new(
        pipeline: Arc<GenerationPipeline>,
        media: Option<Arc<dyn MediaBackend>>,
        playback_config: PlaybackConfig,
        theme: Theme,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            pipeline,
            media,
            playback_config,
            theme,
            inner: Mutex::new(ViewInner::default()),
            player: tokio::sync::Mutex::new(None),
            events_tx,
            events_rx: Mutex::new(events_rx),
        }
    }

    fn inner(&self) -> MutexGuard<'_, ViewInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn state(&self) -> ViewState {
        self.inner().state
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn selection(&self) -> MoodSelection {
        self.inner().selection.clone()
    }

    pub fn asset(&self) -> Option<MeditationAsset> {
        self.inner().asset.clone()
    }

    pub fn error_message(&self) -> Option<String> {
        self.inner().error.clone()
    }

    /// Current transport state, if an asset is loaded.
    pub fn playback(&self) -> Option<PlaybackState> {
        self.inner()
            .playback
            .as_ref()
            .map(|shared| crate::playback::state::lock(shared).clone())
    }

    /// `true` when both picks are made and no generation is running.
    pub fn can_generate(&self) -> bool {
        let inner = self.inner();
        inner.state == ViewState::Selecting
            && inner.selection.is_complete()
            && !self.pipeline.is_in_flight()
    }

    pub fn status(&self) -> ViewStatus {
        let inner = self.inner();
        let playback = inner
            .playback
            .as_ref()
            .map(|shared| crate::playback::state::lock(shared).clone());
        ViewStatus {
            state: inner.state,
            label: inner.state.label().to_string(),
            title: inner.asset.as_ref().map(|a| a.title.clone()),
            time_label: playback.as_ref().map(PlaybackState::time_label),
            progress_percent: playback.as_ref().map(PlaybackState::progress_percent),
            is_playing: playback.as_ref().is_some_and(|p| p.is_playing),
            error: inner.error.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Selecting
    // -----------------------------------------------------------------------

    pub fn select_mood(&self, id: &str) -> Result<(), ViewError> {
        self.select(OptionSet::CurrentMood, id, "change the mood")
    }

    pub fn select_outcome(&self, id: &str) -> Result<(), ViewError> {
        self.select(OptionSet::DesiredOutcome, id, "change the goal")
    }

    fn select(&self, set: OptionSet, id: &str, action: &'static str) -> Result<(), ViewError> {
        let mut inner = self.inner();
        if inner.state != ViewState::Selecting {
            return Err(ViewError::WrongState {
                action,
                state: inner.state,
            });
        }
        let option = set.find(id).ok_or_else(|| ViewError::UnknownOption {
            set,
            id: id.to_string(),
        })?;
        match set {
            OptionSet::CurrentMood => inner.selection.current_mood_id = option.id.to_string(),
            OptionSet::DesiredOutcome => inner.selection.desired_outcome_id = option.id.to_string(),
        }
        log::debug!("view: {set} = {}", option.id);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Generating
    // -----------------------------------------------------------------------

    /// Run the pipeline for the current selection.
    ///
    /// On success the view moves to `Playing` with a paused player. On
    /// failure it returns to `Selecting`, keeps the selection and records the
    /// error message.
    pub async fn generate(&self, identity: &Identity) -> Result<(), ViewError> {
        let selection = {
            let mut inner = self.inner();
            if inner.state != ViewState::Selecting {
                return Err(ViewError::WrongState {
                    action: "generate",
                    state: inner.state,
                });
            }
            if !inner.selection.is_complete() {
                return Err(ViewError::SelectionIncomplete);
            }
            inner.state = ViewState::Generating;
            inner.error = None;
            inner.selection.clone()
        };
        log::debug!("view: selecting -> generating");
        let mut reset = GeneratingReset { view: self, armed: true };

        match self.pipeline.generate(&selection, identity).await {
            Ok(asset) => {
                let controller = PlaybackController::new(
                    &asset,
                    self.media.as_deref(),
                    &self.playback_config,
                    self.events_tx.clone(),
                );
                let shared = controller.shared_state();
                *self.player.lock().await = Some(controller);

                let mut inner = self.inner();
                inner.state = ViewState::Playing;
                inner.asset = Some(asset);
                inner.playback = Some(shared);
                reset.armed = false;
                log::debug!("view: generating -> playing");
                Ok(())
            }
            Err(e) => {
                let mut inner = self.inner();
                inner.state = ViewState::Selecting;
                inner.error = Some(e.to_string());
                reset.armed = false;
                log::debug!("view: generating -> selecting ({e})");
                Err(e.into())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Playing
    // -----------------------------------------------------------------------

    /// Drop the asset and player and start over with an empty selection.
    pub async fn create_another(&self) -> Result<(), ViewError> {
        {
            let inner = self.inner();
            if inner.state != ViewState::Playing {
                return Err(ViewError::WrongState {
                    action: "start a new session",
                    state: inner.state,
                });
            }
        }

        if let Some(mut player) = self.player.lock().await.take() {
            player.stop();
        }

        let mut inner = self.inner();
        inner.state = ViewState::Selecting;
        inner.selection.clear();
        inner.asset = None;
        inner.playback = None;
        inner.error = None;
        log::debug!("view: playing -> selecting");
        Ok(())
    }

    /// No-op unless an asset is loaded.
    pub async fn toggle_play_pause(&self) {
        if self.state() != ViewState::Playing {
            return;
        }
        if let Some(player) = self.player.lock().await.as_mut() {
            player.toggle_play_pause().await;
        }
    }

    /// Returns the new position, or `None` when nothing is loaded.
    pub async fn seek_relative(&self, delta: f64) -> Option<f64> {
        if self.state() != ViewState::Playing {
            return None;
        }
        self.player
            .lock()
            .await
            .as_mut()
            .map(|p| p.seek_relative(delta))
    }

    pub async fn skip_back(&self) -> Option<f64> {
        self.seek_relative(-self.playback_config.skip_secs).await
    }

    pub async fn skip_forward(&self) -> Option<f64> {
        self.seek_relative(self.playback_config.skip_secs).await
    }

    pub async fn set_volume(&self, volume: f32) -> Option<f32> {
        if self.state() != ViewState::Playing {
            return None;
        }
        self.player
            .lock()
            .await
            .as_mut()
            .map(|p| p.set_volume(volume))
    }

    /// Forward a real media element notification to the player.
    pub async fn handle_media_event(&self, event: MediaEvent) {
        if let Some(player) = self.player.lock().await.as_mut() {
            player.handle_media_event(event);
        }
    }

    /// Drain clock events. Returns how many plays completed since the last poll.
    pub fn poll_events(&self) -> u32 {
        let mut completed = 0;
        {
            let mut rx = self.events_rx.lock().unwrap_or_else(|e| e.into_inner());
            while let Ok(event) = rx.try_recv() {
                match event {
                    PlaybackEvent::Completed => completed += 1,
                }
            }
        }
        if completed > 0 {
            self.inner().completed_plays += completed;
            log::info!("view: meditation complete");
        }
        completed
    }

    pub fn completed_plays(&self) -> u32 {
        self.inner().completed_plays
    }

    /// Whether `id` is the current pick in `set`.
    pub fn is_selected(&self, set: OptionSet, id: &str) -> bool {
        let inner = self.inner();
        match set {
            OptionSet::CurrentMood => inner.selection.current_mood_id == id,
            OptionSet::DesiredOutcome => inner.selection.desired_outcome_id == id,
        }
    }
}

// ---------------------------------------------------------------------------
// GeneratingReset
// ---------------------------------------------------------------------------

/// Puts the view back to `Selecting` if a `generate` call is dropped before
/// it finishes.
struct GeneratingReset<'a> {
    view: &'a SessionView,
    armed: bool,
}

impl Drop for GeneratingReset<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.view.inner();
        if inner.state == ViewState::Generating {
            inner.state = ViewState::Selecting;
            log::debug!("view: generation abandoned, back to selecting");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
