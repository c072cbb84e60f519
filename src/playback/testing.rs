//! Test doubles for the media seam.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::media::{MediaBackend, MediaElement, MediaError};

/// What a [`FakeElement`] was asked to do.
#[derive(Debug, Default)]
pub(crate) struct ElementLog {
    pub plays: usize,
    pub pauses: usize,
    pub positions: Vec<f64>,
    pub volumes: Vec<f32>,
}

pub(crate) struct FakeElement {
    reject_play: bool,
    log: Arc<Mutex<ElementLog>>,
}

impl FakeElement {
    pub fn new() -> Self {
        Self {
            reject_play: false,
            log: Arc::default(),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            reject_play: true,
            ..Self::new()
        }
    }

    pub fn log(&self) -> Arc<Mutex<ElementLog>> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl MediaElement for FakeElement {
    async fn play(&mut self) -> Result<(), MediaError> {
        if self.reject_play {
            return Err(MediaError::PlayRejected("autoplay policy".into()));
        }
        self.log.lock().unwrap().plays += 1;
        Ok(())
    }

    fn pause(&mut self) {
        self.log.lock().unwrap().pauses += 1;
    }

    fn set_position(&mut self, seconds: f64) {
        self.log.lock().unwrap().positions.push(seconds);
    }

    fn set_volume(&mut self, volume: f32) {
        self.log.lock().unwrap().volumes.push(volume);
    }
}

/// Opens [`FakeElement`]s, or fails every open when `broken`.
#[derive(Default)]
pub(crate) struct FakeBackend {
    broken: bool,
    reject_play: bool,
    pub opened: Mutex<Vec<String>>,
    pub log: Arc<Mutex<ElementLog>>,
}

impl FakeBackend {
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn rejecting_play() -> Self {
        Self {
            reject_play: true,
            ..Self::default()
        }
    }
}

impl MediaBackend for FakeBackend {
    fn open(&self, locator: &str) -> Result<Box<dyn MediaElement>, MediaError> {
        self.opened.lock().unwrap().push(locator.to_string());
        if self.broken {
            return Err(MediaError::Open("unsupported format".into()));
        }
        Ok(Box::new(FakeElement {
            reject_play: self.reject_play,
            log: Arc::clone(&self.log),
        }))
    }
}
