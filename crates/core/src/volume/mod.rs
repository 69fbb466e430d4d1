//! Pinch-distance volume control.

mod process;

use std::fmt;

pub use process::{MixerCommand, ProcessMixer};

use crate::{
    config::VolumeConfig, error::BackendError, landmarks::LandmarkSet, smoothing::MeanSmoother,
    Result,
};

const DEFAULT_LEVEL: u8 = 50;

/// Capability that reads and writes the system output level in percent.
pub trait AudioBackend: fmt::Debug {
    fn name(&self) -> &str;
    fn set_level(&mut self, percent: u8) -> std::result::Result<(), BackendError>;
    fn get_level(&mut self) -> std::result::Result<u8, BackendError>;
}

/// Maps the thumb-to-index distance onto a volume percentage.
///
/// Raw levels are averaged over a short window and changes smaller than the
/// configured step are ignored. Without a backend, or once the backend fails,
/// the mapper keeps tracking the level for display but never dispatches it.
#[derive(Debug)]
pub struct VolumeMapper {
    config: VolumeConfig,
    smoother: MeanSmoother,
    current: u8,
    backend: Option<Box<dyn AudioBackend>>,
}

impl VolumeMapper {
    pub fn new(config: VolumeConfig, backend: Option<Box<dyn AudioBackend>>) -> Result<Self> {
        config.validate()?;
        let smoother = MeanSmoother::mean(config.history_length)?;

        let mut current = DEFAULT_LEVEL;
        let backend = match backend {
            Some(mut backend) => match backend.get_level() {
                Ok(level) => {
                    tracing::info!(backend = backend.name(), level, "volume backend attached");
                    current = level.min(100);
                    Some(backend)
                }
                Err(err) => {
                    tracing::warn!(backend = backend.name(), %err, "volume backend unusable, simulating");
                    None
                }
            },
            None => {
                tracing::info!("no volume backend, simulating");
                None
            }
        };

        Ok(Self {
            config,
            smoother,
            current,
            backend,
        })
    }

    /// Distance range and smoothing settings.
    pub fn config(&self) -> &VolumeConfig {
        &self.config
    }

    /// Whether levels are being dispatched to a backend.
    pub fn is_active(&self) -> bool {
        self.backend.is_some()
    }

    /// Name of the active mixer; `None` in simulation mode.
    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_deref().map(|backend| backend.name())
    }

    /// Level currently held, 0 to 100.
    pub fn current(&self) -> u8 {
        self.current
    }

    /// `(filled, capacity)` of the smoothing window.
    pub fn smoothing_fill(&self) -> (usize, usize) {
        (self.smoother.len(), self.smoother.capacity())
    }

    /// Unsmoothed percentage for a pinch distance.
    pub fn percent_for(&self, distance: f32) -> f32 {
        let span = self.config.max_distance - self.config.min_distance;
        ((distance - self.config.min_distance) / span * 100.0).clamp(0.0, 100.0)
    }

    /// Feeds one pinch distance and returns the level now held.
    pub fn update(&mut self, distance: f32) -> u8 {
        let raw = self.percent_for(distance);
        let smoothed = self.smoother.push(raw).unwrap_or(raw) as u8;

        if smoothed.abs_diff(self.current) < self.config.min_change {
            return self.current;
        }
        self.current = smoothed;
        self.dispatch(smoothed);
        self.current
    }

    /// Convenience wrapper measuring the pinch of a landmark set; frames
    /// without a hand leave the level untouched.
    pub fn process(&mut self, landmarks: &LandmarkSet) -> (u8, Option<f32>) {
        match landmarks.hand() {
            Some(hand) => {
                let distance = hand.pinch_distance();
                (self.update(distance), Some(distance))
            }
            None => (self.current, None),
        }
    }

    /// Reads the level back from the backend, falling back to the tracked one.
    pub fn system_level(&mut self) -> u8 {
        let Some(backend) = self.backend.as_mut() else {
            return self.current;
        };
        match backend.get_level() {
            Ok(level) => level,
            Err(err) => {
                tracing::warn!(backend = backend.name(), %err, "could not read volume");
                self.current
            }
        }
    }

    fn dispatch(&mut self, percent: u8) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        if let Err(err) = backend.set_level(percent) {
            tracing::warn!(backend = backend.name(), %err, "volume backend failed, simulating from now on");
            self.backend = None;
        }
    }
}
