//! Per-application sessions driving one engine each.
//!
//! A host owns exactly one [`Session`] and feeds it frames in timestamp
//! order. Sessions never block on the host: backends are called inline and
//! degrade to display-only operation on failure.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    canvas::{CanvasFrame, StrokeCanvas},
    config::{DetectorConfig, EngineConfig},
    fingers::FingerState,
    gesture::{GestureLabel, GestureRecognizer},
    landmarks::LandmarkSet,
    pointer::{PointerBackend, PointerController, PointerFrame},
    render::{self, Overlay, VolumeStatus},
    volume::{AudioBackend, VolumeMapper},
    Result,
};

/// One detector frame handed to a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Seconds since the session started.
    pub timestamp: f64,
    pub landmarks: LandmarkSet,
}

impl FrameInput {
    pub fn new(timestamp: f64, landmarks: LandmarkSet) -> Self {
        Self {
            timestamp,
            landmarks,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Gestures,
    Pointer,
    Paint,
    Volume,
}

impl SessionKind {
    /// Built-in detector settings for this kind of session.
    pub fn detector(&self) -> DetectorConfig {
        match self {
            Self::Gestures => DetectorConfig::display(),
            Self::Pointer => DetectorConfig::pointer(),
            Self::Paint => DetectorConfig::paint(),
            Self::Volume => DetectorConfig::volume(),
        }
    }

    /// Detector settings the upstream tracker should be started with: the
    /// configured override if there is one, otherwise the preset.
    pub fn resolve_detector(&self, config: &EngineConfig) -> DetectorConfig {
        config.detector.unwrap_or_else(|| self.detector())
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gestures => "gestures",
            Self::Pointer => "pointer",
            Self::Paint => "paint",
            Self::Volume => "volume",
        })
    }
}

/// Session-specific result of one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "session", rename_all = "snake_case")]
pub enum Report {
    Gestures {
        raw: GestureLabel,
        smoothed: GestureLabel,
        fingers: Option<FingerState>,
    },
    Pointer(PointerFrame),
    Paint(CanvasFrame),
    Volume {
        level: u8,
        distance: Option<f32>,
        active: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameOutput {
    pub timestamp: f64,
    pub report: Report,
    pub overlay: Overlay,
}

/// Live gesture naming with per-finger indicators.
#[derive(Debug)]
pub struct DisplaySession {
    recognizer: GestureRecognizer,
}

impl DisplaySession {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            recognizer: GestureRecognizer::new(&config.gesture)?,
        })
    }

    pub fn process(&mut self, input: &FrameInput) -> FrameOutput {
        let (raw, smoothed) = self.recognizer.recognize(&input.landmarks);
        let fingers = input.landmarks.hand().map(FingerState::from_hand);
        FrameOutput {
            timestamp: input.timestamp,
            report: Report::Gestures {
                raw,
                smoothed,
                fingers,
            },
            overlay: render::gesture_overlay(smoothed, fingers),
        }
    }
}

#[derive(Debug)]
pub struct PointerSession {
    controller: PointerController,
    config: EngineConfig,
}

impl PointerSession {
    pub fn new(config: &EngineConfig, backend: Option<Box<dyn PointerBackend>>) -> Result<Self> {
        Ok(Self {
            controller: PointerController::new(config, backend)?,
            config: config.clone(),
        })
    }

    pub fn controller(&self) -> &PointerController {
        &self.controller
    }

    pub fn process(&mut self, input: &FrameInput) -> FrameOutput {
        let frame = self.controller.process(input.timestamp, &input.landmarks);
        let overlay = render::pointer_overlay(
            &self.config.cursor,
            self.config.click.pinch_threshold,
            &frame,
            input.landmarks.hand(),
        );
        FrameOutput {
            timestamp: input.timestamp,
            report: Report::Pointer(frame),
            overlay,
        }
    }
}

#[derive(Debug)]
pub struct PaintSession {
    canvas: StrokeCanvas,
}

impl PaintSession {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            canvas: StrokeCanvas::new(config.canvas)?,
        })
    }

    pub fn canvas(&self) -> &StrokeCanvas {
        &self.canvas
    }

    /// Host-issued clear command.
    pub fn clear(&mut self) {
        self.canvas.clear();
    }

    pub fn process(&mut self, input: &FrameInput) -> FrameOutput {
        let frame = self.canvas.process(&input.landmarks);
        let overlay = render::canvas_overlay(&self.canvas, &frame);
        FrameOutput {
            timestamp: input.timestamp,
            report: Report::Paint(frame),
            overlay,
        }
    }
}

#[derive(Debug)]
pub struct VolumeSession {
    mapper: VolumeMapper,
}

impl VolumeSession {
    pub fn new(config: &EngineConfig, backend: Option<Box<dyn AudioBackend>>) -> Result<Self> {
        Ok(Self {
            mapper: VolumeMapper::new(config.volume, backend)?,
        })
    }

    pub fn mapper(&self) -> &VolumeMapper {
        &self.mapper
    }

    pub fn process(&mut self, input: &FrameInput) -> FrameOutput {
        let (level, distance) = self.mapper.process(&input.landmarks);
        let config = self.mapper.config();
        let overlay = render::volume_overlay(&VolumeStatus {
            level,
            distance,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            smoothing: self.mapper.smoothing_fill(),
            backend: self.mapper.backend_name(),
        });
        FrameOutput {
            timestamp: input.timestamp,
            report: Report::Volume {
                level,
                distance,
                active: self.mapper.is_active(),
            },
            overlay,
        }
    }
}

#[derive(Debug)]
pub enum Session {
    Display(DisplaySession),
    Pointer(PointerSession),
    Paint(PaintSession),
    Volume(VolumeSession),
}

impl Session {
    pub fn kind(&self) -> SessionKind {
        match self {
            Self::Display(_) => SessionKind::Gestures,
            Self::Pointer(_) => SessionKind::Pointer,
            Self::Paint(_) => SessionKind::Paint,
            Self::Volume(_) => SessionKind::Volume,
        }
    }

    pub fn process(&mut self, input: &FrameInput) -> FrameOutput {
        match self {
            Self::Display(session) => session.process(input),
            Self::Pointer(session) => session.process(input),
            Self::Paint(session) => session.process(input),
            Self::Volume(session) => session.process(input),
        }
    }

    /// Clears the drawing when this is a paint session; other sessions have
    /// no persistent drawing and ignore the command.
    pub fn clear(&mut self) {
        if let Self::Paint(session) = self {
            session.clear();
        }
    }
}
