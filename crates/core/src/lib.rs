//! Core library for the gesture engine.
//!
//! Every module owns one stage of the pipeline that turns per-frame hand
//! landmarks into actions: finger state and gesture naming, temporal
//! smoothing, pointer control, stroke painting and volume mapping. Sessions
//! tie a stage to its configuration and optional host backend, and describe
//! each frame as overlay primitives for whatever renderer the host uses.

pub mod canvas;
pub mod config;
pub mod error;
pub mod fingers;
pub mod gesture;
pub mod landmarks;
pub mod pointer;
pub mod render;
pub mod session;
pub mod smoothing;
pub mod volume;

pub use canvas::{CanvasFrame, CanvasMode, Color, PaletteColor, PixelBuffer, StrokeCanvas};
pub use config::{
    CanvasConfig, ClickConfig, CursorConfig, DetectorConfig, EngineConfig, GestureConfig,
    ScrollConfig, VolumeConfig,
};
pub use error::{BackendError, EngineError, Result};
pub use fingers::FingerState;
pub use gesture::{GestureClassifier, GestureLabel, GestureRecognizer};
pub use landmarks::{HandLandmarks, Landmark, LandmarkPoint, LandmarkSet};
pub use pointer::{MouseButton, PointerBackend, PointerController, PointerEvent, PointerMode};
pub use render::{Overlay, Primitive};
pub use session::{
    DisplaySession, FrameInput, FrameOutput, PaintSession, PointerSession, Report, Session,
    SessionKind, VolumeSession,
};
pub use smoothing::{MeanSmoother, ModeSmoother, TemporalSmoother};
pub use volume::{AudioBackend, ProcessMixer, VolumeMapper};
