use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{EngineError, Result};

/// Top-level configuration structure for the engine. Every section falls back
/// to its defaults so partial files are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Detector override; each session uses its own preset when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detector: Option<DetectorConfig>,
    pub gesture: GestureConfig,
    pub cursor: CursorConfig,
    pub click: ClickConfig,
    pub scroll: ScrollConfig,
    pub canvas: CanvasConfig,
    pub volume: VolumeConfig,
}

impl EngineConfig {
    /// Reads a JSON configuration file and validates it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(detector) = &self.detector {
            detector.validate()?;
        }
        self.gesture.validate()?;
        self.cursor.validate()?;
        self.click.validate()?;
        self.scroll.validate()?;
        self.canvas.validate()?;
        self.volume.validate()
    }
}

/// Settings forwarded untouched to the upstream hand-landmark detector. They
/// only change how often a frame arrives without a hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub max_hands: u8,
    pub detection_confidence: f32,
    pub tracking_confidence: f32,
}

impl DetectorConfig {
    pub fn display() -> Self {
        Self::default()
    }

    pub fn pointer() -> Self {
        Self {
            max_hands: 1,
            detection_confidence: 0.8,
            ..Self::default()
        }
    }

    pub fn paint() -> Self {
        Self {
            max_hands: 1,
            ..Self::default()
        }
    }

    pub fn volume() -> Self {
        Self {
            max_hands: 1,
            detection_confidence: 0.75,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if !(1..=2).contains(&self.max_hands) {
            return Err(EngineError::config(format!(
                "detector max_hands must be 1 or 2, got {}",
                self.max_hands
            )));
        }
        for (name, value) in [
            ("detection_confidence", self.detection_confidence),
            ("tracking_confidence", self.tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::config(format!(
                    "detector {name} must lie in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_hands: 2,
            detection_confidence: 0.7,
            tracking_confidence: 0.5,
        }
    }
}

/// Gesture classification and label smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Thumb-to-index distance (px) under which thumb+index reads as "OK Sign".
    pub ok_sign_threshold: f32,
    pub history_length: usize,
}

impl GestureConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.history_length == 0 {
            return Err(EngineError::config("gesture history_length must be positive"));
        }
        if !(self.ok_sign_threshold > 0.0) {
            return Err(EngineError::config("ok_sign_threshold must be positive"));
        }
        Ok(())
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            ok_sign_threshold: 40.0,
            history_length: 5,
        }
    }
}

/// Mapping from the camera frame to screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    pub frame_width: u32,
    pub frame_height: u32,
    pub screen_width: u32,
    pub screen_height: u32,
    /// Inset (px) of the active zone from every frame edge.
    pub active_zone_margin: u32,
    pub sensitivity_x: f32,
    pub sensitivity_y: f32,
    /// Divisor of the exponential smoothing step; 1 disables smoothing.
    pub smoothing: f32,
}

impl CursorConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(EngineError::config("frame dimensions must be positive"));
        }
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(EngineError::config("screen dimensions must be positive"));
        }
        let margin = self.active_zone_margin.saturating_mul(2);
        if margin >= self.frame_width || margin >= self.frame_height {
            return Err(EngineError::config(format!(
                "active zone margin {} leaves no active zone in a {}x{} frame",
                self.active_zone_margin, self.frame_width, self.frame_height
            )));
        }
        if !(self.smoothing >= 1.0) {
            return Err(EngineError::config("cursor smoothing must be at least 1"));
        }
        if !self.sensitivity_x.is_finite() || !self.sensitivity_y.is_finite() {
            return Err(EngineError::config("cursor sensitivity must be finite"));
        }
        Ok(())
    }
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            frame_width: 640,
            frame_height: 480,
            screen_width: 1920,
            screen_height: 1080,
            active_zone_margin: 100,
            sensitivity_x: 2.5,
            sensitivity_y: 2.5,
            smoothing: 7.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickConfig {
    pub cooldown_secs: f64,
    /// Thumb-to-index distance (px) that counts as a pinch.
    pub pinch_threshold: f32,
}

impl ClickConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.cooldown_secs >= 0.0) {
            return Err(EngineError::config("click cooldown must not be negative"));
        }
        if !(self.pinch_threshold > 0.0) {
            return Err(EngineError::config("pinch threshold must be positive"));
        }
        Ok(())
    }
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 0.3,
            pinch_threshold: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Vertical travel (px) that must be exceeded before a scroll is emitted.
    pub dead_zone: i32,
    /// Pixels of travel per scroll unit.
    pub pixels_per_unit: i32,
}

impl ScrollConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.dead_zone < 0 {
            return Err(EngineError::config("scroll dead zone must not be negative"));
        }
        if self.pixels_per_unit <= 0 {
            return Err(EngineError::config("scroll pixels_per_unit must be positive"));
        }
        Ok(())
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            dead_zone: 20,
            pixels_per_unit: 10,
        }
    }
}

/// Drawing surface and palette layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Height (px) of the top strip reserved for the palette; no stroke is
    /// drawn at or above it.
    pub palette_strip_height: i32,
    pub brush_thickness: u32,
    pub eraser_thickness: u32,
    pub box_width: i32,
    pub box_height: i32,
    pub box_left: i32,
    pub box_top: i32,
    pub box_spacing: i32,
    /// Buffer luminance at or below which the camera frame shows through.
    pub transparency_threshold: u8,
}

impl CanvasConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::config("canvas dimensions must be positive"));
        }
        if self.brush_thickness == 0 || self.eraser_thickness == 0 {
            return Err(EngineError::config("stroke thickness must be positive"));
        }
        if self.box_width <= 0 || self.box_height <= 0 {
            return Err(EngineError::config("palette boxes must have a positive size"));
        }
        if self.box_spacing < self.box_width {
            return Err(EngineError::config("palette boxes must not overlap"));
        }
        if self.box_top < 0 || self.box_top + self.box_height > self.palette_strip_height {
            return Err(EngineError::config(
                "palette boxes must fit inside the reserved palette strip",
            ));
        }
        Ok(())
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            palette_strip_height: 100,
            brush_thickness: 10,
            eraser_thickness: 50,
            box_width: 100,
            box_height: 60,
            box_left: 50,
            box_top: 20,
            box_spacing: 120,
            transparency_threshold: 50,
        }
    }
}

/// Pinch-to-volume mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    pub min_distance: f32,
    pub max_distance: f32,
    pub history_length: usize,
    /// Smallest change (percentage points) that is applied.
    pub min_change: u8,
}

impl VolumeConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.max_distance > self.min_distance) {
            return Err(EngineError::config(format!(
                "volume max_distance ({}) must exceed min_distance ({})",
                self.max_distance, self.min_distance
            )));
        }
        if self.history_length == 0 {
            return Err(EngineError::config("volume history_length must be positive"));
        }
        Ok(())
    }
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            min_distance: 20.0,
            max_distance: 280.0,
            history_length: 8,
            min_change: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_volume_range() {
        let config = VolumeConfig {
            min_distance: 280.0,
            max_distance: 20.0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn rejects_zero_capacity_windows() {
        let gesture = GestureConfig {
            history_length: 0,
            ..Default::default()
        };
        assert!(gesture.validate().is_err());

        let volume = VolumeConfig {
            history_length: 0,
            ..Default::default()
        };
        assert!(volume.validate().is_err());
    }

    #[test]
    fn rejects_margin_that_swallows_the_frame() {
        let cursor = CursorConfig {
            active_zone_margin: 240,
            ..Default::default()
        };
        assert!(cursor.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "cursor": { "screen_width": 2560 } }"#).unwrap();
        assert_eq!(config.cursor.screen_width, 2560);
        assert_eq!(config.cursor.screen_height, 1080);
        assert_eq!(config.volume, VolumeConfig::default());
    }

    #[test]
    fn detector_section_is_optional() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.detector, None);

        let config: EngineConfig =
            serde_json::from_str(r#"{ "detector": { "max_hands": 1 } }"#).unwrap();
        let detector = config.detector.unwrap();
        assert_eq!(detector.max_hands, 1);
        assert_eq!(detector.tracking_confidence, 0.5);
    }

    #[test]
    fn rejects_out_of_range_detector_override() {
        let config = EngineConfig {
            detector: Some(DetectorConfig {
                max_hands: 3,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn session_detector_presets_follow_each_tool() {
        assert_eq!(DetectorConfig::display().max_hands, 2);
        assert_eq!(DetectorConfig::pointer().detection_confidence, 0.8);
        assert_eq!(DetectorConfig::volume().detection_confidence, 0.75);
        assert_eq!(DetectorConfig::paint().max_hands, 1);
    }
}
