use crate::{config::CursorConfig, Result};

/// Maps a fingertip in the camera frame to a smoothed screen position.
///
/// The active zone (frame inset by the margin) is stretched over the whole
/// screen and clamped, then scaled by the sensitivity. Scaling happens after
/// the clamp, so positions past the screen edge are possible and are passed
/// through as-is.
#[derive(Debug, Clone)]
pub struct CursorMapper {
    config: CursorConfig,
    prev_x: f32,
    prev_y: f32,
}

impl CursorMapper {
    pub fn new(config: CursorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            prev_x: 0.0,
            prev_y: 0.0,
        })
    }

    /// Frame and screen geometry in use.
    pub fn config(&self) -> &CursorConfig {
        &self.config
    }

    /// Last smoothed position, before truncation.
    pub fn position(&self) -> (f32, f32) {
        (self.prev_x, self.prev_y)
    }

    /// Target position for a fingertip before smoothing.
    pub fn target(&self, x: i32, y: i32) -> (f32, f32) {
        let c = &self.config;
        let margin = c.active_zone_margin as f32;
        let tx = remap(
            x as f32,
            margin,
            (c.frame_width as f32) - margin,
            c.screen_width as f32,
        );
        let ty = remap(
            y as f32,
            margin,
            (c.frame_height as f32) - margin,
            c.screen_height as f32,
        );
        (tx * c.sensitivity_x, ty * c.sensitivity_y)
    }

    /// Moves the smoothed cursor one step toward the fingertip target and
    /// returns integer screen coordinates.
    pub fn update(&mut self, x: i32, y: i32) -> (i32, i32) {
        let (tx, ty) = self.target(x, y);
        let divisor = self.config.smoothing;
        self.prev_x += (tx - self.prev_x) / divisor;
        self.prev_y += (ty - self.prev_y) / divisor;
        (self.prev_x as i32, self.prev_y as i32)
    }
}

/// Linear map of `[lo, hi]` onto `[0, extent]`, clamped to `[0, extent - 1]`.
fn remap(value: f32, lo: f32, hi: f32, extent: f32) -> f32 {
    let t = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
    (t * extent).clamp(0.0, extent - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unscaled(smoothing: f32) -> CursorConfig {
        CursorConfig {
            sensitivity_x: 1.0,
            sensitivity_y: 1.0,
            smoothing,
            ..Default::default()
        }
    }

    #[test]
    fn frame_center_maps_to_screen_center() {
        let mut mapper = CursorMapper::new(unscaled(1.0)).unwrap();
        assert_eq!(mapper.update(320, 240), (960, 540));
    }

    #[test]
    fn clamps_outside_the_active_zone() {
        let mut mapper = CursorMapper::new(unscaled(1.0)).unwrap();
        assert_eq!(mapper.update(10, 10), (0, 0));
        assert_eq!(mapper.update(639, 479), (1919, 1079));
    }

    #[test]
    fn sensitivity_is_applied_after_the_clamp() {
        let config = CursorConfig {
            smoothing: 1.0,
            ..Default::default()
        };
        let mut mapper = CursorMapper::new(config).unwrap();
        // Right edge clamps to 1919, then 2.5x pushes it past the screen.
        let (x, y) = mapper.update(600, 240);
        assert_eq!(x, (1919.0_f32 * 2.5) as i32);
        assert_eq!(y, 1350);
        assert!(x >= config.screen_width as i32);
    }

    #[test]
    fn repeated_target_converges_without_overshoot() {
        let mut mapper = CursorMapper::new(unscaled(7.0)).unwrap();
        let (tx, ty) = mapper.target(400, 300);
        let mut last_gap = f32::INFINITY;
        for _ in 0..60 {
            mapper.update(400, 300);
            let (x, y) = mapper.position();
            assert!(x <= tx && y <= ty);
            let gap = (tx - x).hypot(ty - y);
            assert!(gap < last_gap);
            last_gap = gap;
        }
        assert!(last_gap < 1.0);
    }

    #[test]
    fn state_persists_between_calls() {
        let mut mapper = CursorMapper::new(unscaled(2.0)).unwrap();
        assert_eq!(mapper.update(320, 240), (480, 270));
        assert_eq!(mapper.update(320, 240), (720, 405));
    }

    #[test]
    fn rejects_smoothing_below_one() {
        assert!(CursorMapper::new(unscaled(0.5)).is_err());
    }
}
