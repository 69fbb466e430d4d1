use crate::{config::ScrollConfig, Result};

/// Scrolls by vertical hand travel while the fist is held.
///
/// The first fist frame only records an anchor. Later frames emit once the
/// travel from the anchor leaves the dead zone, then re-anchor. Leaving the
/// fist unsets the anchor.
#[derive(Debug, Clone)]
pub struct ScrollEngine {
    config: ScrollConfig,
    anchor_y: Option<i32>,
}

impl ScrollEngine {
    pub fn new(config: ScrollConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            anchor_y: None,
        })
    }

    /// Wrist height the next delta is measured from.
    pub fn anchor(&self) -> Option<i32> {
        self.anchor_y
    }

    /// True while a fist scroll is in progress.
    pub fn is_active(&self) -> bool {
        self.anchor_y.is_some()
    }

    /// Feeds one fist frame; returns the signed scroll amount, positive when
    /// the hand moved up.
    pub fn update(&mut self, current_y: i32) -> Option<i32> {
        let Some(anchor) = self.anchor_y else {
            self.anchor_y = Some(current_y);
            return None;
        };

        let delta = i64::from(anchor) - i64::from(current_y);
        if delta.abs() <= i64::from(self.config.dead_zone) {
            return None;
        }

        self.anchor_y = Some(current_y);
        let amount = (delta / i64::from(self.config.pixels_per_unit))
            .clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        tracing::debug!(delta, amount, "scroll");
        Some(amount)
    }

    /// Called on every frame that is not a fist.
    pub fn release(&mut self) {
        self.anchor_y = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ScrollEngine {
        ScrollEngine::new(ScrollConfig::default()).unwrap()
    }

    #[test]
    fn first_fist_frame_only_anchors() {
        let mut scroll = engine();
        assert_eq!(scroll.update(300), None);
        assert_eq!(scroll.anchor(), Some(300));
        assert_eq!(scroll.update(270), Some(3));
        assert_eq!(scroll.anchor(), Some(270));
    }

    #[test]
    fn dead_zone_holds_the_anchor() {
        let mut scroll = engine();
        scroll.update(300);
        assert_eq!(scroll.update(280), None);
        assert_eq!(scroll.update(320), None);
        assert_eq!(scroll.anchor(), Some(300));
    }

    #[test]
    fn moving_down_scrolls_negative_and_truncates() {
        let mut scroll = engine();
        scroll.update(100);
        assert_eq!(scroll.update(139), Some(-3));
        assert_eq!(scroll.anchor(), Some(139));
    }

    #[test]
    fn zero_is_a_real_anchor() {
        let mut scroll = engine();
        scroll.update(0);
        assert!(scroll.is_active());
        assert_eq!(scroll.update(-25), Some(2));
    }

    #[test]
    fn travel_across_the_whole_i32_range_saturates() {
        let mut scroll = engine();
        scroll.update(i32::MAX);
        assert_eq!(scroll.update(i32::MIN), Some((u32::MAX / 10) as i32));
        assert_eq!(scroll.anchor(), Some(i32::MIN));

        let mut scroll = ScrollEngine::new(ScrollConfig {
            pixels_per_unit: 1,
            ..Default::default()
        })
        .unwrap();
        scroll.update(i32::MIN);
        assert_eq!(scroll.update(i32::MAX), Some(i32::MIN));
    }

    #[test]
    fn release_unsets_the_anchor() {
        let mut scroll = engine();
        scroll.update(300);
        scroll.release();
        assert!(!scroll.is_active());
        assert_eq!(scroll.update(200), None);
        assert_eq!(scroll.anchor(), Some(200));
    }
}
