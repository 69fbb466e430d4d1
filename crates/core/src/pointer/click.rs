use crate::{config::ClickConfig, Result};

/// Turns a held pinch into discrete clicks separated by at least the cooldown.
///
/// Time is supplied by the caller in seconds. A pinch seen while the cooldown
/// is running is dropped, not queued.
#[derive(Debug, Clone)]
pub struct ClickDebouncer {
    config: ClickConfig,
    last_click_time: Option<f64>,
}

impl ClickDebouncer {
    pub fn new(config: ClickConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            last_click_time: None,
        })
    }

    pub fn config(&self) -> &ClickConfig {
        &self.config
    }

    /// Time of the last fired click; `None` until the first one.
    pub fn last_click_time(&self) -> Option<f64> {
        self.last_click_time
    }

    /// Whether the cooldown has elapsed at `now`.
    pub fn ready(&self, now: f64) -> bool {
        self.last_click_time
            .map_or(true, |last| now - last >= self.config.cooldown_secs)
    }

    /// Pinch closed, ignoring the cooldown.
    pub fn is_pinched(&self, pinch_distance: f32) -> bool {
        pinch_distance < self.config.pinch_threshold
    }

    /// Fires a click if the cooldown has elapsed and the pinch is closed.
    pub fn update(&mut self, now: f64, pinch_distance: f32) -> bool {
        if !self.ready(now) || !self.is_pinched(pinch_distance) {
            return false;
        }
        self.last_click_time = Some(now);
        true
    }

    /// Consumes the cooldown for a click triggered by another pose.
    pub fn fire(&mut self, now: f64) -> bool {
        if !self.ready(now) {
            return false;
        }
        self.last_click_time = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debouncer() -> ClickDebouncer {
        ClickDebouncer::new(ClickConfig::default()).unwrap()
    }

    #[test]
    fn cooldown_suppresses_rapid_pinches() {
        let mut clicks = debouncer();
        assert!(clicks.update(0.0, 10.0));
        assert!(!clicks.update(0.2, 10.0));
        assert!(clicks.update(0.35, 10.0));
        assert_eq!(clicks.last_click_time(), Some(0.35));
    }

    #[test]
    fn open_hand_never_clicks() {
        let mut clicks = debouncer();
        assert!(!clicks.update(5.0, 40.0));
        assert!(!clicks.update(6.0, 120.0));
        assert_eq!(clicks.last_click_time(), None);
    }

    #[test]
    fn missed_frames_are_not_queued() {
        let mut clicks = debouncer();
        assert!(clicks.update(1.0, 5.0));
        // Pinch released before the cooldown ends: nothing fires later.
        assert!(!clicks.update(1.1, 5.0));
        assert!(!clicks.update(1.4, 80.0));
        assert!(clicks.update(1.5, 5.0));
    }

    #[test]
    fn fire_shares_the_cooldown() {
        let mut clicks = debouncer();
        assert!(clicks.fire(2.0));
        assert!(!clicks.update(2.1, 5.0));
        assert!(!clicks.fire(2.2));
        assert!(clicks.update(2.35, 5.0));
    }

    #[test]
    fn rejects_negative_cooldown() {
        let config = ClickConfig {
            cooldown_secs: -0.1,
            ..Default::default()
        };
        assert!(ClickDebouncer::new(config).is_err());
    }
}
