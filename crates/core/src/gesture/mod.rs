//! Named gesture classification.
//!
//! Rules are evaluated in table order and the first match wins, so the order
//! of [`RULES`] is the precedence. The final fallback counts raised fingers,
//! which makes the classifier total.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    config::GestureConfig,
    fingers::FingerState,
    landmarks::{HandLandmarks, Landmark, LandmarkSet},
    smoothing::ModeSmoother,
    Result,
};

/// Closed set of gesture labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureLabel {
    NoHand,
    PeaceSign,
    ThumbsUp,
    ThumbsDown,
    OkSign,
    RockSign,
    Fist,
    OpenPalm,
    Pointing,
    ThreeFingers,
    FourFingers,
    CallMe,
    FingerGun,
    /// Fallback carrying the number of raised fingers.
    FingersUp(u8),
}

impl GestureLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoHand => "No Hand",
            Self::PeaceSign => "Peace Sign",
            Self::ThumbsUp => "Thumbs Up",
            Self::ThumbsDown => "Thumbs Down",
            Self::OkSign => "OK Sign",
            Self::RockSign => "Rock Sign",
            Self::Fist => "Fist",
            Self::OpenPalm => "Open Palm",
            Self::Pointing => "Pointing",
            Self::ThreeFingers => "Three Fingers",
            Self::FourFingers => "Four Fingers",
            Self::CallMe => "Call Me",
            Self::FingerGun => "Finger Gun",
            Self::FingersUp(_) => "Fingers Up",
        }
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FingersUp(count) => write!(f, "{count} Fingers Up"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Measurements a rule may look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleInput {
    pub fingers: FingerState,
    /// Thumb tip is lower in the image than the thumb IP joint.
    pub thumb_tip_below_joint: bool,
    pub pinch_distance: f32,
    pub ok_sign_threshold: f32,
}

impl RuleInput {
    pub fn from_hand(hand: &HandLandmarks, ok_sign_threshold: f32) -> Self {
        Self {
            fingers: FingerState::from_hand(hand),
            thumb_tip_below_joint: hand.point(Landmark::ThumbTip).y
                > hand.point(Landmark::ThumbIp).y,
            pinch_distance: hand.pinch_distance(),
            ok_sign_threshold,
        }
    }

    fn only(&self, up: [bool; 5]) -> bool {
        self.fingers.as_array() == up
    }
}

/// One entry of the precedence table.
#[derive(Clone, Copy)]
pub struct GestureRule {
    pub label: GestureLabel,
    pub matches: fn(&RuleInput) -> bool,
}

impl fmt::Debug for GestureRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureRule").field("label", &self.label).finish()
    }
}

const fn rule(label: GestureLabel, matches: fn(&RuleInput) -> bool) -> GestureRule {
    GestureRule { label, matches }
}

//                                  thumb  index  middle ring   pinky
pub const RULES: [GestureRule; 12] = [
    rule(GestureLabel::PeaceSign, |i| i.only([false, true, true, false, false])),
    rule(GestureLabel::ThumbsUp, |i| i.only([true, false, false, false, false])),
    rule(GestureLabel::ThumbsDown, |i| {
        i.fingers.is_fist() && i.thumb_tip_below_joint
    }),
    rule(GestureLabel::OkSign, |i| {
        i.fingers.thumb && i.fingers.index && i.pinch_distance < i.ok_sign_threshold
    }),
    rule(GestureLabel::RockSign, |i| {
        i.fingers.index && i.fingers.pinky && !i.fingers.middle && !i.fingers.ring
    }),
    rule(GestureLabel::Fist, |i| i.fingers.is_fist()),
    rule(GestureLabel::OpenPalm, |i| i.fingers.is_open_palm()),
    rule(GestureLabel::Pointing, |i| i.only([false, true, false, false, false])),
    rule(GestureLabel::ThreeFingers, |i| i.only([false, true, true, true, false])),
    rule(GestureLabel::FourFingers, |i| i.only([false, true, true, true, true])),
    rule(GestureLabel::CallMe, |i| i.only([true, false, false, false, true])),
    rule(GestureLabel::FingerGun, |i| i.only([true, true, false, false, false])),
];

/// Runs the rule table over one set of measurements.
pub fn classify_input(input: &RuleInput) -> GestureLabel {
    RULES
        .iter()
        .find(|rule| (rule.matches)(input))
        .map(|rule| rule.label)
        .unwrap_or(GestureLabel::FingersUp(input.fingers.count()))
}

/// Stateless classifier holding the OK-sign distance threshold.
#[derive(Debug, Clone, Copy)]
pub struct GestureClassifier {
    ok_sign_threshold: f32,
}

impl GestureClassifier {
    pub fn new(config: &GestureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ok_sign_threshold: config.ok_sign_threshold,
        })
    }

    pub fn classify(&self, landmarks: &LandmarkSet) -> GestureLabel {
        match landmarks.hand() {
            Some(hand) => classify_input(&RuleInput::from_hand(hand, self.ok_sign_threshold)),
            None => GestureLabel::NoHand,
        }
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self {
            ok_sign_threshold: GestureConfig::default().ok_sign_threshold,
        }
    }
}

/// Classifier followed by a majority vote over the recent labels.
#[derive(Debug)]
pub struct GestureRecognizer {
    classifier: GestureClassifier,
    smoother: ModeSmoother<GestureLabel>,
}

impl GestureRecognizer {
    pub fn new(config: &GestureConfig) -> Result<Self> {
        Ok(Self {
            classifier: GestureClassifier::new(config)?,
            smoother: ModeSmoother::mode(config.history_length)?,
        })
    }

    /// Returns `(raw, smoothed)` labels for the frame.
    pub fn recognize(&mut self, landmarks: &LandmarkSet) -> (GestureLabel, GestureLabel) {
        let raw = self.classifier.classify(landmarks);
        let smoothed = self.smoother.push(raw).unwrap_or(raw);
        (raw, smoothed)
    }
}
