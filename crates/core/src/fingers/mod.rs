use serde::{Deserialize, Serialize};

use crate::landmarks::{HandLandmarks, Landmark, LandmarkSet};

/// Raised/curled flags for the five fingers of one hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FingerState {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerState {
    pub const NAMES: [&'static str; 5] = ["Thumb", "Index", "Middle", "Ring", "Pinky"];

    pub fn new(thumb: bool, index: bool, middle: bool, ring: bool, pinky: bool) -> Self {
        Self {
            thumb,
            index,
            middle,
            ring,
            pinky,
        }
    }

    /// Derives the flags for a landmark set; `None` means "no hand".
    pub fn from_landmarks(landmarks: &LandmarkSet) -> Option<Self> {
        landmarks.hand().map(Self::from_hand)
    }

    /// The thumb is compared horizontally (tip left of the IP joint reads as
    /// raised), which holds for one hand in a mirrored frame only. The other
    /// fingers are raised when the tip sits above the PIP joint.
    pub fn from_hand(hand: &HandLandmarks) -> Self {
        let above = |tip: Landmark, pip: Landmark| hand.point(tip).y < hand.point(pip).y;

        Self {
            thumb: hand.point(Landmark::ThumbTip).x < hand.point(Landmark::ThumbIp).x,
            index: above(Landmark::IndexTip, Landmark::IndexPip),
            middle: above(Landmark::MiddleTip, Landmark::MiddlePip),
            ring: above(Landmark::RingTip, Landmark::RingPip),
            pinky: above(Landmark::PinkyTip, Landmark::PinkyPip),
        }
    }

    /// Flags in thumb..pinky order.
    pub fn as_array(&self) -> [bool; 5] {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, bool)> {
        Self::NAMES.into_iter().zip(self.as_array())
    }

    pub fn count(&self) -> u8 {
        self.as_array().iter().filter(|up| **up).count() as u8
    }

    pub fn is_fist(&self) -> bool {
        self.count() == 0
    }

    pub fn is_open_palm(&self) -> bool {
        self.count() == 5
    }
}

impl From<[bool; 5]> for FingerState {
    fn from([thumb, index, middle, ring, pinky]: [bool; 5]) -> Self {
        Self::new(thumb, index, middle, ring, pinky)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::testing::{base_points, hand_with};

    #[test]
    fn curled_hand_has_no_fingers_up() {
        let state = FingerState::from_landmarks(&hand_with([false; 5])).unwrap();
        assert!(state.is_fist());
        assert_eq!(state.count(), 0);
    }

    #[test]
    fn reads_each_finger_independently() {
        for finger in 0..5 {
            let mut up = [false; 5];
            up[finger] = true;
            let state = FingerState::from_landmarks(&hand_with(up)).unwrap();
            assert_eq!(state.as_array(), up, "finger {finger}");
        }
    }

    #[test]
    fn open_palm_counts_five() {
        let state = FingerState::from_landmarks(&hand_with([true; 5])).unwrap();
        assert!(state.is_open_palm());
        assert_eq!(state.count(), 5);
    }

    #[test]
    fn malformed_sets_match_empty_sets() {
        let mut points = base_points();
        points.truncate(12);
        let malformed = LandmarkSet::from_points(points);

        assert_eq!(FingerState::from_landmarks(&malformed), None);
        assert_eq!(
            FingerState::from_landmarks(&malformed),
            FingerState::from_landmarks(&LandmarkSet::empty())
        );
    }

    #[test]
    fn iterates_in_anatomical_order() {
        let state = FingerState::from([true, false, true, false, false]);
        let names: Vec<_> = state.iter().filter(|(_, up)| *up).map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Thumb", "Middle"]);
    }
}
