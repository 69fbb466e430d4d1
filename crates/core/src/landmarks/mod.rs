//! Hand landmark topology and the per-frame landmark set.
//!
//! A detector reports either nothing or all 21 keypoints of a hand. Anything
//! else is collapsed to "no hand" here, once, so downstream code can index
//! landmarks without re-checking the length.

use serde::{Deserialize, Serialize};

/// The 21 anatomical keypoints of a detected hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum Landmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl Landmark {
    pub const COUNT: usize = 21;

    const ALL: [Landmark; Landmark::COUNT] = [
        Self::Wrist,
        Self::ThumbCmc,
        Self::ThumbMcp,
        Self::ThumbIp,
        Self::ThumbTip,
        Self::IndexMcp,
        Self::IndexPip,
        Self::IndexDip,
        Self::IndexTip,
        Self::MiddleMcp,
        Self::MiddlePip,
        Self::MiddleDip,
        Self::MiddleTip,
        Self::RingMcp,
        Self::RingPip,
        Self::RingDip,
        Self::RingTip,
        Self::PinkyMcp,
        Self::PinkyPip,
        Self::PinkyDip,
        Self::PinkyTip,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// One keypoint in frame-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub id: usize,
    pub x: i32,
    pub y: i32,
}

impl LandmarkPoint {
    pub fn new(id: usize, x: i32, y: i32) -> Self {
        Self { id, x, y }
    }

    /// Planar Euclidean distance in pixels. Computed in floating point, so
    /// any pair of coordinates is accepted.
    pub fn distance_to(&self, other: &LandmarkPoint) -> f32 {
        let dx = self.x as f32 - other.x as f32;
        let dy = self.y as f32 - other.y as f32;
        dx.hypot(dy)
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// A complete, topology-checked hand. Indexing by [`Landmark`] cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandLandmarks {
    points: [LandmarkPoint; Landmark::COUNT],
}

impl HandLandmarks {
    pub fn point(&self, landmark: Landmark) -> LandmarkPoint {
        self.points[landmark.index()]
    }

    pub fn distance(&self, a: Landmark, b: Landmark) -> f32 {
        self.point(a).distance_to(&self.point(b))
    }

    /// Thumb-tip to index-tip distance, the pinch measurement shared by the
    /// OK sign, click and volume engines.
    pub fn pinch_distance(&self) -> f32 {
        self.distance(Landmark::ThumbTip, Landmark::IndexTip)
    }

    pub fn points(&self) -> &[LandmarkPoint] {
        &self.points
    }
}

/// Landmarks of one hand for one frame: either empty or a full hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<[i32; 3]>")]
pub struct LandmarkSet {
    hand: Option<HandLandmarks>,
}

impl LandmarkSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validates raw detector output. A set that is not exactly the 21 points
    /// in topology order is treated as "no hand".
    pub fn from_points(points: Vec<LandmarkPoint>) -> Self {
        if points.is_empty() {
            return Self::empty();
        }

        let Ok(points) = <[LandmarkPoint; Landmark::COUNT]>::try_from(points) else {
            tracing::debug!("dropping landmark set without exactly 21 points");
            return Self::empty();
        };

        if let Some(point) = points
            .iter()
            .enumerate()
            .find_map(|(index, point)| (point.id != index).then_some(point))
        {
            tracing::debug!(id = point.id, "dropping landmark set with out-of-order ids");
            return Self::empty();
        }

        Self {
            hand: Some(HandLandmarks { points }),
        }
    }

    pub fn hand(&self) -> Option<&HandLandmarks> {
        self.hand.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.hand.is_none()
    }

    pub fn len(&self) -> usize {
        self.hand.as_ref().map_or(0, |hand| hand.points.len())
    }
}

impl From<Vec<[i32; 3]>> for LandmarkSet {
    fn from(raw: Vec<[i32; 3]>) -> Self {
        let points = raw
            .into_iter()
            .map(|[id, x, y]| LandmarkPoint::new(usize::try_from(id).unwrap_or(usize::MAX), x, y))
            .collect();
        Self::from_points(points)
    }
}

impl From<HandLandmarks> for LandmarkSet {
    fn from(hand: HandLandmarks) -> Self {
        Self { hand: Some(hand) }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Builders for synthetic hands shared by the engine tests.

    use super::*;

    /// A right-way-up hand in a mirrored frame with every finger curled and
    /// the thumb tip level with its joint.
    pub(crate) fn base_points() -> Vec<LandmarkPoint> {
        let mut points: Vec<LandmarkPoint> = (0..Landmark::COUNT)
            .map(|id| LandmarkPoint::new(id, 300, 300))
            .collect();
        points[Landmark::Wrist.index()].y = 400;
        // Thumb: tip right of the IP joint means "down".
        points[Landmark::ThumbIp.index()] = LandmarkPoint::new(3, 250, 300);
        points[Landmark::ThumbTip.index()] = LandmarkPoint::new(4, 260, 300);
        // Fingers: tip below the PIP joint means "down".
        for (pip, tip, x) in [(6, 8, 400), (10, 12, 430), (14, 16, 460), (18, 20, 490)] {
            points[pip] = LandmarkPoint::new(pip, x, 250);
            points[tip] = LandmarkPoint::new(tip, x, 270);
        }
        points
    }

    /// Builds a hand with the given fingers raised, in thumb..pinky order.
    pub(crate) fn hand_with(up: [bool; 5]) -> LandmarkSet {
        LandmarkSet::from_points(raise(base_points(), up))
    }

    pub(crate) fn raise(mut points: Vec<LandmarkPoint>, up: [bool; 5]) -> Vec<LandmarkPoint> {
        if up[0] {
            points[Landmark::ThumbTip.index()].x = 200;
        }
        for (finger, tip) in [(1, 8), (2, 12), (3, 16), (4, 20)] {
            if up[finger] {
                points[tip].y = 150;
            }
        }
        points
    }

    /// Moves one landmark of an already valid set.
    pub(crate) fn moved(set: &LandmarkSet, landmark: Landmark, x: i32, y: i32) -> LandmarkSet {
        let mut points = set.hand().map(|h| h.points().to_vec()).unwrap_or_default();
        points[landmark.index()] = LandmarkPoint::new(landmark.index(), x, y);
        LandmarkSet::from_points(points)
    }
}
