//! Pointer control: cursor motion, pinch clicks and fist scrolling.

mod click;
mod cursor;
mod scroll;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use click::ClickDebouncer;
pub use cursor::CursorMapper;
pub use scroll::ScrollEngine;

use crate::{
    config::EngineConfig,
    error::BackendError,
    fingers::FingerState,
    landmarks::{Landmark, LandmarkSet},
    Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
}

/// Capability that injects pointer input into the host system.
pub trait PointerBackend: fmt::Debug {
    fn name(&self) -> &str;
    fn move_to(&mut self, x: i32, y: i32) -> std::result::Result<(), BackendError>;
    fn click(&mut self, button: MouseButton) -> std::result::Result<(), BackendError>;
    fn scroll(&mut self, amount: i32) -> std::result::Result<(), BackendError>;
}

/// What the pointer session did with the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerMode {
    NoHand,
    Scroll,
    RightClick,
    MovingCursor,
    LeftClick,
    Idle,
}

impl PointerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoHand => "No Hand",
            Self::Scroll => "Scroll Mode",
            Self::RightClick => "Right Click",
            Self::MovingCursor => "Moving Cursor",
            Self::LeftClick => "Left Click",
            Self::Idle => "Idle",
        }
    }
}

impl fmt::Display for PointerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Move { x: i32, y: i32 },
    Click(MouseButton),
    Scroll(i32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointerFrame {
    pub mode: PointerMode,
    pub cursor: Option<(i32, i32)>,
    pub pinch_distance: Option<f32>,
    pub events: Vec<PointerEvent>,
}

impl PointerFrame {
    fn new(mode: PointerMode) -> Self {
        Self {
            mode,
            cursor: None,
            pinch_distance: None,
            events: Vec::new(),
        }
    }
}

/// Per-session pointer state. Selects a mode from the finger flags each frame,
/// in priority order fist, open palm, raised index.
#[derive(Debug)]
pub struct PointerController {
    cursor: CursorMapper,
    clicks: ClickDebouncer,
    scroll: ScrollEngine,
    backend: Option<Box<dyn PointerBackend>>,
}

impl PointerController {
    pub fn new(config: &EngineConfig, backend: Option<Box<dyn PointerBackend>>) -> Result<Self> {
        if let Some(backend) = &backend {
            tracing::info!(backend = backend.name(), "pointer backend attached");
        } else {
            tracing::info!("no pointer backend, running display-only");
        }
        Ok(Self {
            cursor: CursorMapper::new(config.cursor)?,
            clicks: ClickDebouncer::new(config.click)?,
            scroll: ScrollEngine::new(config.scroll)?,
            backend,
        })
    }

    /// False once the backend is missing or has failed.
    pub fn is_active(&self) -> bool {
        self.backend.is_some()
    }

    pub fn cursor(&self) -> &CursorMapper {
        &self.cursor
    }

    /// Shared cooldown for left and right clicks.
    pub fn clicks(&self) -> &ClickDebouncer {
        &self.clicks
    }

    pub fn scroll(&self) -> &ScrollEngine {
        &self.scroll
    }

    /// Processes one frame at `now` seconds and dispatches the resulting
    /// events to the backend, if any.
    pub fn process(&mut self, now: f64, landmarks: &LandmarkSet) -> PointerFrame {
        let frame = self.evaluate(now, landmarks);
        self.dispatch(&frame.events);
        frame
    }

    fn evaluate(&mut self, now: f64, landmarks: &LandmarkSet) -> PointerFrame {
        let Some(hand) = landmarks.hand() else {
            self.scroll.release();
            return PointerFrame::new(PointerMode::NoHand);
        };

        let fingers = FingerState::from_hand(hand);
        let (tip_x, tip_y) = hand.point(Landmark::IndexTip).position();

        if fingers.is_fist() {
            let mut frame = PointerFrame::new(PointerMode::Scroll);
            if let Some(amount) = self.scroll.update(tip_y) {
                frame.events.push(PointerEvent::Scroll(amount));
            }
            return frame;
        }
        self.scroll.release();

        if fingers.is_open_palm() {
            let mut frame = PointerFrame::new(PointerMode::RightClick);
            if self.clicks.fire(now) {
                tracing::debug!("right click");
                frame.events.push(PointerEvent::Click(MouseButton::Right));
            }
            return frame;
        }

        if !fingers.index {
            return PointerFrame::new(PointerMode::Idle);
        }

        let (x, y) = self.cursor.update(tip_x, tip_y);
        let pinch = hand.pinch_distance();
        let mut frame = PointerFrame::new(PointerMode::MovingCursor);
        frame.cursor = Some((x, y));
        frame.pinch_distance = Some(pinch);
        frame.events.push(PointerEvent::Move { x, y });

        if self.clicks.update(now, pinch) {
            tracing::debug!(pinch, "left click");
            frame.mode = PointerMode::LeftClick;
            frame.events.push(PointerEvent::Click(MouseButton::Left));
        }
        frame
    }

    fn dispatch(&mut self, events: &[PointerEvent]) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };

        let outcome = events.iter().try_for_each(|event| match *event {
            PointerEvent::Move { x, y } => backend.move_to(x, y),
            PointerEvent::Click(button) => backend.click(button),
            PointerEvent::Scroll(amount) => backend.scroll(amount),
        });

        if let Err(err) = outcome {
            tracing::warn!(backend = backend.name(), %err, "pointer backend failed, continuing display-only");
            self.backend = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::landmarks::testing::{hand_with, moved};

    #[derive(Debug, Default)]
    struct Recorder {
        calls: Rc<RefCell<Vec<PointerEvent>>>,
        fail: bool,
    }

    impl PointerBackend for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn move_to(&mut self, x: i32, y: i32) -> std::result::Result<(), BackendError> {
            if self.fail {
                return Err(BackendError::unavailable("display went away"));
            }
            self.calls.borrow_mut().push(PointerEvent::Move { x, y });
            Ok(())
        }

        fn click(&mut self, button: MouseButton) -> std::result::Result<(), BackendError> {
            self.calls.borrow_mut().push(PointerEvent::Click(button));
            Ok(())
        }

        fn scroll(&mut self, amount: i32) -> std::result::Result<(), BackendError> {
            self.calls.borrow_mut().push(PointerEvent::Scroll(amount));
            Ok(())
        }
    }

    fn controller() -> PointerController {
        PointerController::new(&EngineConfig::default(), None).unwrap()
    }

    fn fist_at(y: i32) -> LandmarkSet {
        moved(&hand_with([false; 5]), Landmark::IndexTip, 400, y)
    }

    #[test]
    fn no_hand_reports_and_clears_scroll() {
        let mut pointer = controller();
        pointer.process(0.0, &fist_at(300));
        assert!(pointer.scroll().is_active());

        let frame = pointer.process(0.1, &LandmarkSet::empty());
        assert_eq!(frame.mode, PointerMode::NoHand);
        assert!(!pointer.scroll().is_active());
    }

    #[test]
    fn fist_scrolls_by_index_tip_travel() {
        let mut pointer = controller();
        let first = pointer.process(0.0, &fist_at(300));
        assert_eq!(first.mode, PointerMode::Scroll);
        assert!(first.events.is_empty());

        let second = pointer.process(0.1, &fist_at(270));
        assert_eq!(second.events, vec![PointerEvent::Scroll(3)]);
    }

    #[test]
    fn open_palm_right_clicks_with_cooldown() {
        let mut pointer = controller();
        let palm = hand_with([true; 5]);
        let first = pointer.process(0.0, &palm);
        assert_eq!(first.mode, PointerMode::RightClick);
        assert_eq!(first.events, vec![PointerEvent::Click(MouseButton::Right)]);

        let held = pointer.process(0.1, &palm);
        assert_eq!(held.mode, PointerMode::RightClick);
        assert!(held.events.is_empty());
    }

    #[test]
    fn raised_index_moves_and_pinch_clicks() {
        let mut pointer = controller();
        let pointing = hand_with([false, true, false, false, false]);
        let frame = pointer.process(0.0, &pointing);
        assert_eq!(frame.mode, PointerMode::MovingCursor);
        assert!(matches!(frame.events[..], [PointerEvent::Move { .. }]));

        let pinched = moved(&pointing, Landmark::ThumbTip, 390, 160);
        let frame = pointer.process(0.5, &pinched);
        assert_eq!(frame.mode, PointerMode::LeftClick);
        assert_eq!(frame.events.last(), Some(&PointerEvent::Click(MouseButton::Left)));
    }

    #[test]
    fn other_poses_idle() {
        let mut pointer = controller();
        let frame = pointer.process(0.0, &hand_with([true, false, false, false, true]));
        assert_eq!(frame.mode, PointerMode::Idle);
        assert!(frame.events.is_empty());
    }

    #[test]
    fn events_reach_the_backend() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let backend = Recorder {
            calls: calls.clone(),
            fail: false,
        };
        let mut pointer =
            PointerController::new(&EngineConfig::default(), Some(Box::new(backend))).unwrap();
        assert!(pointer.is_active());

        let frame = pointer.process(0.0, &hand_with([false, true, false, false, false]));
        assert_eq!(*calls.borrow(), frame.events);
    }

    #[test]
    fn failing_backend_degrades_to_display_only() {
        let backend = Recorder {
            fail: true,
            ..Default::default()
        };
        let mut pointer =
            PointerController::new(&EngineConfig::default(), Some(Box::new(backend))).unwrap();

        let frame = pointer.process(0.0, &hand_with([false, true, false, false, false]));
        assert_eq!(frame.mode, PointerMode::MovingCursor);
        assert!(!pointer.is_active());

        let next = pointer.process(0.1, &hand_with([false, true, false, false, false]));
        assert!(next.cursor.is_some());
    }
}
