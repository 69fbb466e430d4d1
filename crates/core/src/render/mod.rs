//! Drawable primitives describing the engine state for an external overlay
//! renderer. Nothing here rasterises; the host decides how to draw them.

use serde::Serialize;

use crate::{
    canvas::{CanvasFrame, CanvasMode, Color, StrokeCanvas},
    config::CursorConfig,
    fingers::FingerState,
    gesture::GestureLabel,
    landmarks::{HandLandmarks, Landmark},
    pointer::PointerFrame,
};

const PANEL: Color = Color::rgb(50, 50, 50);
const ACCENT: Color = Color::rgb(255, 255, 0);
const GOOD: Color = Color::rgb(0, 255, 0);
const BAD: Color = Color::rgb(255, 0, 0);
const MAGENTA: Color = Color::rgb(255, 0, 255);
const DIM: Color = Color::rgb(200, 200, 200);
const ORANGE: Color = Color::rgb(255, 165, 0);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Primitive {
    Point {
        at: (i32, i32),
        radius: u32,
        color: Color,
    },
    Line {
        from: (i32, i32),
        to: (i32, i32),
        color: Color,
        thickness: u32,
    },
    Rect {
        top_left: (i32, i32),
        bottom_right: (i32, i32),
        color: Color,
        filled: bool,
    },
    Text {
        at: (i32, i32),
        text: String,
        color: Color,
        scale: f32,
    },
}

/// Ordered list of primitives for one frame; later entries draw on top.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Overlay {
    primitives: Vec<Primitive>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn point(&mut self, at: (i32, i32), radius: u32, color: Color) {
        self.push(Primitive::Point { at, radius, color });
    }

    pub fn line(&mut self, from: (i32, i32), to: (i32, i32), color: Color, thickness: u32) {
        self.push(Primitive::Line {
            from,
            to,
            color,
            thickness,
        });
    }

    pub fn rect(&mut self, top_left: (i32, i32), bottom_right: (i32, i32), color: Color, filled: bool) {
        self.push(Primitive::Rect {
            top_left,
            bottom_right,
            color,
            filled,
        });
    }

    pub fn text(&mut self, at: (i32, i32), text: impl Into<String>, color: Color, scale: f32) {
        self.push(Primitive::Text {
            at,
            text: text.into(),
            color,
            scale,
        });
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Gesture name plus one indicator per finger.
pub fn gesture_overlay(label: GestureLabel, fingers: Option<FingerState>) -> Overlay {
    let mut overlay = Overlay::new();
    overlay.rect((10, 10), (500, 150), PANEL, true);
    overlay.text((20, 60), format!("Gesture: {label}"), ACCENT, 1.2);

    if let Some(fingers) = fingers {
        for (i, (name, up)) in fingers.iter().enumerate() {
            let x = 20 + i as i32 * 90;
            overlay.point((x + 20, 110), 15, if up { GOOD } else { BAD });
            overlay.text((x + 10, 125), &name[..1], Color::WHITE, 0.5);
        }
    }
    overlay
}

/// Active zone, mode and the pinch measurement for pointer control.
pub fn pointer_overlay(
    config: &CursorConfig,
    pinch_threshold: f32,
    frame: &PointerFrame,
    hand: Option<&HandLandmarks>,
) -> Overlay {
    let mut overlay = Overlay::new();
    let margin = config.active_zone_margin as i32;
    overlay.rect(
        (margin, margin),
        (config.frame_width as i32 - margin, config.frame_height as i32 - margin),
        GOOD,
        false,
    );
    overlay.text(
        (20, 80),
        format!("Mode: {}", frame.mode),
        if hand.is_some() { GOOD } else { BAD },
        0.7,
    );
    if let Some((x, y)) = frame.cursor {
        overlay.text((20, 110), format!("Cursor: ({x}, {y})"), Color::WHITE, 0.6);
    }
    overlay.text(
        (20, 135),
        format!("Screen: {}x{}", config.screen_width, config.screen_height),
        DIM,
        0.5,
    );

    if let Some(hand) = hand {
        let thumb = hand.point(Landmark::ThumbTip).position();
        let index = hand.point(Landmark::IndexTip).position();
        overlay.point(thumb, 10, BAD);
        overlay.point(index, 10, GOOD);
        overlay.point(hand.point(Landmark::MiddleTip).position(), 10, Color::rgb(0, 0, 255));

        let distance = hand.pinch_distance();
        let color = if distance < pinch_threshold { GOOD } else { MAGENTA };
        overlay.line(thumb, index, color, 3);
        let mid = (midpoint(thumb.0, index.0), midpoint(thumb.1, index.1).saturating_sub(10));
        overlay.text(mid, format!("{}px", distance as i32), color, 0.5);
    }
    overlay
}

fn midpoint(a: i32, b: i32) -> i32 {
    ((i64::from(a) + i64::from(b)) / 2) as i32
}

/// Palette swatches, the current-color highlight and the fingertip cursor.
pub fn canvas_overlay(canvas: &StrokeCanvas, frame: &CanvasFrame) -> Overlay {
    let mut overlay = Overlay::new();
    for swatch in canvas.palette() {
        let (tl, br) = ((swatch.x1, swatch.y1), (swatch.x2, swatch.y2));
        overlay.rect(tl, br, swatch.color.color(), true);
        overlay.rect(tl, br, Color::WHITE, false);
        if swatch.color == canvas.current_color() {
            overlay.rect((tl.0 - 5, tl.1 - 5), (br.0 + 5, br.1 + 5), GOOD, false);
        }
        overlay.text((tl.0 + 5, tl.1 + 40), swatch.color.label(), Color::WHITE, 0.5);
    }

    if let Some(tip) = frame.fingertip {
        let color = match frame.mode {
            CanvasMode::Selection => ACCENT,
            _ => canvas.current_color().color(),
        };
        overlay.point(tip, 15, color);
    }
    overlay
}

/// Volume bar, its range and the backend status.
pub struct VolumeStatus<'a> {
    pub level: u8,
    pub distance: Option<f32>,
    pub min_distance: f32,
    pub max_distance: f32,
    pub smoothing: (usize, usize),
    pub backend: Option<&'a str>,
}

pub fn volume_overlay(status: &VolumeStatus<'_>) -> Overlay {
    const BAR_X: i32 = 50;
    const BAR_Y: i32 = 150;
    const BAR_W: i32 = 50;
    const BAR_H: i32 = 300;

    let mut overlay = Overlay::new();
    overlay.rect((BAR_X, BAR_Y), (BAR_X + BAR_W, BAR_Y + BAR_H), PANEL, false);

    let level = status.level.min(100) as i32;
    let fill_top = BAR_Y + BAR_H - BAR_H * level / 100;
    let color = match level {
        0..=32 => GOOD,
        33..=65 => ACCENT,
        _ => ORANGE,
    };
    overlay.rect((BAR_X, fill_top), (BAR_X + BAR_W, BAR_Y + BAR_H), color, true);
    overlay.text((BAR_X - 10, BAR_Y + BAR_H + 40), format!("{level}%"), Color::WHITE, 1.0);
    overlay.text(
        (BAR_X - 10, BAR_Y + BAR_H + 105),
        format!("{}-{}px", status.min_distance, status.max_distance),
        DIM,
        0.5,
    );

    let distance = status.distance.unwrap_or(0.0) as i32;
    overlay.text((150, 105), format!("Current Distance: {distance}px"), Color::WHITE, 0.6);
    let (filled, capacity) = status.smoothing;
    overlay.text((150, 135), format!("Smoothing: {filled}/{capacity}"), DIM, 0.5);
    match status.backend {
        Some(name) => overlay.text((150, 165), format!("Mode: ACTIVE ({name})"), GOOD, 0.6),
        None => overlay.text((150, 165), "Mode: SIMULATION MODE", ORANGE, 0.6),
    }
    overlay
}
