//! Freehand drawing with a raised index finger and a fingertip palette.

use std::{fmt, io::Write};

use serde::{Deserialize, Serialize};

use crate::{
    config::CanvasConfig,
    fingers::FingerState,
    landmarks::{Landmark, LandmarkSet},
    Result,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// ITU-R BT.601 luma, rounded.
    pub fn luminance(&self) -> u8 {
        let weighted = 299 * self.r as u32 + 587 * self.g as u32 + 114 * self.b as u32;
        ((weighted + 500) / 1000) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaletteColor {
    Red,
    Green,
    Blue,
    Yellow,
    White,
    Eraser,
}

impl PaletteColor {
    pub const ALL: [PaletteColor; 6] = [
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Yellow,
        Self::White,
        Self::Eraser,
    ];

    pub fn color(&self) -> Color {
        match self {
            Self::Red => Color::rgb(255, 0, 0),
            Self::Green => Color::rgb(0, 255, 0),
            Self::Blue => Color::rgb(0, 0, 255),
            Self::Yellow => Color::rgb(255, 255, 0),
            Self::White => Color::WHITE,
            Self::Eraser => Color::BLACK,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Green => "Green",
            Self::Blue => "Blue",
            Self::Yellow => "Yellow",
            Self::White => "White",
            Self::Eraser => "Eraser",
        }
    }
}

/// Axis-aligned palette swatch; hits are tested against the open interior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaletteBox {
    pub color: PaletteColor,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl PaletteBox {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.x1 < x && x < self.x2 && self.y1 < y && y < self.y2
    }
}

fn layout_palette(config: &CanvasConfig) -> Vec<PaletteBox> {
    PaletteColor::ALL
        .iter()
        .enumerate()
        .map(|(i, color)| {
            let x1 = config.box_left + i as i32 * config.box_spacing;
            PaletteBox {
                color: *color,
                x1,
                y1: config.box_top,
                x2: x1 + config.box_width,
                y2: config.box_top + config.box_height,
            }
        })
        .collect()
}

/// RGB pixel grid, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::BLACK)
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Writes one pixel; coordinates outside the buffer are ignored.
    pub fn set(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// True when every pixel is black.
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| *p == Color::BLACK)
    }

    /// Row-major pixel data.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Paints a segment of the given thickness with round ends. Pixels outside
    /// the buffer are skipped.
    pub fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Color, thickness: u32) {
        let radius = (f64::from(thickness) / 2.0).max(0.5);
        let reach = radius.ceil() as i32;
        let min_x = from.0.min(to.0).saturating_sub(reach).max(0);
        let max_x = from.0.max(to.0).saturating_add(reach).min(self.width as i32 - 1);
        let min_y = from.1.min(to.1).saturating_sub(reach).max(0);
        let max_y = from.1.max(to.1).saturating_add(reach).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if distance_to_segment((x, y), from, to) <= radius {
                    self.set(x, y, color);
                }
            }
        }
    }

    /// Writes the buffer as a binary PPM (P6).
    pub fn write_ppm<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        let bytes: Vec<u8> = self.pixels.iter().flat_map(|p| [p.r, p.g, p.b]).collect();
        out.write_all(&bytes)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

// f64 keeps sub-pixel precision across the whole i32 range.
fn distance_to_segment(p: (i32, i32), a: (i32, i32), b: (i32, i32)) -> f64 {
    let (px, py) = (f64::from(p.0), f64::from(p.1));
    let (ax, ay) = (f64::from(a.0), f64::from(a.1));
    let (dx, dy) = (f64::from(b.0) - ax, f64::from(b.1) - ay);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0)
    };
    (px - (ax + t * dx)).hypot(py - (ay + t * dy))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanvasMode {
    NoHand,
    Selection,
    Draw,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stroke {
    pub from: (i32, i32),
    pub to: (i32, i32),
    pub color: PaletteColor,
    pub thickness: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CanvasFrame {
    pub mode: CanvasMode,
    pub fingertip: Option<(i32, i32)>,
    /// Palette entry chosen on this frame.
    pub selected: Option<PaletteColor>,
    pub stroke: Option<Stroke>,
}

impl CanvasFrame {
    fn new(mode: CanvasMode) -> Self {
        Self {
            mode,
            fingertip: None,
            selected: None,
            stroke: None,
        }
    }
}

/// Persistent drawing buffer plus the palette selection state.
#[derive(Debug)]
pub struct StrokeCanvas {
    config: CanvasConfig,
    palette: Vec<PaletteBox>,
    buffer: PixelBuffer,
    current: PaletteColor,
    prev_point: Option<(i32, i32)>,
}

impl StrokeCanvas {
    pub fn new(config: CanvasConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            palette: layout_palette(&config),
            buffer: PixelBuffer::new(config.width, config.height),
            current: PaletteColor::Blue,
            prev_point: None,
            config,
        })
    }

    /// Swatch boxes, left to right.
    pub fn palette(&self) -> &[PaletteBox] {
        &self.palette
    }

    /// Palette entry strokes are drawn with.
    pub fn current_color(&self) -> PaletteColor {
        self.current
    }

    /// Stroke width for the current color; the eraser has its own.
    pub fn thickness(&self) -> u32 {
        match self.current {
            PaletteColor::Eraser => self.config.eraser_thickness,
            _ => self.config.brush_thickness,
        }
    }

    /// The drawing so far.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// End of the last stroke segment, if a stroke is in progress.
    pub fn prev_point(&self) -> Option<(i32, i32)> {
        self.prev_point
    }

    /// Rows reserved for the palette; nothing is drawn at or above this line.
    pub fn palette_strip_height(&self) -> i32 {
        self.config.palette_strip_height
    }

    pub fn process(&mut self, landmarks: &LandmarkSet) -> CanvasFrame {
        let Some(hand) = landmarks.hand() else {
            self.prev_point = None;
            return CanvasFrame::new(CanvasMode::NoHand);
        };

        let fingers = FingerState::from_hand(hand);
        let tip = hand.point(Landmark::IndexTip).position();

        if fingers.index && fingers.middle {
            let mut frame = CanvasFrame::new(CanvasMode::Selection);
            frame.fingertip = Some(tip);
            frame.selected = self.select(tip);
            self.prev_point = None;
            return frame;
        }

        if fingers.index {
            let mut frame = CanvasFrame::new(CanvasMode::Draw);
            frame.fingertip = Some(tip);
            frame.stroke = self.draw_to(tip);
            return frame;
        }

        self.prev_point = None;
        CanvasFrame::new(CanvasMode::Idle)
    }

    fn select(&mut self, (x, y): (i32, i32)) -> Option<PaletteColor> {
        let hit = self.palette.iter().find(|b| b.contains(x, y))?;
        if hit.color != self.current {
            tracing::debug!(color = hit.color.label(), "palette selection");
        }
        self.current = hit.color;
        Some(hit.color)
    }

    fn draw_to(&mut self, tip: (i32, i32)) -> Option<Stroke> {
        if tip.1 <= self.config.palette_strip_height {
            self.prev_point = None;
            return None;
        }

        let from = *self.prev_point.get_or_insert(tip);
        let stroke = Stroke {
            from,
            to: tip,
            color: self.current,
            thickness: self.thickness(),
        };
        self.buffer
            .draw_line(from, tip, stroke.color.color(), stroke.thickness);
        self.prev_point = Some(tip);
        Some(stroke)
    }

    /// Zeroes the whole drawing buffer.
    pub fn clear(&mut self) {
        self.buffer.fill(Color::BLACK);
        tracing::info!("canvas cleared");
    }

    /// Overlays the drawing onto a camera frame in place. Bright buffer pixels
    /// replace the frame pixel; dark ones are OR-ed in, which leaves the frame
    /// untouched where nothing was drawn.
    pub fn composite(&self, frame: &mut PixelBuffer) {
        let threshold = self.config.transparency_threshold;
        let width = self.buffer.width.min(frame.width) as i32;
        let height = self.buffer.height.min(frame.height) as i32;

        for y in 0..height {
            for x in 0..width {
                let Some(ink) = self.buffer.get(x, y) else {
                    continue;
                };
                let Some(under) = frame.get(x, y) else {
                    continue;
                };
                let out = if ink.luminance() > threshold {
                    ink
                } else {
                    Color::rgb(under.r | ink.r, under.g | ink.g, under.b | ink.b)
                };
                frame.set(x, y, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::testing::{hand_with, moved};

    fn canvas() -> StrokeCanvas {
        StrokeCanvas::new(CanvasConfig {
            width: 640,
            height: 480,
            ..Default::default()
        })
        .unwrap()
    }

    fn pointing_at(x: i32, y: i32) -> LandmarkSet {
        let hand = hand_with([false, true, false, false, false]);
        let hand = moved(&hand, Landmark::IndexPip, x, y + 20);
        moved(&hand, Landmark::IndexTip, x, y)
    }

    fn selecting_at(x: i32, y: i32) -> LandmarkSet {
        // Keep the middle finger raised above its joint while the index moves.
        let hand = hand_with([false, true, true, false, false]);
        let hand = moved(&hand, Landmark::IndexPip, 400, y + 20);
        let hand = moved(&hand, Landmark::MiddleTip, 430, 10);
        moved(&hand, Landmark::IndexTip, x, y)
    }

    #[test]
    fn palette_layout_is_left_to_right() {
        let canvas = canvas();
        let boxes = canvas.palette();
        assert_eq!(boxes.len(), 6);
        assert_eq!((boxes[0].x1, boxes[0].y1, boxes[0].x2, boxes[0].y2), (50, 20, 150, 80));
        assert_eq!(boxes[5].color, PaletteColor::Eraser);
        assert_eq!(boxes[5].x1, 650);
    }

    #[test]
    fn selection_picks_a_color_without_touching_pixels() {
        let mut canvas = canvas();
        canvas.process(&pointing_at(200, 200));
        canvas.process(&pointing_at(260, 220));
        let before = canvas.buffer().clone();

        let frame = canvas.process(&selecting_at(100, 50));
        assert_eq!(frame.mode, CanvasMode::Selection);
        assert_eq!(frame.selected, Some(PaletteColor::Red));
        assert_eq!(canvas.current_color(), PaletteColor::Red);
        assert_eq!(canvas.prev_point(), None);
        assert!(canvas.buffer() == &before);
    }

    #[test]
    fn selection_between_boxes_keeps_the_color() {
        let mut canvas = canvas();
        let frame = canvas.process(&selecting_at(160, 50));
        assert_eq!(frame.selected, None);
        assert_eq!(canvas.current_color(), PaletteColor::Blue);

        // Box edges are exclusive.
        assert_eq!(canvas.process(&selecting_at(50, 50)).selected, None);
    }

    #[test]
    fn first_draw_frame_paints_a_dot_not_a_streak() {
        let mut canvas = canvas();
        let frame = canvas.process(&pointing_at(300, 300));
        let stroke = frame.stroke.unwrap();
        assert_eq!(stroke.from, stroke.to);
        assert_eq!(canvas.buffer().get(300, 300), Some(PaletteColor::Blue.color()));
        assert_eq!(canvas.buffer().get(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn consecutive_draw_frames_join_up() {
        let mut canvas = canvas();
        canvas.process(&pointing_at(200, 300));
        let stroke = canvas.process(&pointing_at(260, 300)).stroke.unwrap();
        assert_eq!(stroke.from, (200, 300));
        assert_eq!(stroke.thickness, 10);
        for x in 200..=260 {
            assert_eq!(canvas.buffer().get(x, 300), Some(PaletteColor::Blue.color()));
        }
        assert_eq!(canvas.buffer().get(230, 306), Some(Color::BLACK));
    }

    #[test]
    fn palette_strip_is_never_drawn_on() {
        let mut canvas = canvas();
        canvas.process(&pointing_at(200, 300));
        let frame = canvas.process(&pointing_at(200, 90));
        assert_eq!(frame.mode, CanvasMode::Draw);
        assert_eq!(frame.stroke, None);
        assert_eq!(canvas.prev_point(), None);
    }

    #[test]
    fn idle_pose_breaks_the_stroke() {
        let mut canvas = canvas();
        canvas.process(&pointing_at(200, 300));
        let frame = canvas.process(&hand_with([false; 5]));
        assert_eq!(frame.mode, CanvasMode::Idle);
        assert_eq!(canvas.prev_point(), None);

        let stroke = canvas.process(&pointing_at(400, 300)).stroke.unwrap();
        assert_eq!(stroke.from, (400, 300));
    }

    #[test]
    fn eraser_uses_the_wide_brush() {
        let mut canvas = canvas();
        canvas.process(&selecting_at(700, 50));
        assert_eq!(canvas.current_color(), PaletteColor::Eraser);
        assert_eq!(canvas.thickness(), 50);
    }

    #[test]
    fn clear_empties_the_buffer() {
        let mut canvas = canvas();
        canvas.process(&pointing_at(200, 300));
        canvas.process(&pointing_at(300, 400));
        assert!(!canvas.buffer().is_blank());
        canvas.clear();
        assert!(canvas.buffer().is_blank());
    }

    #[test]
    fn composite_shows_the_frame_through_black() {
        let mut canvas = canvas();
        canvas.process(&selecting_at(580, 50));
        assert_eq!(canvas.current_color(), PaletteColor::White);
        canvas.process(&pointing_at(300, 300));

        let camera = Color::rgb(10, 80, 30);
        let mut frame = PixelBuffer::filled(640, 480, camera);
        canvas.composite(&mut frame);
        assert_eq!(frame.get(300, 300), Some(Color::WHITE));
        assert_eq!(frame.get(10, 400), Some(camera));
    }

    #[test]
    fn dark_ink_is_blended_not_replaced() {
        let mut canvas = canvas();
        canvas.process(&pointing_at(300, 300));
        // Pure blue sits under the luminance threshold.
        assert!(PaletteColor::Blue.color().luminance() <= 50);

        let mut frame = PixelBuffer::filled(640, 480, Color::rgb(200, 0, 0));
        canvas.composite(&mut frame);
        assert_eq!(frame.get(300, 300), Some(Color::rgb(200, 0, 255)));
    }

    #[test]
    fn lines_from_extreme_points_are_clipped() {
        let mut buffer = PixelBuffer::new(64, 48);
        buffer.draw_line((i32::MIN, 10), (i32::MAX, 10), Color::WHITE, 4);
        assert_eq!(buffer.get(0, 10), Some(Color::WHITE));
        assert_eq!(buffer.get(63, 10), Some(Color::WHITE));

        buffer.draw_line((i32::MAX, i32::MAX), (i32::MAX, i32::MAX), Color::WHITE, 50);
        buffer.draw_line((i32::MIN, i32::MIN), (i32::MIN, i32::MIN), Color::WHITE, 50);
        assert_eq!(buffer.get(30, 40), Some(Color::BLACK));
    }

    #[test]
    fn writes_ppm_header_and_pixels() {
        let buffer = PixelBuffer::filled(2, 1, Color::rgb(1, 2, 3));
        let mut out = Vec::new();
        buffer.write_ppm(&mut out).unwrap();
        assert!(out.starts_with(b"P6\n2 1\n255\n"));
        assert_eq!(&out[out.len() - 6..], &[1, 2, 3, 1, 2, 3]);
    }
}
